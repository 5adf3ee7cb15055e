use std::time::Duration;

/// How long a Pending duel waits for an opponent before the expiry sweep
/// cancels it.
pub const PENDING_TTL: Duration = Duration::from_secs(300);

/// Countdown between start dispatch and the duel going live.
pub const COUNTDOWN: Duration = Duration::from_secs(5);

/// How long an Active duel runs before it is due for resolution.
pub const DUEL_DURATION: Duration = Duration::from_secs(60);

/// Platform cut of a resolved duel's gross pot, in basis points (5%).
pub const PLATFORM_FEE_BPS: u16 = 500;

/// Default AMM swap fee in basis points (0.5%).
pub const AMM_DEFAULT_FEE_BPS: u16 = 50;

/// Upper bound on any single RPC round-trip.
pub const RPC_TIMEOUT: Duration = Duration::from_secs(15);

/// Expiry sweep cadence. Must stay at or under 10s.
pub const EXPIRY_POLL: Duration = Duration::from_secs(5);

/// Resolution sweep cadence. Must stay at or under 3s.
pub const RESOLVE_POLL: Duration = Duration::from_secs(2);

/// Cadence of streamed price ticks while a duel is Active.
pub const DUEL_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Resolve dispatch failures tolerated before a duel is flagged for
/// manual intervention and excluded from sweeps.
pub const RESOLVE_MAX_ATTEMPTS: i32 = 5;

/// AMM candle bucket width in seconds, UTC-aligned.
pub const CANDLE_INTERVAL_SECS: i64 = 60;

/// Fixed-point scale for on-chain prices (1e8).
pub const PRICE_SCALE: u64 = 100_000_000;
