use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
  pub kind: &'static str,
  pub value: String,
}

/// Markets a duel can be fought over. Discriminants are the wire ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
  SolUsdt = 1,
  PumpUsdt = 2,
}

impl Market {
  pub fn from_id(id: u16) -> Option<Self> {
    match id {
      1 => Some(Market::SolUsdt),
      2 => Some(Market::PumpUsdt),
      _ => None,
    }
  }

  pub fn id(&self) -> u16 {
    *self as u16
  }

  /// Exchange ticker symbol used against the price source.
  pub fn symbol(&self) -> &'static str {
    match self {
      Market::SolUsdt => "SOLUSDT",
      Market::PumpUsdt => "PUMPUSDT",
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
  Sol,
  Pump,
  Usdc,
}

impl Currency {
  pub fn as_str(&self) -> &'static str {
    match self {
      Currency::Sol => "sol",
      Currency::Pump => "pump",
      Currency::Usdc => "usdc",
    }
  }

  pub fn from_str(s: &str) -> Result<Self, ParseEnumError> {
    match s {
      "sol" => Ok(Currency::Sol),
      "pump" => Ok(Currency::Pump),
      "usdc" => Ok(Currency::Usdc),
      other => Err(ParseEnumError {
        kind: "currency",
        value: other.to_string(),
      }),
    }
  }

  /// On-chain u8 code.
  pub fn code(&self) -> u8 {
    match self {
      Currency::Sol => 0,
      Currency::Pump => 1,
      Currency::Usdc => 2,
    }
  }

  pub fn min_bet(&self) -> u64 {
    match self {
      Currency::Sol => 10_000_000,
      Currency::Pump | Currency::Usdc => 10_000,
    }
  }

  pub fn max_bet(&self) -> u64 {
    match self {
      Currency::Sol => 100_000_000_000,
      Currency::Pump | Currency::Usdc => 100_000_000,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
  Up,
  Down,
}

impl Direction {
  pub fn opposite(&self) -> Self {
    match self {
      Direction::Up => Direction::Down,
      Direction::Down => Direction::Up,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Direction::Up => "up",
      Direction::Down => "down",
    }
  }

  pub fn from_str(s: &str) -> Result<Self, ParseEnumError> {
    match s {
      "up" => Ok(Direction::Up),
      "down" => Ok(Direction::Down),
      other => Err(ParseEnumError {
        kind: "direction",
        value: other.to_string(),
      }),
    }
  }

  /// On-chain u8 code.
  pub fn code(&self) -> u8 {
    match self {
      Direction::Up => 0,
      Direction::Down => 1,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuelWinner {
  Player1,
  Player2,
}

/// Pick the winner from recorded prices. None means an exact tie, which
/// cancels the duel with both stakes refunded.
pub fn winner_for(entry_price: u64, exit_price: u64, direction_p1: Direction) -> Option<DuelWinner> {
  let winning_side = match exit_price.cmp(&entry_price) {
    std::cmp::Ordering::Greater => Direction::Up,
    std::cmp::Ordering::Less => Direction::Down,
    std::cmp::Ordering::Equal => return None,
  };
  if winning_side == direction_p1 {
    Some(DuelWinner::Player1)
  } else {
    Some(DuelWinner::Player2)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn up_bettor_wins_on_rise() {
    assert_eq!(
      winner_for(100_00000000, 101_00000000, Direction::Up),
      Some(DuelWinner::Player1)
    );
    assert_eq!(
      winner_for(100_00000000, 101_00000000, Direction::Down),
      Some(DuelWinner::Player2)
    );
  }

  #[test]
  fn down_bettor_wins_on_fall() {
    assert_eq!(
      winner_for(100_00000000, 99_00000000, Direction::Down),
      Some(DuelWinner::Player1)
    );
  }

  #[test]
  fn exact_tie_has_no_winner() {
    assert_eq!(winner_for(100_00000000, 100_00000000, Direction::Up), None);
  }

  #[test]
  fn market_symbols() {
    assert_eq!(Market::from_id(1), Some(Market::SolUsdt));
    assert_eq!(Market::SolUsdt.symbol(), "SOLUSDT");
    assert_eq!(Market::from_id(3), None);
  }

  #[test]
  fn wire_encoding_is_snake_case() {
    assert_eq!(serde_json::to_string(&Direction::Up).unwrap(), r#""up""#);
    assert_eq!(serde_json::to_string(&Currency::Usdc).unwrap(), r#""usdc""#);
    assert_eq!(
      serde_json::from_str::<Direction>(r#""down""#).unwrap(),
      Direction::Down
    );
  }

  #[test]
  fn onchain_codes_match_the_instruction_layout() {
    assert_eq!(Direction::Up.code(), 0);
    assert_eq!(Direction::Down.code(), 1);
    assert_eq!(Currency::Sol.code(), 0);
    assert_eq!(Currency::Pump.code(), 1);
    assert_eq!(Currency::Usdc.code(), 2);
  }
}
