use log::*;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

pub fn init_logger() {
  let level = match std::env::var("LOG_LEVEL").as_deref() {
    Ok("trace") => LevelFilter::Trace,
    Ok("debug") => LevelFilter::Debug,
    Ok("warn") => LevelFilter::Warn,
    Ok("error") => LevelFilter::Error,
    _ => LevelFilter::Info,
  };
  TermLogger::init(
    level,
    Config::default(),
    TerminalMode::Mixed,
    ColorChoice::Auto,
  )
  .expect("Failed to initialize logger");
}
