use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::error::{ConsoleError, ConsoleResult};

pub fn parse_level(level: &str) -> ConsoleResult<Level> {
    level
        .parse::<Level>()
        .map_err(|_| ConsoleError::Config(format!("unknown log level: {}", level)))
}

pub fn init(level: &str) -> ConsoleResult<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(level)?)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| ConsoleError::Common(e.to_string()))
}
