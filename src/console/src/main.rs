use std::sync::Arc;

use anyhow::Result;
use api::ApiClient;
use auth::{token, Session};
use clap::Parser;
use common::config::Config;
use tracing::debug;

mod cli;
mod commands;

use cli::Cli;
use commands::Console;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }
    common::log::init(&config.log.level)?;
    debug!("api at {}", config.api_url);

    let client = Arc::new(ApiClient::from_config(&config)?);
    let stored = token::load(&config.session.token_file)?;
    let console = Console::new(Session::new(client, stored), &config.session.token_file);

    let output = console.run(cli.command).await?;
    if !output.is_empty() {
        println!("{}", output.trim_end());
    }
    Ok(())
}
