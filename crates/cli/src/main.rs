mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use airwave_core::config::load_dotenv;
use airwave_core::Config;

use crate::cli::{CliArgs, Command};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    let config = Config::for_profile_in(
        args.profile.as_deref().unwrap_or(""),
        args.config_dir.as_deref(),
    );
    config.log_summary();

    let output = match args.command {
        Command::Policy(cmd) => commands::policy(&config, cmd)?,
        Command::Schedule(cmd) => commands::schedule(&config, cmd)?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
