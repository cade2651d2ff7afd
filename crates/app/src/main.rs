mod cli;
mod command;
mod render;
mod telemetry;

use std::{io, process::ExitCode};

use chrono::Utc;
use clap::Parser;
use sitebook_util::{load_env_file, AppConfig};
use tracing::{info, warn};

use crate::{
    cli::Cli,
    command::{CommandContext, Outcome},
};

/// Exit status reported by `verify` when stored totals have drifted.
const DRIFT_EXIT_CODE: u8 = 2;

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    load_env_file();
    let config = AppConfig::from_env()?;

    telemetry::init_tracing(&config)?;

    let context = CommandContext::new(&config, cli.format, Utc::now());
    info!(
        stage = "app",
        command = cli.command.name(),
        env = %config.environment.as_str(),
        timezone = %context.timezone,
        format = context.format.as_str(),
        "running command"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match command::execute(&cli.command, &context, &mut out)? {
        Outcome::Clean => Ok(ExitCode::SUCCESS),
        Outcome::Drift => {
            warn!(stage = "app", "stored totals drifted from recomputed totals");
            Ok(ExitCode::from(DRIFT_EXIT_CODE))
        }
    }
}
