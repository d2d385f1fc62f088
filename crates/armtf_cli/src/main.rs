//! armtf CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error, or the failing stage's own code
//! - 2: Invalid arguments (reported by clap)

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Auto(args) => commands::auto::execute(args, cli.verbose).await,
        Commands::Generate(args) => commands::generate::execute(args).await,
        Commands::Test(args) => commands::test::execute(args, cli.verbose).await,
        Commands::Cleanup(args) => commands::cleanup::execute(args, cli.verbose).await,
    };

    match result {
        Ok(code) => ExitCode::from(to_exit_code(code)),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(ExitCodes::GENERAL_ERROR)
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("armtf={},warn", level)));

    // Already initialized when embedded; keep going with the existing subscriber.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init();
}

/// Stage codes outside the process exit range collapse to a general error.
fn to_exit_code(code: i32) -> u8 {
    match u8::try_from(code) {
        Ok(code) => code,
        Err(_) => ExitCodes::GENERAL_ERROR,
    }
}
