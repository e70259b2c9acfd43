//! vaultup - launcher for The Vault local music player
//!
//! Checks that Node.js is installed, frees the server port, starts
//! the server, opens the player in a browser, and tears the server
//! down again when the user stops the launcher.

use clap::Parser;
use colored::Colorize;
use vaultup_core::{error::LaunchError, init_logging};

mod cli;

#[derive(Parser)]
#[command(name = "vaultup")]
#[command(about = "Start The Vault server and open the player in your browser")]
#[command(version)]
struct Cli {}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = init_logging() {
        eprintln!("Failed to set up logging: {}", e);
        std::process::exit(2);
    }

    let _cli = Cli::parse();

    let code = match cli::launch::run_launch().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            match e {
                // Expected launch aborts: the user was told what is
                // wrong and nothing was left running
                LaunchError::RuntimeMissing { .. }
                | LaunchError::RuntimeCheckFailed { .. }
                | LaunchError::PortUnavailable { .. }
                | LaunchError::SpawnFailed { .. }
                | LaunchError::StartupFailed { .. } => 0,
                // A broken configuration file is a real error
                LaunchError::Config(_) => 2,
                // Anything else is an unexpected runtime failure
                LaunchError::Io(_) => 1,
            }
        }
    };
    std::process::exit(code);
}
