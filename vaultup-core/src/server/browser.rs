//! Browser integration
//!
//! Opens the player URL in a browser once the server is up. The
//! opener is a trait so the supervisor can be exercised in tests
//! without touching the desktop.

use std::io;
use std::process::Command;

use crate::config::LaunchConfig;

/// Something that can open a URL for the user
pub trait UrlOpener {
    /// Open the URL, returning once the request was handed off
    fn open_url(&self, url: &str) -> io::Result<()>;
}

/// Opens URLs with the platform's default browser
pub struct SystemOpener;

impl UrlOpener for SystemOpener {
    fn open_url(&self, url: &str) -> io::Result<()> {
        open::that(url)
    }
}

/// Opens URLs by running a user-configured command
///
/// The URL is appended as the command's last argument.
pub struct CommandOpener {
    command: Vec<String>,
}

impl CommandOpener {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl UrlOpener for CommandOpener {
    fn open_url(&self, url: &str) -> io::Result<()> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "browser command is empty",
            ));
        };

        let status = Command::new(program).args(args).arg(url).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("browser command exited with {}", status),
            ))
        }
    }
}

/// Pick the opener the configuration asks for
pub fn opener_from_config(config: &LaunchConfig) -> Box<dyn UrlOpener> {
    match &config.browser_command {
        Some(command) => Box::new(CommandOpener::new(command.clone())),
        None => Box::new(SystemOpener),
    }
}
