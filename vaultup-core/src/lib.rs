//! Core library for the vaultup launcher
//!
//! This crate provides the building blocks for starting, watching,
//! and tearing down The Vault's local server process.

pub mod config;
pub mod error;
pub mod server;

/// Set up the tracing diagnostics pipeline
///
/// Diagnostics default to WARN so they stay out of the launcher's
/// console output; `VAULTUP_LOG` selects another level. Under systemd
/// they go to the journal, anywhere else to stderr.
pub fn init_logging() -> Result<(), std::io::Error> {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = std::env::var("VAULTUP_LOG")
        .ok()
        .and_then(|level| level.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::WARN);

    // systemd attaches JOURNAL_STREAM to services it supervises
    #[cfg(target_os = "linux")]
    {
        if std::env::var_os("JOURNAL_STREAM").is_some() {
            tracing_subscriber::registry()
                .with(tracing_journald::layer()?)
                .with(level)
                .init();
            return Ok(());
        }
    }

    // Stderr, not stdout: the launcher's own status lines own stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(std::io::stderr),
        )
        .with(level)
        .init();

    Ok(())
}
