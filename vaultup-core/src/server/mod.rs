//! Server lifecycle module
//!
//! Handles everything between "the user ran the launcher" and "the
//! server is gone again": prerequisite checks, port reclamation,
//! dependency installs, process supervision, and the browser handoff.

pub mod browser;
pub mod deps;
pub mod port;
pub mod runtime;
pub mod state;
pub mod supervisor;

// Public re-exports
pub use browser::{opener_from_config, SystemOpener, UrlOpener};
pub use state::ServerState;
pub use supervisor::{shutdown_signal, ServerSupervisor, ShutdownOutcome};
