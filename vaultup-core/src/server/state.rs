//! Server process lifecycle states
//!
//! Defines the state machine the supervisor walks a server process
//! through, from spawn to teardown.

/// Server process states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// No process has been spawned yet
    NotStarted,

    /// Process spawned, startup not confirmed yet
    Spawning,

    /// Process survived the startup grace period
    Running,

    /// Process exited on its own
    Exited,

    /// Process was torn down by the launcher
    Terminated,
}

impl Default for ServerState {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl ServerState {
    /// Check whether the process is believed to be alive
    pub fn is_running(&self) -> bool {
        matches!(self, ServerState::Spawning | ServerState::Running)
    }

    /// Check whether the process is gone for good
    pub fn is_terminal(&self) -> bool {
        matches!(self, ServerState::Exited | ServerState::Terminated)
    }
}

impl std::fmt::Display for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerState::NotStarted => write!(f, "not started"),
            ServerState::Spawning => write!(f, "spawning"),
            ServerState::Running => write!(f, "running"),
            ServerState::Exited => write!(f, "exited"),
            ServerState::Terminated => write!(f, "terminated"),
        }
    }
}
