use courier_core::{Counters, Latency, RunState, Settings, Severity, Targets};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Groups,
    Messages,
}

/// Snapshot reported after every simulated attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub phase: Phase,
    pub counters: Counters,
    pub targets: Targets,
}

impl Progress {
    /// Completed share of the current phase's target, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        let (done, target) = match self.phase {
            Phase::Groups => (self.counters.groups_created, self.targets.groups),
            Phase::Messages => (self.counters.messages_sent, self.targets.messages),
        };
        if target == 0 {
            return 1.0;
        }
        (f64::from(done) / f64::from(target)).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("a credential token is required")]
    MissingCredential,
    #[error("a message file must be loaded first")]
    MissingContent,
    #[error("invalid credential token")]
    InvalidCredential,
    #[error("failed to read {path}: {message}")]
    FileRead { path: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(Counters),
    Stopped(Counters),
    Failed(RunError),
    /// `start` was called while a run was active; nothing happened.
    AlreadyRunning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Log { severity: Severity, message: String },
    Progress(Progress),
    RunState(RunState),
    RunFinished(RunOutcome),
    Latency(Latency),
    MessageFileLoaded {
        name: String,
        result: Result<String, RunError>,
    },
    SettingsChanged(Settings),
}
