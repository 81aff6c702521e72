//! Courier engine: the simulated operation controller, the latency monitor
//! and the runtime thread that hosts them.
mod config;
mod controller;
mod engine;
mod loader;
mod outcome;
mod persist;
mod probe;
mod settings_store;
mod sinks;
mod types;
mod validate;

pub use config::SimulationConfig;
pub use controller::{ControllerDeps, OperationController};
pub use engine::{EngineError, EngineEvents, EngineHandle, EngineParts};
pub use loader::{display_name, FileLoader, FsFileLoader};
pub use outcome::{OutcomeSource, RandomOutcomes};
pub use persist::{ensure_dir, write_atomic, PersistError};
pub use probe::{measure, LatencyMonitor, LatencyProbe, ProbeError, ProbeSettings, ReqwestProbe};
pub use settings_store::{MemorySettingsStore, SettingsStore};
pub use sinks::{ChannelSink, LatencySink, LogSink, ProgressSink};
pub use types::{EngineEvent, Phase, Progress, RunError, RunOutcome};
pub use validate::{CredentialValidator, LengthValidator};
