//! Courier core: pure console state machine, view-model helpers and the
//! domain types shared with the engine.
mod effect;
mod latency;
mod msg;
mod settings;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use latency::{Latency, LatencyTier};
pub use msg::Msg;
pub use settings::{SettingKey, Settings};
pub use state::{
    parse_target, AppState, Counters, LogEntry, RunEnd, RunState, RunSummary, Severity, Targets,
    DEFAULT_GROUPS_TARGET, DEFAULT_MESSAGES_TARGET, LOG_CAPACITY,
};
pub use update::update;
pub use view_model::{AppViewModel, LatencyView};
