use crate::{Counters, Latency, LatencyTier, LogEntry, RunState, RunSummary, Settings, Targets};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub run_state: RunState,
    pub counters: Counters,
    pub targets: Targets,
    /// Share of the group target attempted, in `[0, 1]`.
    pub group_progress: f64,
    /// Share of the message target attempted, in `[0, 1]`.
    pub message_progress: f64,
    pub completion_percent: u32,
    pub settings: Settings,
    /// The credential itself is never exposed to the view.
    pub credential_set: bool,
    pub message_file: Option<String>,
    pub message_len: usize,
    pub latency: Option<LatencyView>,
    pub log: Vec<LogEntry>,
    pub last_run: Option<RunSummary>,
    pub quitting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatencyView {
    pub text: String,
    pub tier: LatencyTier,
}

impl From<Latency> for LatencyView {
    fn from(latency: Latency) -> Self {
        let text = match latency {
            Latency::NoSignal => "---".to_string(),
            Latency::Millis(ms) => format!("{ms} ms"),
        };
        Self {
            text,
            tier: latency.tier(),
        }
    }
}
