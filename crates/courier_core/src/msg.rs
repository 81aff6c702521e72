use crate::{Counters, Latency, LogEntry, RunState, RunSummary, SettingKey, Settings, Targets};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the credential input.
    CredentialChanged(String),
    /// User picked a message file to load.
    MessageFileSelected(String),
    /// Engine finished reading the message file.
    MessageFileLoaded { name: String, content: String },
    /// Engine failed to read the message file; the reason was already logged.
    MessageFileFailed { name: String },
    /// User edited the group target (raw text).
    GroupTargetChanged(String),
    /// User edited the message target (raw text).
    MessageTargetChanged(String),
    /// Restore targets saved by a previous session.
    TargetsRestored(Targets),
    /// User flipped one of the settings flags.
    SettingToggled(SettingKey),
    /// Settings store reported its current flags.
    SettingsChanged(Settings),
    /// User clicked Start.
    StartClicked,
    /// User clicked Stop.
    StopClicked,
    /// User cleared the log panel.
    ClearLogsClicked,
    /// Engine produced a log line.
    LogAppended(LogEntry),
    /// Engine progress after an attempt.
    ProgressUpdated { counters: Counters },
    RunStateChanged(RunState),
    RunFinished(RunSummary),
    /// Latency monitor reading.
    LatencyMeasured(Latency),
    QuitRequested,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
