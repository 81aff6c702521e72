use crate::{SettingKey, Severity, Targets};

/// Side effects requested by [`crate::update`]; executed by the platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadMessageFile { path: String },
    ConfigureTargets(Targets),
    ToggleSetting(SettingKey),
    StartRun { credential: String, content: String },
    StopRun,
    Log { severity: Severity, message: String },
    Shutdown,
}
