use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use courier_core::{Settings, Targets, DEFAULT_GROUPS_TARGET, DEFAULT_MESSAGES_TARGET};
use courier_engine::{write_atomic, PersistError, SettingsStore};
use courier_logging::{courier_info, courier_warn};
use serde::{Deserialize, Serialize};

const SESSION_FILENAME: &str = ".courier_session.ron";

/// Flat flag object; keys match the ones the browser panel stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PersistedSettings {
    show_logs: bool,
    spam_dm: bool,
    leave_group: bool,
    ping_test: bool,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Settings::default().into()
    }
}

impl From<Settings> for PersistedSettings {
    fn from(settings: Settings) -> Self {
        Self {
            show_logs: settings.show_logs,
            spam_dm: settings.spam_dm,
            leave_group: settings.leave_group,
            ping_test: settings.ping_test,
        }
    }
}

impl From<PersistedSettings> for Settings {
    fn from(persisted: PersistedSettings) -> Self {
        Self {
            show_logs: persisted.show_logs,
            spam_dm: persisted.spam_dm,
            leave_group: persisted.leave_group,
            ping_test: persisted.ping_test,
        }
    }
}

/// Settings kept in a JSON file and cached in memory.
///
/// Missing keys take defaults and unknown keys are ignored. A failed save
/// still updates the cached flags.
#[derive(Debug)]
pub(crate) struct JsonSettingsStore {
    path: PathBuf,
    cache: Mutex<Settings>,
}

impl JsonSettingsStore {
    pub(crate) fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = read_settings(&path);
        Self {
            path,
            cache: Mutex::new(settings),
        }
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Settings {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save(&self, settings: &Settings) -> Result<(), PersistError> {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = *settings;
        let content = serde_json::to_string_pretty(&PersistedSettings::from(*settings))
            .map_err(|err| PersistError::Serialize(err.to_string()))?;
        write_atomic(&self.path, &content)
    }
}

fn read_settings(path: &Path) -> Settings {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Settings::default();
        }
        Err(err) => {
            courier_warn!("Failed to read settings from {:?}: {}", path, err);
            return Settings::default();
        }
    };

    match serde_json::from_str::<PersistedSettings>(&content) {
        Ok(persisted) => {
            courier_info!("Loaded settings from {:?}", path);
            persisted.into()
        }
        Err(err) => {
            courier_warn!("Failed to parse settings from {:?}: {}", path, err);
            Settings::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSession {
    groups_target: u32,
    messages_target: u32,
}

pub(crate) fn load_targets(state_dir: &Path) -> Targets {
    let path = state_dir.join(SESSION_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Targets::default();
        }
        Err(err) => {
            courier_warn!("Failed to read session from {:?}: {}", path, err);
            return Targets::default();
        }
    };

    let session: PersistedSession = match ron::from_str(&content) {
        Ok(session) => session,
        Err(err) => {
            courier_warn!("Failed to parse session from {:?}: {}", path, err);
            return Targets::default();
        }
    };

    courier_info!("Loaded session targets from {:?}", path);
    Targets {
        groups: positive_or(session.groups_target, DEFAULT_GROUPS_TARGET),
        messages: positive_or(session.messages_target, DEFAULT_MESSAGES_TARGET),
    }
}

pub(crate) fn save_targets(state_dir: &Path, targets: Targets) {
    let session = PersistedSession {
        groups_target: targets.groups,
        messages_target: targets.messages,
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&session, pretty) {
        Ok(text) => text,
        Err(err) => {
            courier_warn!("Failed to serialize session: {}", err);
            return;
        }
    };

    if let Err(err) = write_atomic(&state_dir.join(SESSION_FILENAME), &content) {
        courier_warn!("Failed to write session to {:?}: {}", state_dir, err);
    }
}

fn positive_or(value: u32, default: u32) -> u32 {
    if value == 0 {
        default
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::SettingKey;
    use tempfile::TempDir;

    #[test]
    fn missing_settings_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let store = JsonSettingsStore::open(temp.path().join("settings.json"));

        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn partial_blob_merges_over_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        fs::write(&path, r#"{"spamDm": true, "theme": "dark"}"#).unwrap();

        let store = JsonSettingsStore::open(&path);

        assert_eq!(
            store.load(),
            Settings {
                spam_dm: true,
                ..Settings::default()
            }
        );
    }

    #[test]
    fn corrupt_settings_fall_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        assert_eq!(JsonSettingsStore::open(&path).load(), Settings::default());
    }

    #[test]
    fn toggle_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");

        let store = JsonSettingsStore::open(&path);
        let toggled = store.toggle(SettingKey::ShowLogs).unwrap();
        assert!(toggled.show_logs);

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"showLogs\": true"));
        assert!(written.contains("\"pingTest\": true"));
        assert_eq!(JsonSettingsStore::open(&path).load(), toggled);
    }

    #[test]
    fn failed_save_still_updates_cache() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let store = JsonSettingsStore::open(blocker.join("settings.json"));

        assert!(store.toggle(SettingKey::SpamDm).is_err());
        assert!(store.load().spam_dm);
    }

    #[test]
    fn targets_round_trip_through_session_file() {
        let temp = TempDir::new().unwrap();
        assert_eq!(load_targets(temp.path()), Targets::default());

        let targets = Targets {
            groups: 3,
            messages: 8,
        };
        save_targets(temp.path(), targets);

        assert_eq!(load_targets(temp.path()), targets);
    }

    #[test]
    fn zero_targets_in_session_file_use_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(SESSION_FILENAME),
            "(groups_target: 0, messages_target: 2)",
        )
        .unwrap();

        assert_eq!(
            load_targets(temp.path()),
            Targets {
                groups: DEFAULT_GROUPS_TARGET,
                messages: 2,
            }
        );
    }
}
