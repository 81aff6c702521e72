use std::sync::{Mutex, PoisonError};

use courier_core::{SettingKey, Settings};

use crate::PersistError;

/// Source of truth for the settings flags.
pub trait SettingsStore: Send + Sync {
    /// Current flags; a store with nothing saved yields defaults.
    fn load(&self) -> Settings;

    fn save(&self, settings: &Settings) -> Result<(), PersistError>;

    /// Flips `key`, saves, and returns the new flags.
    fn toggle(&self, key: SettingKey) -> Result<Settings, PersistError> {
        let mut settings = self.load();
        settings.toggle(key);
        self.save(&settings)?;
        Ok(settings)
    }
}

/// Keeps settings in memory only.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Settings>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Settings {
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save(&self, settings: &Settings) -> Result<(), PersistError> {
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner) = *settings;
        Ok(())
    }
}
