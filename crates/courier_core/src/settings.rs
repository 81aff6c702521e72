/// Names of the persisted boolean flags. `as_str` is the persisted key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ShowLogs,
    SpamDm,
    LeaveGroup,
    PingTest,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::ShowLogs,
        SettingKey::SpamDm,
        SettingKey::LeaveGroup,
        SettingKey::PingTest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::ShowLogs => "showLogs",
            SettingKey::SpamDm => "spamDm",
            SettingKey::LeaveGroup => "leaveGroup",
            SettingKey::PingTest => "pingTest",
        }
    }

    /// Accepts the persisted key in any letter case, with `-`/`_` separators ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let folded: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().to_lowercase() == folded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub show_logs: bool,
    pub spam_dm: bool,
    pub leave_group: bool,
    pub ping_test: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_logs: false,
            spam_dm: false,
            leave_group: false,
            ping_test: true,
        }
    }
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> bool {
        match key {
            SettingKey::ShowLogs => self.show_logs,
            SettingKey::SpamDm => self.spam_dm,
            SettingKey::LeaveGroup => self.leave_group,
            SettingKey::PingTest => self.ping_test,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: bool) {
        let slot = match key {
            SettingKey::ShowLogs => &mut self.show_logs,
            SettingKey::SpamDm => &mut self.spam_dm,
            SettingKey::LeaveGroup => &mut self.leave_group,
            SettingKey::PingTest => &mut self.ping_test,
        };
        *slot = value;
    }

    /// Flips `key` and returns the new value.
    pub fn toggle(&mut self, key: SettingKey) -> bool {
        let next = !self.get(key);
        self.set(key, next);
        next
    }
}
