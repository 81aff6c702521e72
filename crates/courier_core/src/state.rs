use std::collections::VecDeque;

use crate::view_model::{AppViewModel, LatencyView};
use crate::{Latency, Settings};

pub const DEFAULT_GROUPS_TARGET: u32 = 10;
pub const DEFAULT_MESSAGES_TARGET: u32 = 5;
/// Oldest log entries are dropped beyond this many.
pub const LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// Attempt counters for one run.
///
/// `groups_created` and `messages_sent` count attempts, successful or not;
/// the failure counters record how many of those attempts were simulated
/// failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    pub groups_created: u32,
    pub messages_sent: u32,
    pub group_failures: u32,
    pub message_failures: u32,
}

impl Counters {
    /// Rounded share of the group target reached, or 100 before the first attempt.
    pub fn completion_percent(&self, targets: Targets) -> u32 {
        if self.groups_created == 0 || targets.groups == 0 {
            return 100;
        }
        let ratio = f64::from(self.groups_created) / f64::from(targets.groups);
        (ratio * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Targets {
    pub groups: u32,
    pub messages: u32,
}

impl Default for Targets {
    fn default() -> Self {
        Self {
            groups: DEFAULT_GROUPS_TARGET,
            messages: DEFAULT_MESSAGES_TARGET,
        }
    }
}

/// Parses a user-entered target; anything but a positive integer yields `default`.
pub fn parse_target(raw: &str, default: u32) -> u32 {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Wall-clock stamp supplied by the platform layer (`HH:MM:SS`).
    pub at: String,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEnd {
    Completed,
    Stopped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub end: RunEnd,
    pub counters: Counters,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    credential: String,
    message_file: Option<String>,
    message_content: String,
    targets: Targets,
    counters: Counters,
    run_state: RunState,
    settings: Settings,
    latency: Option<Latency>,
    log: VecDeque<LogEntry>,
    last_run: Option<RunSummary>,
    quitting: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            run_state: self.run_state,
            counters: self.counters,
            targets: self.targets,
            group_progress: fraction(self.counters.groups_created, self.targets.groups),
            message_progress: fraction(self.counters.messages_sent, self.targets.messages),
            completion_percent: self.counters.completion_percent(self.targets),
            settings: self.settings,
            credential_set: !self.credential.is_empty(),
            message_file: self.message_file.clone(),
            message_len: self.message_content.chars().count(),
            latency: self.latency.map(LatencyView::from),
            log: self.log.iter().cloned().collect(),
            last_run: self.last_run.clone(),
            quitting: self.quitting,
        }
    }

    /// Returns whether the state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn targets(&self) -> Targets {
        self.targets
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub(crate) fn credential(&self) -> &str {
        &self.credential
    }

    pub(crate) fn message_content(&self) -> &str {
        &self.message_content
    }

    pub(crate) fn set_credential(&mut self, raw: &str) {
        let trimmed = raw.trim();
        if self.credential != trimmed {
            self.credential = trimmed.to_string();
            self.dirty = true;
        }
    }

    pub(crate) fn set_message(&mut self, name: String, content: String) {
        self.message_file = Some(name);
        self.message_content = content;
        self.dirty = true;
    }

    pub(crate) fn set_targets(&mut self, targets: Targets) -> bool {
        if self.targets == targets {
            return false;
        }
        self.targets = targets;
        self.dirty = true;
        true
    }

    pub(crate) fn set_settings(&mut self, settings: Settings) {
        if self.settings != settings {
            self.settings = settings;
            self.dirty = true;
        }
    }

    pub(crate) fn set_counters(&mut self, counters: Counters) {
        if self.counters != counters {
            self.counters = counters;
            self.dirty = true;
        }
    }

    pub(crate) fn set_run_state(&mut self, run_state: RunState) {
        if self.run_state == run_state {
            return;
        }
        if run_state == RunState::Running {
            self.counters = Counters::default();
            self.last_run = None;
        }
        self.run_state = run_state;
        self.dirty = true;
    }

    /// Records the summary of the run that just went idle. The run state
    /// itself only follows `RunStateChanged`.
    pub(crate) fn finish_run(&mut self, summary: RunSummary) {
        self.counters = summary.counters;
        self.last_run = Some(summary);
        self.dirty = true;
    }

    pub(crate) fn set_latency(&mut self, latency: Latency) {
        self.latency = Some(latency);
        self.dirty = true;
    }

    pub(crate) fn push_log(&mut self, entry: LogEntry) {
        if self.log.len() == LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(entry);
        self.dirty = true;
    }

    pub(crate) fn clear_log(&mut self) {
        self.log.clear();
        self.dirty = true;
    }

    pub(crate) fn mark_quitting(&mut self) {
        self.quitting = true;
        self.dirty = true;
    }
}

fn fraction(done: u32, target: u32) -> f64 {
    if target == 0 {
        return 0.0;
    }
    (f64::from(done) / f64::from(target)).clamp(0.0, 1.0)
}
