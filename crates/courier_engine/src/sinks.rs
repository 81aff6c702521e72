use std::sync::mpsc;

use courier_core::{Latency, RunState, Severity};

use crate::{EngineEvent, Progress};

/// Receives user-facing log lines.
pub trait LogSink: Send + Sync {
    fn log(&self, severity: Severity, message: &str);
}

pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: Progress);

    fn run_state_changed(&self, _state: RunState) {}
}

/// Receives latency monitor readings for display.
pub trait LatencySink: Send + Sync {
    fn update(&self, latency: Latency);
}

/// Forwards everything it receives as [`EngineEvent`]s.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }

    pub fn send(&self, event: EngineEvent) {
        // The receiver going away just means nobody is watching anymore.
        let _ = self.tx.send(event);
    }
}

impl LogSink for ChannelSink {
    fn log(&self, severity: Severity, message: &str) {
        self.send(EngineEvent::Log {
            severity,
            message: message.to_string(),
        });
    }
}

impl ProgressSink for ChannelSink {
    fn report(&self, progress: Progress) {
        self.send(EngineEvent::Progress(progress));
    }

    fn run_state_changed(&self, state: RunState) {
        self.send(EngineEvent::RunState(state));
    }
}

impl LatencySink for ChannelSink {
    fn update(&self, latency: Latency) {
        self.send(EngineEvent::Latency(latency));
    }
}
