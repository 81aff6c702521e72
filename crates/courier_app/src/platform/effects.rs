use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Local;
use courier_core::{Effect, LogEntry, Msg, RunEnd, RunSummary};
use courier_engine::{EngineEvent, EngineEvents, EngineHandle, EngineParts, RunOutcome};
use courier_logging::{courier_debug, courier_info};

use super::app::Input;
use super::persistence;

/// Produces the `HH:MM:SS` stamp attached to log lines.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

/// Executes core effects against the engine and feeds engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
    state_dir: PathBuf,
}

impl EffectRunner {
    pub fn new(
        parts: EngineParts,
        input_tx: mpsc::Sender<Input>,
        state_dir: PathBuf,
    ) -> anyhow::Result<Self> {
        let (engine, events) = EngineHandle::new(parts)?;
        let clock: Clock = Arc::new(|| Local::now().format("%H:%M:%S").to_string());
        spawn_event_loop(events, input_tx, clock);
        Ok(Self { engine, state_dir })
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadMessageFile { path } => {
                    courier_info!("LoadMessageFile path={}", path);
                    self.engine.load_message_file(path);
                }
                Effect::ConfigureTargets(targets) => {
                    self.engine.set_targets(targets);
                    persistence::save_targets(&self.state_dir, targets);
                }
                Effect::ToggleSetting(key) => self.engine.toggle_setting(key),
                Effect::StartRun {
                    credential,
                    content,
                } => {
                    courier_debug!("StartRun content_chars={}", content.chars().count());
                    self.engine.start(credential, content);
                }
                Effect::StopRun => self.engine.stop(),
                Effect::Log { severity, message } => self.engine.log(severity, message),
                Effect::Shutdown => self.engine.shutdown(),
            }
        }
    }
}

fn spawn_event_loop(events: EngineEvents, input_tx: mpsc::Sender<Input>, clock: Clock) {
    thread::spawn(move || loop {
        match events.recv_timeout(Duration::from_millis(50)) {
            Ok(Some(event)) => {
                if let Some(msg) = map_event(event, clock.as_ref()) {
                    if input_tx.send(Input::Msg(msg)).is_err() {
                        break;
                    }
                }
            }
            Ok(None) => {}
            Err(_) => break,
        }
    });
}

pub(crate) fn map_event(event: EngineEvent, clock: &dyn Fn() -> String) -> Option<Msg> {
    let msg = match event {
        EngineEvent::Log { severity, message } => Msg::LogAppended(LogEntry {
            at: clock(),
            severity,
            message,
        }),
        EngineEvent::Progress(progress) => Msg::ProgressUpdated {
            counters: progress.counters,
        },
        EngineEvent::RunState(state) => Msg::RunStateChanged(state),
        EngineEvent::RunFinished(outcome) => Msg::RunFinished(map_outcome(outcome)?),
        EngineEvent::Latency(latency) => Msg::LatencyMeasured(latency),
        EngineEvent::MessageFileLoaded { name, result } => match result {
            Ok(content) => Msg::MessageFileLoaded { name, content },
            Err(_) => Msg::MessageFileFailed { name },
        },
        EngineEvent::SettingsChanged(settings) => Msg::SettingsChanged(settings),
    };
    Some(msg)
}

fn map_outcome(outcome: RunOutcome) -> Option<RunSummary> {
    match outcome {
        RunOutcome::Completed(counters) => Some(RunSummary {
            end: RunEnd::Completed,
            counters,
        }),
        RunOutcome::Stopped(counters) => Some(RunSummary {
            end: RunEnd::Stopped,
            counters,
        }),
        RunOutcome::Failed(err) => Some(RunSummary {
            end: RunEnd::Failed(err.to_string()),
            counters: Default::default(),
        }),
        RunOutcome::AlreadyRunning => None,
    }
}
