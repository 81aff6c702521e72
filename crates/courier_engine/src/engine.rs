use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use courier_core::{SettingKey, Severity, Targets};
use courier_logging::{courier_info, courier_warn};
use thiserror::Error;
use tokio::runtime::Runtime;

use crate::{
    display_name, ChannelSink, ControllerDeps, EngineEvent, FileLoader, FsFileLoader,
    LatencyMonitor, LatencyProbe, LengthValidator, LogSink, OperationController, OutcomeSource,
    ProbeError, ProbeSettings, RandomOutcomes, ReqwestProbe, RunOutcome, SettingsStore,
    SimulationConfig,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build latency probe: {0}")]
    Probe(#[from] ProbeError),
    #[error("engine has shut down")]
    Closed,
}

/// Everything the engine thread runs with.
pub struct EngineParts {
    pub simulation: SimulationConfig,
    pub probe_interval: Duration,
    pub settings: Arc<dyn SettingsStore>,
    pub probe: Arc<dyn LatencyProbe>,
    pub outcomes: Arc<dyn OutcomeSource>,
    pub loader: Arc<dyn FileLoader>,
}

impl EngineParts {
    /// Production wiring: HTTP probe, random outcomes, filesystem loader.
    pub fn standard(
        simulation: SimulationConfig,
        probe: &ProbeSettings,
        settings: Arc<dyn SettingsStore>,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            simulation,
            probe_interval: probe.interval,
            settings,
            probe: Arc::new(ReqwestProbe::new(probe)?),
            outcomes: Arc::new(RandomOutcomes),
            loader: Arc::new(FsFileLoader),
        })
    }
}

enum EngineCommand {
    Start { credential: String, content: String },
    Stop,
    SetTargets(Targets),
    LoadMessageFile(PathBuf),
    ToggleSetting(SettingKey),
    Log { severity: Severity, message: String },
    Shutdown,
}

/// Command side of the engine. Dropping it shuts the engine down.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    thread: Option<thread::JoinHandle<()>>,
}

/// Event side of the engine; can live on a different thread than the handle.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineEvents {
    /// Waits up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineError> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineError::Closed),
        }
    }
}

impl EngineHandle {
    pub fn new(parts: EngineParts) -> Result<(Self, EngineEvents), EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("courier-worker")
            .enable_all()
            .build()?;

        let thread = thread::Builder::new()
            .name("courier-engine".to_string())
            .spawn(move || run_engine(runtime, parts, cmd_rx, ChannelSink::new(event_tx)))?;

        Ok((
            Self {
                cmd_tx,
                thread: Some(thread),
            },
            EngineEvents { event_rx },
        ))
    }

    pub fn start(&self, credential: impl Into<String>, content: impl Into<String>) {
        self.send(EngineCommand::Start {
            credential: credential.into(),
            content: content.into(),
        });
    }

    pub fn stop(&self) {
        self.send(EngineCommand::Stop);
    }

    pub fn set_targets(&self, targets: Targets) {
        self.send(EngineCommand::SetTargets(targets));
    }

    pub fn load_message_file(&self, path: impl Into<PathBuf>) {
        self.send(EngineCommand::LoadMessageFile(path.into()));
    }

    pub fn toggle_setting(&self, key: SettingKey) {
        self.send(EngineCommand::ToggleSetting(key));
    }

    /// Routes a platform-originated line through the same log sink as the run.
    pub fn log(&self, severity: Severity, message: impl Into<String>) {
        self.send(EngineCommand::Log {
            severity,
            message: message.into(),
        });
    }

    /// Stops any active run, cancels the latency monitor and joins the engine thread.
    pub fn shutdown(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        self.send(EngineCommand::Shutdown);
        if thread.join().is_err() {
            courier_warn!("engine thread panicked during shutdown");
        }
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            courier_warn!("engine is not running; command dropped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_engine(
    runtime: Runtime,
    parts: EngineParts,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    sink: ChannelSink,
) {
    let sink = Arc::new(sink);
    let controller = Arc::new(OperationController::new(
        parts.simulation.clone(),
        ControllerDeps {
            log: sink.clone(),
            progress: sink.clone(),
            settings: parts.settings.clone(),
            validator: Arc::new(LengthValidator::from_config(&parts.simulation)),
            outcomes: parts.outcomes.clone(),
        },
    ));
    let monitor = {
        let _guard = runtime.enter();
        LatencyMonitor::spawn(
            parts.probe.clone(),
            parts.settings.clone(),
            sink.clone(),
            parts.probe_interval,
        )
    };
    sink.send(EngineEvent::SettingsChanged(parts.settings.load()));
    courier_info!("engine started");

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::Start {
                credential,
                content,
            } => {
                let controller = controller.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    // A stopped run was already reported when the stop command ran.
                    match controller.start(&credential, &content).await {
                        RunOutcome::AlreadyRunning | RunOutcome::Stopped(_) => {}
                        outcome => sink.send(EngineEvent::RunFinished(outcome)),
                    }
                });
            }
            EngineCommand::Stop => {
                if let Some(counters) = controller.stop() {
                    sink.send(EngineEvent::RunFinished(RunOutcome::Stopped(counters)));
                }
            }
            EngineCommand::SetTargets(targets) => controller.set_targets(targets),
            EngineCommand::LoadMessageFile(path) => {
                let loader = parts.loader.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    let name = display_name(&path);
                    let result = loader.load(&path).await;
                    match &result {
                        Ok(content) => {
                            courier_info!("loaded {} ({} chars)", name, content.chars().count());
                            sink.log(Severity::Success, &format!("loaded message file: {name}"));
                        }
                        Err(err) => {
                            courier_warn!("message file load failed: {err}");
                            sink.log(
                                Severity::Error,
                                &format!("failed to load message file: {err}"),
                            );
                        }
                    }
                    sink.send(EngineEvent::MessageFileLoaded { name, result });
                });
            }
            EngineCommand::ToggleSetting(key) => {
                let settings = match parts.settings.toggle(key) {
                    Ok(settings) => settings,
                    Err(err) => {
                        courier_warn!("failed to save settings: {err}");
                        sink.log(
                            Severity::Warning,
                            &format!("settings could not be saved: {err}"),
                        );
                        parts.settings.load()
                    }
                };
                sink.send(EngineEvent::SettingsChanged(settings));
            }
            EngineCommand::Log { severity, message } => sink.log(severity, &message),
            EngineCommand::Shutdown => break,
        }
    }

    controller.stop();
    runtime.block_on(monitor.shutdown());
    runtime.shutdown_timeout(Duration::from_secs(1));
    courier_info!("engine stopped");
}
