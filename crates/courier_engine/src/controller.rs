use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use courier_core::{Counters, RunState, Severity, Targets};
use courier_logging::{courier_debug, courier_error, courier_info, courier_warn, redact};
use tokio_util::sync::CancellationToken;

use crate::{
    CredentialValidator, LogSink, OutcomeSource, Phase, Progress, ProgressSink, RunError,
    RunOutcome, SettingsStore, SimulationConfig,
};

/// Collaborators injected into the controller.
pub struct ControllerDeps {
    pub log: Arc<dyn LogSink>,
    pub progress: Arc<dyn ProgressSink>,
    pub settings: Arc<dyn SettingsStore>,
    pub validator: Arc<dyn CredentialValidator>,
    pub outcomes: Arc<dyn OutcomeSource>,
}

/// Owns the run state and executes the simulated operation sequence:
/// validate, create groups, then optionally send messages.
///
/// Only one run is active at a time. Stopping is cooperative: the run polls
/// its cancellation token between delays, so an in-flight delay always runs
/// to completion.
pub struct OperationController {
    config: SimulationConfig,
    deps: ControllerDeps,
    slots: Mutex<Slots>,
}

#[derive(Default)]
struct Slots {
    targets: Targets,
    active: Option<Arc<RunContext>>,
    latest: Option<Arc<RunContext>>,
    next_id: u64,
}

struct RunContext {
    id: u64,
    targets: Targets,
    cancel: CancellationToken,
    counters: Mutex<Counters>,
}

impl RunContext {
    fn new(id: u64, targets: Targets) -> Self {
        Self {
            id,
            targets,
            cancel: CancellationToken::new(),
            counters: Mutex::new(Counters::default()),
        }
    }

    fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn counters(&self) -> Counters {
        *lock(&self.counters)
    }

    /// Counts one attempt; the attempt counter moves whether or not it succeeded.
    fn record(&self, phase: Phase, success: bool) -> Counters {
        let mut counters = lock(&self.counters);
        match phase {
            Phase::Groups => {
                counters.groups_created += 1;
                counters.group_failures += u32::from(!success);
            }
            Phase::Messages => {
                counters.messages_sent += 1;
                counters.message_failures += u32::from(!success);
            }
        }
        *counters
    }
}

struct PhasePlan {
    phase: Phase,
    target: u32,
    attempt_delay: Duration,
    cooldown: Duration,
    success_rate: f64,
}

impl OperationController {
    pub fn new(config: SimulationConfig, deps: ControllerDeps) -> Self {
        Self {
            config,
            deps,
            slots: Mutex::new(Slots::default()),
        }
    }

    pub fn run_state(&self) -> RunState {
        if lock(&self.slots).active.is_some() {
            RunState::Running
        } else {
            RunState::Idle
        }
    }

    pub fn targets(&self) -> Targets {
        lock(&self.slots).targets
    }

    /// Takes effect from the next run; an active run keeps the targets it started with.
    pub fn set_targets(&self, targets: Targets) {
        courier_debug!(
            "targets set: groups={} messages={}",
            targets.groups,
            targets.messages
        );
        lock(&self.slots).targets = targets;
    }

    /// Counters of the active run, or of the most recent one.
    pub fn counters(&self) -> Counters {
        lock(&self.slots)
            .latest
            .as_ref()
            .map(|run| run.counters())
            .unwrap_or_default()
    }

    pub async fn validate(&self, credential: &str) -> bool {
        self.emit(Severity::Info, "validating credential...");
        self.deps.validator.validate(credential).await
    }

    /// Runs the whole sequence and returns once the controller is idle again.
    pub async fn start(&self, credential: &str, content: &str) -> RunOutcome {
        let credential = credential.trim();
        if self.run_state() == RunState::Running {
            courier_debug!("start ignored: a run is already active");
            return RunOutcome::AlreadyRunning;
        }
        if credential.is_empty() {
            return self.reject(RunError::MissingCredential);
        }
        if content.is_empty() {
            return self.reject(RunError::MissingContent);
        }
        let Some(run) = self.begin() else {
            return RunOutcome::AlreadyRunning;
        };
        courier_info!(
            "run {} started: credential={} content_chars={} groups={} messages={}",
            run.id,
            redact(credential),
            content.chars().count(),
            run.targets.groups,
            run.targets.messages
        );

        let result = self.execute(&run, credential).await;
        match &result {
            Err(err) if !run.is_stopped() => self.emit(Severity::Error, &format!("error: {err}")),
            Ok(()) if !run.is_stopped() => {
                let counters = run.counters();
                self.emit(
                    Severity::Success,
                    &format!(
                        "operation finished: {} groups, {} messages",
                        counters.groups_created, counters.messages_sent
                    ),
                );
            }
            _ => {}
        }
        let stopped = !self.finish(&run);

        let counters = run.counters();
        match result {
            _ if stopped => RunOutcome::Stopped(counters),
            Err(err) => RunOutcome::Failed(err),
            Ok(()) => RunOutcome::Completed(counters),
        }
    }

    /// Requests the active run to halt and returns its final counters.
    /// Returns `None` when idle.
    ///
    /// No attempt is recorded for the run after this, so the counters are final
    /// even though its task may still be finishing a delay.
    pub fn stop(&self) -> Option<Counters> {
        let run = lock(&self.slots).active.take()?;
        run.cancel.cancel();
        courier_info!("run {} stop requested", run.id);
        self.emit(Severity::Warning, "operation stopped");
        self.deps.progress.run_state_changed(RunState::Idle);
        Some(run.counters())
    }

    fn reject(&self, err: RunError) -> RunOutcome {
        self.emit(Severity::Error, &err.to_string());
        RunOutcome::Failed(err)
    }

    fn begin(&self) -> Option<Arc<RunContext>> {
        let run = {
            let mut slots = lock(&self.slots);
            if slots.active.is_some() {
                return None;
            }
            slots.next_id += 1;
            let run = Arc::new(RunContext::new(slots.next_id, slots.targets));
            slots.active = Some(run.clone());
            slots.latest = Some(run.clone());
            run
        };
        self.deps.progress.run_state_changed(RunState::Running);
        Some(run)
    }

    /// Returns false when `stop` already took the run.
    fn finish(&self, run: &RunContext) -> bool {
        let was_active = {
            let mut slots = lock(&self.slots);
            match &slots.active {
                Some(active) if active.id == run.id => {
                    slots.active = None;
                    true
                }
                _ => false,
            }
        };
        // A stopped run already reported Idle from `stop`.
        if was_active {
            self.deps.progress.run_state_changed(RunState::Idle);
        }
        courier_info!("run {} ended", run.id);
        was_active
    }

    async fn execute(&self, run: &RunContext, credential: &str) -> Result<(), RunError> {
        if !self.validate(credential).await {
            return Err(RunError::InvalidCredential);
        }
        self.emit(Severity::Info, "starting operation...");

        self.run_phase(
            run,
            PhasePlan {
                phase: Phase::Groups,
                target: run.targets.groups,
                attempt_delay: self.config.group_attempt_delay,
                cooldown: self.config.group_cooldown,
                success_rate: self.config.group_success_rate,
            },
        )
        .await;

        if run.is_stopped() {
            return Ok(());
        }
        if !self.deps.settings.load().spam_dm {
            courier_debug!("run {}: message phase disabled", run.id);
            return Ok(());
        }

        self.emit(Severity::Info, "starting message phase...");
        self.run_phase(
            run,
            PhasePlan {
                phase: Phase::Messages,
                target: run.targets.messages,
                attempt_delay: self.config.message_attempt_delay,
                cooldown: self.config.message_cooldown,
                success_rate: self.config.message_success_rate,
            },
        )
        .await;
        Ok(())
    }

    async fn run_phase(&self, run: &RunContext, plan: PhasePlan) {
        let (working, succeeded, failed) = match plan.phase {
            Phase::Groups => ("creating group", "group created", "group creation failed"),
            Phase::Messages => ("sending message", "message sent", "message send failed"),
        };

        for attempt in 1..=plan.target {
            if run.is_stopped() {
                break;
            }
            self.emit(
                Severity::Info,
                &format!("{working}... ({attempt}/{})", plan.target),
            );
            tokio::time::sleep(plan.attempt_delay).await;
            // The attempt belongs to a stopped run; a newer run may own the display.
            if run.is_stopped() {
                break;
            }

            let success = self.deps.outcomes.draw(plan.success_rate);
            if success {
                self.emit(Severity::Success, succeeded);
            } else {
                self.emit(Severity::Error, failed);
            }
            let counters = run.record(plan.phase, success);
            self.deps.progress.report(Progress {
                phase: plan.phase,
                counters,
                targets: run.targets,
            });

            tokio::time::sleep(plan.cooldown).await;
        }
    }

    fn emit(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Error => courier_error!("{message}"),
            Severity::Warning => courier_warn!("{message}"),
            Severity::Info | Severity::Success => courier_info!("{message}"),
        }
        self.deps.log.log(severity, message);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
