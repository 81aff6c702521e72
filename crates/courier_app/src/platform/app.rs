use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::bail;
use courier_core::{update, AppState, Msg, RunEnd, Targets};
use courier_engine::{EngineParts, ProbeSettings, SimulationConfig};
use courier_logging::{courier_info, courier_warn};

use super::console::{self, Command, HELP};
use super::effects::EffectRunner;
use super::persistence::{load_targets, JsonSettingsStore};
use super::{logging, render};
use crate::cli::Cli;

const TICK: Duration = Duration::from_millis(75);
const MIN_PROBE_INTERVAL: Duration = Duration::from_millis(250);

/// Everything the main loop reacts to.
pub(crate) enum Input {
    Msg(Msg),
    Status,
}

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    logging::initialize(cli.log);
    courier_info!("courier starting (headless={})", cli.run);

    let store = Arc::new(JsonSettingsStore::open(&cli.settings));
    let simulation = SimulationConfig::default().with_time_scale(cli.time_scale);
    let parts = EngineParts::standard(simulation, &probe_settings(&cli), store)?;

    let (input_tx, input_rx) = mpsc::channel();
    let mut runner = EffectRunner::new(parts, input_tx.clone(), cli.state_dir.clone())?;

    let mut pending: VecDeque<Msg> =
        startup_messages(&cli, load_targets(&cli.state_dir)).into();
    let mut autopilot = if cli.run {
        let autopilot = Autopilot::new(cli.file.is_some());
        if autopilot == Autopilot::AwaitRun {
            pending.push_back(Msg::StartClicked);
        }
        Some(autopilot)
    } else {
        println!("courier ready; type `help` for commands");
        spawn_console(input_tx);
        None
    };

    let mut state = AppState::new();
    loop {
        let msg = match pending.pop_front() {
            Some(msg) => msg,
            None => match input_rx.recv_timeout(TICK) {
                Ok(Input::Msg(msg)) => msg,
                Ok(Input::Status) => {
                    print_lines(render::panel(&state.view()));
                    continue;
                }
                Err(mpsc::RecvTimeoutError::Timeout) => Msg::Tick,
                Err(mpsc::RecvTimeoutError::Disconnected) => Msg::QuitRequested,
            },
        };

        if let Some(next) = autopilot.as_mut().and_then(|pilot| pilot.observe(&msg)) {
            pending.push_back(next);
        }

        let cause = msg.clone();
        let (next_state, effects) = update(state, msg);
        state = next_state;
        runner.enqueue(effects);

        let view = state.view();
        if state.consume_dirty() {
            print_lines(render::render(&view, &cause));
        }
        if view.quitting {
            break;
        }
    }

    courier_info!("courier exiting");
    match state.view().last_run.map(|summary| summary.end) {
        Some(RunEnd::Failed(reason)) if cli.run => bail!("run failed: {reason}"),
        _ => Ok(()),
    }
}

fn probe_settings(cli: &Cli) -> ProbeSettings {
    let defaults = ProbeSettings::default();
    let mut interval = Duration::from_millis(cli.probe_interval_ms);
    if interval < MIN_PROBE_INTERVAL {
        courier_warn!(
            "probe interval {} ms is too short; using {} ms",
            cli.probe_interval_ms,
            MIN_PROBE_INTERVAL.as_millis()
        );
        interval = MIN_PROBE_INTERVAL;
    }
    ProbeSettings {
        endpoint: cli.probe_url.clone().unwrap_or(defaults.endpoint),
        interval,
        request_timeout: interval,
        ..defaults
    }
}

/// Session targets first, then command-line overrides on top.
fn startup_messages(cli: &Cli, restored: Targets) -> Vec<Msg> {
    let mut msgs = vec![Msg::TargetsRestored(restored)];
    if let Some(groups) = cli.groups {
        msgs.push(Msg::GroupTargetChanged(groups.to_string()));
    }
    if let Some(messages) = cli.messages {
        msgs.push(Msg::MessageTargetChanged(messages.to_string()));
    }
    if let Some(token) = &cli.token {
        msgs.push(Msg::CredentialChanged(token.clone()));
    }
    if let Some(file) = &cli.file {
        msgs.push(Msg::MessageFileSelected(file.display().to_string()));
    }
    msgs
}

/// Drives a single unattended run: wait for the file, start, quit when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Autopilot {
    AwaitFile,
    AwaitRun,
    Done,
}

impl Autopilot {
    fn new(has_file: bool) -> Self {
        if has_file {
            Self::AwaitFile
        } else {
            Self::AwaitRun
        }
    }

    fn observe(&mut self, msg: &Msg) -> Option<Msg> {
        match (*self, msg) {
            (Self::AwaitFile, Msg::MessageFileLoaded { .. } | Msg::MessageFileFailed { .. }) => {
                *self = Self::AwaitRun;
                Some(Msg::StartClicked)
            }
            (Self::AwaitRun, Msg::RunFinished(_)) => {
                *self = Self::Done;
                Some(Msg::QuitRequested)
            }
            _ => None,
        }
    }
}

fn spawn_console(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let input = match console::parse_line(&line) {
                Command::Dispatch(msg) => Input::Msg(msg),
                Command::Status => Input::Status,
                Command::Help => {
                    println!("{HELP}");
                    continue;
                }
                Command::Invalid(reason) => {
                    println!("{reason}");
                    continue;
                }
                Command::Empty => continue,
            };
            if input_tx.send(input).is_err() {
                return;
            }
        }
        // EOF behaves like `quit`.
        let _ = input_tx.send(Input::Msg(Msg::QuitRequested));
    });
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
