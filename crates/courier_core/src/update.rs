use crate::{
    parse_target, AppState, Effect, Msg, RunState, Severity, Targets, DEFAULT_GROUPS_TARGET,
    DEFAULT_MESSAGES_TARGET,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::CredentialChanged(raw) => {
            state.set_credential(&raw);
            Vec::new()
        }
        Msg::MessageFileSelected(path) => {
            let path = path.trim();
            if path.is_empty() {
                Vec::new()
            } else {
                vec![Effect::LoadMessageFile {
                    path: path.to_string(),
                }]
            }
        }
        Msg::MessageFileLoaded { name, content } => {
            state.set_message(name, content);
            Vec::new()
        }
        // The engine already logged the read error; the previous content stays loaded.
        Msg::MessageFileFailed { .. } => Vec::new(),
        Msg::GroupTargetChanged(raw) => {
            let targets = Targets {
                groups: parse_target(&raw, DEFAULT_GROUPS_TARGET),
                ..state.targets()
            };
            configure_targets(&mut state, targets)
        }
        Msg::MessageTargetChanged(raw) => {
            let targets = Targets {
                messages: parse_target(&raw, DEFAULT_MESSAGES_TARGET),
                ..state.targets()
            };
            configure_targets(&mut state, targets)
        }
        Msg::TargetsRestored(targets) => {
            state.set_targets(targets);
            vec![Effect::ConfigureTargets(state.targets())]
        }
        Msg::SettingToggled(key) => vec![Effect::ToggleSetting(key)],
        Msg::SettingsChanged(settings) => {
            state.set_settings(settings);
            Vec::new()
        }
        Msg::StartClicked => {
            if state.run_state() == RunState::Idle {
                // Preconditions are enforced by the controller so a rejected
                // start still reaches the log.
                vec![Effect::StartRun {
                    credential: state.credential().to_string(),
                    content: state.message_content().to_string(),
                }]
            } else {
                Vec::new()
            }
        }
        Msg::StopClicked => {
            if state.run_state() == RunState::Running {
                vec![Effect::StopRun]
            } else {
                Vec::new()
            }
        }
        Msg::ClearLogsClicked => {
            state.clear_log();
            vec![Effect::Log {
                severity: Severity::Info,
                message: "logs cleared".to_string(),
            }]
        }
        Msg::LogAppended(entry) => {
            state.push_log(entry);
            Vec::new()
        }
        Msg::ProgressUpdated { counters } => {
            state.set_counters(counters);
            Vec::new()
        }
        Msg::RunStateChanged(run_state) => {
            state.set_run_state(run_state);
            Vec::new()
        }
        Msg::RunFinished(summary) => {
            // The engine reports Idle before a run's summary, so a summary
            // arriving while Running belongs to an earlier, stopped run.
            if state.run_state() == RunState::Idle {
                state.finish_run(summary);
            }
            Vec::new()
        }
        Msg::LatencyMeasured(latency) => {
            state.set_latency(latency);
            Vec::new()
        }
        Msg::QuitRequested => {
            state.mark_quitting();
            vec![Effect::Shutdown]
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn configure_targets(state: &mut AppState, targets: Targets) -> Vec<Effect> {
    if state.set_targets(targets) {
        vec![Effect::ConfigureTargets(targets)]
    } else {
        Vec::new()
    }
}
