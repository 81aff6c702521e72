use courier_core::{AppViewModel, LogEntry, Msg, RunEnd, RunState, RunSummary, Severity};

const BAR_WIDTH: usize = 20;
const PANEL_LOG_TAIL: usize = 10;

/// Lines to print after `cause` changed the state into `view`.
pub fn render(view: &AppViewModel, cause: &Msg) -> Vec<String> {
    match cause {
        Msg::LogAppended(entry) => {
            let always = matches!(entry.severity, Severity::Error | Severity::Warning);
            if view.settings.show_logs || always {
                vec![log_line(entry)]
            } else {
                Vec::new()
            }
        }
        Msg::ProgressUpdated { .. } if !view.settings.show_logs => vec![progress_line(view)],
        Msg::RunStateChanged(RunState::Running) => vec!["run started".to_string()],
        Msg::RunFinished(summary) => vec![summary_line(summary)],
        Msg::SettingsChanged(_) => vec![settings_line(view)],
        Msg::GroupTargetChanged(_) | Msg::MessageTargetChanged(_) | Msg::TargetsRestored(_) => {
            vec![format!(
                "targets: {} groups, {} messages",
                view.targets.groups, view.targets.messages
            )]
        }
        Msg::CredentialChanged(_) if view.credential_set => vec!["credential set".to_string()],
        Msg::CredentialChanged(_) => vec!["credential cleared".to_string()],
        _ => Vec::new(),
    }
}

/// Full panel for the `status` command.
pub fn panel(view: &AppViewModel) -> Vec<String> {
    let state = match view.run_state {
        RunState::Idle => "idle",
        RunState::Running => "running",
    };
    let ping = view
        .latency
        .as_ref()
        .map(|latency| format!("{} ({})", latency.text, latency.tier.label()))
        .unwrap_or_else(|| "---".to_string());
    let file = match &view.message_file {
        Some(name) => format!("{name} ({} chars)", view.message_len),
        None => "none".to_string(),
    };

    let mut lines = vec![
        format!("state:       {state}"),
        format!(
            "groups:      {}/{} ({} failed)",
            view.counters.groups_created, view.targets.groups, view.counters.group_failures
        ),
        format!(
            "messages:    {}/{} ({} failed)",
            view.counters.messages_sent, view.targets.messages, view.counters.message_failures
        ),
        format!(
            "progress:    {} {}%",
            progress_bar(view.group_progress),
            view.completion_percent
        ),
        format!(
            "credential:  {}",
            if view.credential_set { "set" } else { "missing" }
        ),
        format!("message:     {file}"),
        format!("ping:        {ping}"),
        settings_line(view),
    ];
    if let Some(summary) = &view.last_run {
        lines.push(summary_line(summary));
    }
    let skip = view.log.len().saturating_sub(PANEL_LOG_TAIL);
    lines.extend(view.log.iter().skip(skip).map(log_line));
    lines
}

pub fn log_line(entry: &LogEntry) -> String {
    format!(
        "[{}] {:<7} {}",
        entry.at,
        entry.severity.label(),
        entry.message
    )
}

fn progress_line(view: &AppViewModel) -> String {
    format!(
        "{} groups {}/{} messages {}/{}",
        progress_bar(view.group_progress),
        view.counters.groups_created,
        view.targets.groups,
        view.counters.messages_sent,
        view.targets.messages
    )
}

fn summary_line(summary: &RunSummary) -> String {
    let counters = summary.counters;
    match &summary.end {
        RunEnd::Completed => format!(
            "run completed: {} groups ({} failed), {} messages ({} failed)",
            counters.groups_created,
            counters.group_failures,
            counters.messages_sent,
            counters.message_failures
        ),
        RunEnd::Stopped => format!(
            "run stopped: {} groups, {} messages",
            counters.groups_created, counters.messages_sent
        ),
        RunEnd::Failed(reason) => format!("run failed: {reason}"),
    }
}

fn settings_line(view: &AppViewModel) -> String {
    let flag = |on: bool| if on { "on" } else { "off" };
    format!(
        "settings:    showLogs={} spamDm={} leaveGroup={} pingTest={}",
        flag(view.settings.show_logs),
        flag(view.settings.spam_dm),
        flag(view.settings.leave_group),
        flag(view.settings.ping_test)
    )
}

fn progress_bar(fraction: f64) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}
