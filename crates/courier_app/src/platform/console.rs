use courier_core::{Msg, SettingKey};

pub const HELP: &str = "\
commands:
  token <value>      set the credential token (kept in memory only)
  load <path>        load the message file
  groups <n>         set the group target
  messages <n>       set the message target
  toggle <flag>      flip showLogs | spamDm | leaveGroup | pingTest
  start              start a run
  stop               stop the active run
  clear              clear the log
  status             show the panel
  help               show this help
  quit               stop everything and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Msg),
    Status,
    Help,
    Empty,
    Invalid(String),
}

/// Parses one line typed at the console.
pub fn parse_line(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match (word.to_ascii_lowercase().as_str(), rest) {
        ("token", value) => Command::Dispatch(Msg::CredentialChanged(value.to_string())),
        ("load", "") => Command::Invalid("usage: load <path>".to_string()),
        ("load", path) => Command::Dispatch(Msg::MessageFileSelected(path.to_string())),
        ("groups", value) => Command::Dispatch(Msg::GroupTargetChanged(value.to_string())),
        ("messages", value) => Command::Dispatch(Msg::MessageTargetChanged(value.to_string())),
        ("toggle", flag) => match SettingKey::parse(flag) {
            Some(key) => Command::Dispatch(Msg::SettingToggled(key)),
            None => Command::Invalid(format!(
                "unknown flag {flag:?}; expected one of {}",
                SettingKey::ALL.map(SettingKey::as_str).join(", ")
            )),
        },
        ("start", _) => Command::Dispatch(Msg::StartClicked),
        ("stop", _) => Command::Dispatch(Msg::StopClicked),
        ("clear", _) => Command::Dispatch(Msg::ClearLogsClicked),
        ("quit" | "exit", _) => Command::Dispatch(Msg::QuitRequested),
        ("status", _) => Command::Status,
        ("help" | "?", _) => Command::Help,
        (other, _) => Command::Invalid(format!("unknown command {other:?}; try `help`")),
    }
}
