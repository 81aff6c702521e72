use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Simulated bulk-messaging operation console.
///
/// No message is ever sent anywhere: group creation and message sending are
/// simulated with timers and random outcomes. The only network traffic is an
/// optional latency probe.
#[derive(Debug, Parser)]
#[command(name = "courier", version)]
pub struct Cli {
    /// Settings file holding the boolean flags (JSON).
    #[arg(long, default_value = "courier_settings.json")]
    pub settings: PathBuf,

    /// Directory for the console session file.
    #[arg(long, default_value = ".")]
    pub state_dir: PathBuf,

    /// Where diagnostic logs go.
    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    pub log: LogTarget,

    /// Endpoint for the latency probe.
    #[arg(long)]
    pub probe_url: Option<String>,

    #[arg(long, default_value_t = 5000)]
    pub probe_interval_ms: u64,

    /// Multiplier applied to every simulated delay (0.1 runs ten times faster).
    #[arg(long, default_value_t = 1.0)]
    pub time_scale: f64,

    /// Credential token to preload.
    #[arg(long)]
    pub token: Option<String>,

    /// Message file to preload.
    #[arg(long)]
    pub file: Option<PathBuf>,

    #[arg(long)]
    pub groups: Option<u32>,

    #[arg(long)]
    pub messages: Option<u32>,

    /// Start one run right away and exit when it ends.
    #[arg(long)]
    pub run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn headless_flags_parse() {
        let cli = Cli::try_parse_from([
            "courier",
            "--token",
            "abcdefghijkl",
            "--file",
            "msgs.txt",
            "--groups",
            "3",
            "--log",
            "both",
            "--time-scale",
            "0.1",
            "--run",
        ])
        .unwrap();

        assert_eq!(cli.token.as_deref(), Some("abcdefghijkl"));
        assert_eq!(cli.file, Some(PathBuf::from("msgs.txt")));
        assert_eq!(cli.groups, Some(3));
        assert_eq!(cli.messages, None);
        assert_eq!(cli.log, LogTarget::Both);
        assert_eq!(cli.time_scale, 0.1);
        assert!(cli.run);
    }
}
