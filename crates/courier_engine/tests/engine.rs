use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use courier_core::{Counters, Latency, RunState, SettingKey, Settings, Targets};
use courier_engine::{
    EngineEvent, EngineEvents, EngineHandle, EngineParts, FsFileLoader, LatencyProbe,
    MemorySettingsStore, OutcomeSource, ProbeError, RunError, RunOutcome, SimulationConfig,
};
use tempfile::TempDir;

struct AlwaysSucceeds;

impl OutcomeSource for AlwaysSucceeds {
    fn draw(&self, _success_rate: f64) -> bool {
        true
    }
}

struct QuietProbe;

#[async_trait::async_trait]
impl LatencyProbe for QuietProbe {
    async fn probe(&self) -> Result<Duration, ProbeError> {
        Ok(Duration::from_millis(1))
    }
}

fn engine(settings: Settings, probe_interval: Duration) -> (EngineHandle, EngineEvents) {
    engine_with(SimulationConfig::instant(), settings, probe_interval)
}

fn engine_with(
    simulation: SimulationConfig,
    settings: Settings,
    probe_interval: Duration,
) -> (EngineHandle, EngineEvents) {
    courier_logging::initialize_for_tests();
    EngineHandle::new(EngineParts {
        simulation,
        probe_interval,
        settings: Arc::new(MemorySettingsStore::new(settings)),
        probe: Arc::new(QuietProbe),
        outcomes: Arc::new(AlwaysSucceeds),
        loader: Arc::new(FsFileLoader),
    })
    .expect("engine")
}

/// Collects events until `done` matches one, or panics after a few seconds.
fn collect_until(events: &EngineEvents, done: impl Fn(&EngineEvent) -> bool) -> Vec<EngineEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut seen = Vec::new();
    while Instant::now() < deadline {
        if let Some(event) = events
            .recv_timeout(Duration::from_millis(50))
            .expect("engine alive")
        {
            let finished = done(&event);
            seen.push(event);
            if finished {
                return seen;
            }
        }
    }
    panic!("timed out; saw {seen:?}");
}

#[test]
fn run_through_the_engine_reports_events() {
    let (mut handle, events) = engine(
        Settings {
            spam_dm: true,
            ..Settings::default()
        },
        Duration::from_secs(3600),
    );
    handle.set_targets(Targets {
        groups: 2,
        messages: 1,
    });
    handle.start("abcdefghijkl", "hello");

    let seen = collect_until(&events, |event| {
        matches!(event, EngineEvent::RunFinished(_))
    });

    assert!(seen.contains(&EngineEvent::RunState(RunState::Running)));
    assert!(seen.contains(&EngineEvent::RunState(RunState::Idle)));
    assert_eq!(
        seen.last(),
        Some(&EngineEvent::RunFinished(RunOutcome::Completed(Counters {
            groups_created: 2,
            messages_sent: 1,
            ..Counters::default()
        })))
    );
    let progress = seen
        .iter()
        .filter(|event| matches!(event, EngineEvent::Progress(_)))
        .count();
    assert_eq!(progress, 3);

    handle.shutdown();
}

#[test]
fn rejected_start_reports_failure_without_state_events() {
    let (handle, events) = engine(Settings::default(), Duration::from_secs(3600));
    handle.start("", "hello");

    let seen = collect_until(&events, |event| {
        matches!(event, EngineEvent::RunFinished(_))
    });

    assert!(!seen
        .iter()
        .any(|event| matches!(event, EngineEvent::RunState(_))));
    assert_eq!(
        seen.last(),
        Some(&EngineEvent::RunFinished(RunOutcome::Failed(
            RunError::MissingCredential
        )))
    );
}

#[test]
fn message_file_and_settings_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("hello.txt");
    fs::write(&path, "hi all").unwrap();

    let (handle, events) = engine(Settings::default(), Duration::from_secs(3600));
    handle.load_message_file(&path);
    let seen = collect_until(&events, |event| {
        matches!(event, EngineEvent::MessageFileLoaded { .. })
    });
    assert_eq!(
        seen.last(),
        Some(&EngineEvent::MessageFileLoaded {
            name: "hello.txt".to_string(),
            result: Ok("hi all".to_string()),
        })
    );

    handle.toggle_setting(SettingKey::SpamDm);
    let seen = collect_until(&events, |event| {
        matches!(event, EngineEvent::SettingsChanged(settings) if settings.spam_dm)
    });
    assert!(matches!(seen.last(), Some(EngineEvent::SettingsChanged(_))));
}

#[test]
fn latency_monitor_runs_on_the_engine_runtime() {
    let (mut handle, events) = engine(Settings::default(), Duration::from_millis(20));

    let seen = collect_until(&events, |event| matches!(event, EngineEvent::Latency(_)));
    assert_eq!(seen.last(), Some(&EngineEvent::Latency(Latency::Millis(1))));

    handle.shutdown();
    // Shutdown is idempotent and the event side sees the engine go away.
    handle.shutdown();
    while let Ok(Some(_)) = events.recv_timeout(Duration::from_millis(10)) {}
    assert!(events.recv_timeout(Duration::from_millis(10)).is_err());
}

#[test]
fn stopped_run_is_summarised_once_and_before_the_restart() {
    // Validation takes 100 ms and each attempt delay 50 ms.
    let (mut handle, events) = engine_with(
        SimulationConfig::default().with_time_scale(0.1),
        Settings::default(),
        Duration::from_secs(3600),
    );
    handle.set_targets(Targets {
        groups: 2,
        messages: 1,
    });
    handle.start("abcdefghijkl", "hello");
    std::thread::sleep(Duration::from_millis(120));
    handle.stop();
    handle.start("abcdefghijkl", "hello");

    let seen = collect_until(&events, |event| {
        matches!(event, EngineEvent::RunFinished(RunOutcome::Completed(_)))
    });
    // Give the stale run time to finish its delay; it must stay silent.
    std::thread::sleep(Duration::from_millis(200));
    let mut late = Vec::new();
    while let Some(event) = events.recv_timeout(Duration::from_millis(10)).unwrap() {
        late.push(event);
    }

    let lifecycle: Vec<&EngineEvent> = seen
        .iter()
        .chain(late.iter())
        .filter(|event| {
            matches!(
                event,
                EngineEvent::RunState(_) | EngineEvent::RunFinished(_)
            )
        })
        .collect();
    assert_eq!(lifecycle.len(), 6, "{lifecycle:?}");
    assert_eq!(lifecycle[0], &EngineEvent::RunState(RunState::Running));
    assert_eq!(lifecycle[1], &EngineEvent::RunState(RunState::Idle));
    assert!(matches!(
        lifecycle[2],
        EngineEvent::RunFinished(RunOutcome::Stopped(_))
    ));
    assert_eq!(lifecycle[3], &EngineEvent::RunState(RunState::Running));
    assert_eq!(lifecycle[4], &EngineEvent::RunState(RunState::Idle));
    assert_eq!(
        lifecycle[5],
        &EngineEvent::RunFinished(RunOutcome::Completed(Counters {
            groups_created: 2,
            ..Counters::default()
        }))
    );

    handle.shutdown();
}
