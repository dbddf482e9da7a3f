//! End-to-end monitoring sessions driven by the periodic stepping task.
//!
//! Runs on tokio's paused clock, so a minute of ticks completes instantly.
//!
//! Run with:
//!   cargo test --test session_lifecycle

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pulsemon::monitor::stepper::{HR_CEILING, HR_FLOOR};
use pulsemon::monitor::{LogLevel, ScriptedSource, SessionPhase};
use pulsemon::{ActivityProfile, MonitorSnapshot, SignalSimulator, SimulatorConfig, UserProfile};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn seeded(seed: u64) -> Arc<SignalSimulator> {
    SignalSimulator::new(SimulatorConfig::default().with_seed(seed)).unwrap()
}

/// Let the stepping task take `ticks` steps (the first fires immediately).
async fn run_ticks(sim: &SignalSimulator, ticks: u64) {
    let interval = sim.config().tick_interval();
    tokio::time::sleep(interval * ticks as u32 - interval / 2).await;
}

fn record_snapshots(sim: &SignalSimulator) -> Arc<Mutex<Vec<MonitorSnapshot>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    sim.set_refresh_callback(Box::new(move |snapshot| {
        sink.lock().unwrap().push(snapshot.clone());
    }));
    seen
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_full_session_flow() {
    let sim = seeded(100);
    assert_eq!(sim.phase(), SessionPhase::ProfileIncomplete);

    sim.submit_profile(UserProfile::new("Jo").with_age(41));
    assert_eq!(sim.phase(), SessionPhase::ProfileSet);

    sim.configure_activity("Running");
    assert_eq!(sim.phase(), SessionPhase::Ready);

    sim.start_session("Running").unwrap();
    assert_eq!(sim.phase(), SessionPhase::Monitoring);
    run_ticks(&sim, 5).await;

    {
        let state = sim.state();
        let readings = state.session_readings();
        assert_eq!(readings.len(), 5);
        let (min, max) = (state.min_bpm().unwrap(), state.max_bpm().unwrap());
        assert!(readings.iter().all(|r| min <= *r && *r <= max));
        let mean = readings.iter().sum::<f64>() / 5.0;
        assert!((state.avg_bpm().unwrap() - mean).abs() < 1e-9);
        assert_eq!(state.profile().unwrap().name, "Jo");
    }

    let summary = sim.stop_session().unwrap();
    assert_eq!(summary.activity, "Running");
    assert_eq!(summary.duration, "0:05");
    assert_eq!(sim.phase(), SessionPhase::Ready);
    assert_eq!(sim.session_history(), vec![summary]);
}

#[tokio::test(start_paused = true)]
async fn test_rolling_window_after_sixty_five_ticks() {
    let sim = seeded(65);
    sim.start_session("Swimming").unwrap();
    run_ticks(&sim, 65).await;
    sim.stop_session().unwrap();

    let state = sim.state();
    assert_eq!(state.history().len(), 60);
    let ticks: Vec<u64> = state.history().iter().map(|p| p.tick).collect();
    assert_eq!(ticks.first(), Some(&6));
    assert_eq!(ticks.last(), Some(&65));
    assert!(ticks.windows(2).all(|w| w[1] == w[0] + 1));
    assert!(state
        .session_readings()
        .iter()
        .all(|r| (HR_FLOOR..=HR_CEILING).contains(r)));
}

#[tokio::test(start_paused = true)]
async fn test_observer_reads_happen_after_each_tick() {
    let sim = seeded(7);
    let seen = record_snapshots(&sim);
    sim.start_session("Gym").unwrap();
    run_ticks(&sim, 3).await;
    sim.stop_session();
    sim.clear_refresh_callback();

    let seen = seen.lock().unwrap();
    let ticks: Vec<u64> = seen.iter().map(|s| s.time_counter).collect();
    assert_eq!(ticks, vec![1, 2, 3]);
    assert!(seen.iter().all(|s| s.is_monitoring));
    assert_eq!(seen.last().unwrap().history.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_stop_runs_single_task() {
    let sim = seeded(12);
    sim.start_session("Walking").unwrap();
    run_ticks(&sim, 2).await;
    sim.stop_session().unwrap();

    sim.start_session("Resting").unwrap();
    run_ticks(&sim, 4).await;
    // A leftover task from the first session would double the tick rate
    assert_eq!(sim.state().time_counter(), 4);
    sim.stop_session().unwrap();

    let history = sim.session_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].activity, "Walking");
    assert_eq!(history[1].activity, "Resting");
    assert_eq!(history[1].total_seconds, 4);
}

#[tokio::test(start_paused = true)]
async fn test_fault_in_task_stops_monitoring() {
    // Scripted draws never fault; inject a non-finite value mid-session
    let sim = SignalSimulator::with_random_source(
        SimulatorConfig::default(),
        ScriptedSource::new(vec![0.3, 0.6, 0.9]),
    )
    .unwrap();
    sim.start_session("Resting").unwrap();
    run_ticks(&sim, 2).await;

    sim.inject_heart_rate(f64::INFINITY);
    tokio::time::sleep(Duration::from_secs(1)).await;

    let snapshot = sim.snapshot();
    assert!(!snapshot.is_monitoring);
    assert!(snapshot.last_fault.is_some());
    assert_eq!(snapshot.logs[0].level, LogLevel::Alert);

    // Further time passes without any step
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(sim.state().session_readings().len(), 2);

    let summary = sim.stop_session().unwrap();
    assert_eq!(summary.total_seconds, 2);
}

#[tokio::test(start_paused = true)]
async fn test_profile_captured_at_start() {
    let sim = seeded(31);
    sim.start_session("Resting").unwrap();
    sim.configure_activity("Running");
    run_ticks(&sim, 3).await;

    let state = sim.state();
    assert_eq!(state.session_profile(), Some(ActivityProfile::new(60.0, 80.0, 0.9, 0.5)));
    assert_eq!(state.activity(), "Running");
    drop(state);

    let summary = sim.stop_session().unwrap();
    assert_eq!(summary.activity, "Resting");
}

#[tokio::test(start_paused = true)]
async fn test_faster_tick_interval() {
    let config = SimulatorConfig::default()
        .with_seed(4)
        .with_tick_interval(Duration::from_millis(250));
    let sim = SignalSimulator::new(config).unwrap();
    sim.start_session("Walking").unwrap();

    tokio::time::sleep(Duration::from_millis(1100)).await;
    // Steps at 0, 250, 500, 750 and 1000 ms
    assert_eq!(sim.state().total_time_seconds(), 5);
    sim.stop_session().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_immediate_stop_drops_empty_session() {
    let sim = seeded(2);
    let mut rx = sim.subscribe();

    // Open without a task, stop before any tick
    sim.open_session("Walking").unwrap();
    assert!(sim.stop_session().is_none());
    assert!(sim.session_history().is_empty());

    let opened = rx.recv().await.unwrap();
    assert!(opened.is_monitoring);
    let stopped = rx.recv().await.unwrap();
    assert!(!stopped.is_monitoring);
}
