//! pulsemon: terminal front end for the heart-rate simulator
//!
//! Collects a profile from flags, runs one monitoring session per requested
//! activity while rendering every tick, then prints the session history.

mod dashboard;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use tokio::sync::broadcast;

use pulsemon::types::Gender;
use pulsemon::{
    ActivityKind, MonitorSnapshot, SessionSummary, SignalSimulator, SimulatorConfig, UserProfile,
};

use crate::dashboard::{history_table, profile_lines, TerminalDashboard};

#[derive(Parser)]
#[command(name = "pulsemon", about = "Simulated heart-rate monitor", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the activity profiles
    Profiles {
        #[arg(long)]
        json: bool,
    },
    /// Run monitoring sessions and print their summaries
    Monitor(MonitorArgs),
}

#[derive(Args)]
struct MonitorArgs {
    /// Activity to monitor; repeat to run several sessions back to back
    #[arg(short, long = "activity", required = true)]
    activities: Vec<String>,

    /// Seconds per session
    #[arg(short, long, default_value_t = 30)]
    duration: u64,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    age: Option<u32>,

    /// Height in cm
    #[arg(long)]
    height: Option<f32>,

    /// Weight in kg
    #[arg(long)]
    weight: Option<f32>,

    #[arg(long)]
    gender: Option<Gender>,

    /// Seed for a reproducible signal
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file overriding simulator settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Step without waiting between ticks
    #[arg(long)]
    fast: bool,

    /// Print the session history as JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl MonitorArgs {
    fn profile(&self) -> UserProfile {
        let mut profile = UserProfile::new(self.name.as_deref().unwrap_or_default());
        if let Some(age) = self.age {
            profile = profile.with_age(age);
        }
        if let Some(height) = self.height {
            profile = profile.with_height(height);
        }
        if let Some(weight) = self.weight {
            profile = profile.with_weight(weight);
        }
        if let Some(gender) = self.gender {
            profile = profile.with_gender(gender);
        }
        profile
    }

    fn simulator_config(&self) -> Result<SimulatorConfig> {
        let mut config = match &self.config {
            Some(path) => SimulatorConfig::from_json_file(path)?,
            None => SimulatorConfig::default(),
        };
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Profiles { json } => list_profiles(json),
        Command::Monitor(args) => monitor(args).await,
    }
}

fn list_profiles(json: bool) -> Result<()> {
    if json {
        let profiles: Vec<_> = ActivityKind::ALL
            .iter()
            .map(|kind| serde_json::json!({ "activity": kind.name(), "profile": kind.profile() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }

    println!("{:<10} {:>9} {:>9} {:>9}", "Activity", "Band", "Momentum", "Jitter");
    for kind in ActivityKind::ALL {
        let p = kind.profile();
        println!(
            "{:<10} {:>4}-{:<4} {:>9.1} {:>9.1}",
            kind.name(),
            p.base_min,
            p.base_max,
            p.momentum,
            p.fluctuation
        );
    }
    Ok(())
}

async fn monitor(args: MonitorArgs) -> Result<()> {
    let simulator = SignalSimulator::new(args.simulator_config()?)?;
    session_window(simulator.config().tick_interval(), args.duration)?;
    let profile = args.profile();
    for line in profile_lines(&profile) {
        println!("{}", line);
    }
    simulator.submit_profile(profile);

    let dashboard = Arc::new(TerminalDashboard::new());
    {
        let dashboard = Arc::clone(&dashboard);
        simulator.set_refresh_callback(Box::new(move |snapshot| {
            for line in dashboard.render(snapshot) {
                println!("{}", line);
            }
        }));
    }

    for activity in &args.activities {
        let interrupted = run_session(&simulator, activity, &args).await?;
        if interrupted {
            println!("Interrupted; skipping remaining sessions");
            break;
        }
    }
    simulator.clear_refresh_callback();

    let sessions = simulator.session_history();
    print_history(&sessions, args.json)
}

/// Run one session; returns true when Ctrl-C cut it short.
async fn run_session(
    simulator: &Arc<SignalSimulator>,
    activity: &str,
    args: &MonitorArgs,
) -> Result<bool> {
    let profile = simulator.configure_activity(activity);
    println!();
    println!(
        "== {} ({}-{} bpm band) for {}s ==",
        activity, profile.base_min, profile.base_max, args.duration
    );

    let mut interrupted = false;
    if args.fast {
        simulator.open_session(activity)?;
        for _ in 0..args.duration {
            if simulator.tick()?.is_none() {
                break;
            }
        }
    } else {
        let window = session_window(simulator.config().tick_interval(), args.duration)?;
        let mut updates = simulator.subscribe();
        let session_id = simulator.start_session(activity)?;
        log::debug!("session {} running", session_id);

        tokio::select! {
            _ = tokio::time::sleep(window) => {}
            _ = wait_until_halted(&mut updates) => {}
            _ = tokio::signal::ctrl_c() => interrupted = true,
        }
    }

    match simulator.stop_session() {
        Some(summary) => println!(
            "Session done: avg {:.1} bpm, max {}, min {}, duration {}",
            summary.avg_bpm, summary.max_bpm, summary.min_bpm, summary.duration
        ),
        None => println!("Session recorded no readings"),
    }
    if let Some(fault) = simulator.state().last_fault() {
        eprintln!("Simulation halted early: {}", fault);
    }
    Ok(interrupted)
}

/// How long to let a session of `duration` steps run; steps land at
/// t = 0, 1, ..., duration - 1 ticks.
fn session_window(tick: Duration, duration: u64) -> Result<Duration> {
    if duration == 0 {
        bail!("--duration must be at least one second");
    }
    let total = u32::try_from(duration)
        .ok()
        .and_then(|ticks| tick.checked_mul(ticks));
    match total {
        Some(total) => Ok(total - tick / 2),
        None => bail!("--duration {} is too large", duration),
    }
}

/// Resolves once a snapshot reports that monitoring stopped, e.g. on a fault.
async fn wait_until_halted(updates: &mut broadcast::Receiver<MonitorSnapshot>) {
    loop {
        match updates.recv().await {
            Ok(snapshot) if !snapshot.is_monitoring => return,
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}

fn print_history(sessions: &[SessionSummary], json: bool) -> Result<()> {
    println!();
    if json {
        println!("{}", serde_json::to_string_pretty(sessions)?);
    } else {
        println!("Session history");
        for line in history_table(sessions) {
            println!("{}", line);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_args_parse() {
        let cli = Cli::parse_from([
            "pulsemon", "monitor", "-a", "Running", "-a", "Gym", "--duration", "5", "--gender",
            "female", "--age", "30", "--seed", "7", "--fast",
        ]);
        let Command::Monitor(args) = cli.command else {
            panic!("expected monitor command");
        };
        assert_eq!(args.activities, vec!["Running", "Gym"]);
        assert_eq!(args.duration, 5);
        assert!(args.fast);

        let profile = args.profile();
        assert_eq!(profile.name, "User");
        assert_eq!(profile.gender, Some(Gender::Female));
        assert_eq!(profile.age, Some(30));
        assert_eq!(args.simulator_config().unwrap().seed, Some(7));
    }

    #[tokio::test]
    async fn test_fast_session_records_summary() {
        let cli = Cli::parse_from([
            "pulsemon", "monitor", "-a", "Walking", "-d", "4", "--seed", "1", "--fast",
        ]);
        let Command::Monitor(args) = cli.command else {
            panic!("expected monitor command");
        };
        let simulator = SignalSimulator::new(args.simulator_config().unwrap()).unwrap();
        let interrupted = run_session(&simulator, "Walking", &args).await.unwrap();
        assert!(!interrupted);

        let history = simulator.session_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].duration, "0:04");
    }

    #[test]
    fn test_session_window_rejects_bad_durations() {
        let tick = Duration::from_secs(1);
        assert_eq!(session_window(tick, 5).unwrap(), Duration::from_millis(4500));
        assert!(session_window(tick, 0).is_err());
        assert!(session_window(tick, u64::from(u32::MAX) + 1).is_err());
        assert!(session_window(tick, u64::MAX).is_err());
        assert!(session_window(Duration::from_secs(u64::MAX / 2), 3).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_ends_when_task_faults() {
        let simulator = SignalSimulator::new(SimulatorConfig::default().with_seed(3)).unwrap();
        let mut updates = simulator.subscribe();
        simulator.start_session("Running").unwrap();
        simulator.inject_heart_rate(f64::NAN);

        tokio::time::timeout(Duration::from_secs(30), wait_until_halted(&mut updates))
            .await
            .unwrap();
        assert!(!simulator.is_monitoring());
        assert!(simulator.state().last_fault().is_some());
    }
}
