//! Stand-in host: owns the scheduler, drives it in a fixed-timestep loop,
//! and tears it down the way a real frame-driven host would.

mod config;

use anyhow::Result;
use tracing::info;

use conditional::{Scheduler, SchedulerConfig, TickDelta};

use crate::config::HarnessConfig;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "harness.toml".to_string());
    let config = HarnessConfig::load(&path)?;
    info!(?config, "harness starting");

    let mut sched = Scheduler::new(SchedulerConfig {
        run_mode: config.run_mode(),
        ..SchedulerConfig::default()
    });

    spawn_demo_chains(&mut sched, &config);

    let dt = config.frame_dt();
    let delta = TickDelta::new(dt * config.time_scale, dt);
    for frame in 1..=config.frames {
        sched.tick(delta);
        if sched.active_count() == 0 {
            info!(frame, "all chains finished");
            break;
        }
    }

    // Host teardown: drop whatever is still pending without running it.
    sched.clear();
    Ok(())
}

fn spawn_demo_chains(sched: &mut Scheduler, config: &HarnessConfig) {
    let time = sched.time();

    // Startup banner after one second of game time, then a follow-up.
    sched
        .wait(1.0)
        .run(|| info!("one second of game time elapsed"))
        .then_wait(0.5)
        .run(|| info!("and another half second"));

    // A gated chain: fires once game time passes the two-second mark.
    let gate_time = time.clone();
    sched
        .when(move || gate_time.now() > 2.0)
        .run(|| info!("passed the two-second mark"))
        .then_run(|| info!("chain continuation on the next frame"));

    // Heartbeat on real time, so it keeps beating even at time_scale 0.
    sched
        .wait(1.0)
        .unscaled_time(true)
        .run(|| info!("one real second elapsed"));

    // Periodic pulse: three times, half a second apart.
    sched.repeat(0.5, 3, || info!("pulse"));

    // Bounded spinner for the first quarter second of game time. A
    // continuous link never self-terminates, so a watcher cancels it once
    // its window has passed; cancellation still promotes the continuation.
    let spin_time = sched.time();
    let spinner = sched.for_seconds(0.25);
    let spinner_handle = spinner.handle();
    spinner
        .run(move || tracing::debug!(now = spin_time.now(), "spinning"))
        .then_run(|| info!("spinner done"));

    let watch_time = time.clone();
    sched
        .when(move || watch_time.now() > 0.25)
        .run(move || spinner_handle.cancel());

    info!(
        active = sched.active_count(),
        frames = config.frames,
        "demo chains scheduled"
    );
}
