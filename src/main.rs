use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::{error, info};

use formation_sim::config::{presets, RunConfig};
use formation_sim::control::formation;
use formation_sim::sim::{Coordinator, KinematicBridge};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormationKind {
    VShape,
    Line,
}

/// Leader-follower quadcopter swarm simulation.
#[derive(Debug, Parser)]
#[command(name = "formation-sim", version, about)]
struct Args {
    /// Run configuration (TOML). Defaults to the built-in reference mission.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Formation the followers hold.
    #[arg(long, value_enum, default_value = "v-shape")]
    formation: FormationKind,

    /// Where the tracking-error log is written.
    #[arg(long, default_value = "tracking_errors.csv")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RunConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => presets::reference(),
    };
    let formation = match args.formation {
        FormationKind::VShape => formation::presets::v_shape(),
        FormationKind::Line => formation::presets::line(),
    };
    info!(
        "starting mission: {} quads, formation '{}', {} steps",
        config.quad_num, formation.name, config.loop_num
    );

    let bridge = KinematicBridge::new(config.dt);
    let mut coordinator = Coordinator::new(config, formation, bridge)?;

    let stop = coordinator.stop_flag();
    ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
        .context("installing interrupt handler")?;

    // The tracking log is persisted even when the run ends early; the error
    // (if any) propagates after the shutdown path has executed.
    let run_result = coordinator.run();
    coordinator.dump_swarm();

    match coordinator.tracking_log().write_csv_file(&args.output) {
        Ok(()) => info!(
            "tracking errors saved to {} ({} rows); chart them with formation-viz",
            args.output.display(),
            coordinator.tracking_log().len()
        ),
        Err(e) => error!("failed to save tracking errors: {e}"),
    }

    run_result?;
    Ok(())
}
