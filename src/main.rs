mod app;
mod color;
mod config;
mod decor;
mod disk;
mod doppler;
mod draw;
mod geometry;
mod input;
mod jets;
mod lensing;
mod math;
mod particles;
mod render;
mod sim;
mod thermal;
mod tidal;

use anyhow::{Context, Result};
use clap::Parser;
use std::{fs::OpenOptions, path::Path, sync::Mutex};
use tracing_subscriber::EnvFilter;

/// stdout belongs to the alternate screen, so logs go to a file.
fn init_logging(path: &Path, verbose: bool) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = config::Cli::parse();
    let paths = config::project_paths()?;

    init_logging(cli.log_file.as_deref().unwrap_or(paths.log_path.as_path()), cli.verbose)?;

    let settings = config::resolve(&cli, &paths.settings_path)?;
    let geo = geometry::BlackHoleGeometry::derive(settings.mass_solar, settings.horizon_px, settings.light_speed_px);
    tracing::info!(
        mass_solar = settings.mass_solar,
        rs_m = geo.rs_m,
        horizon_px = geo.event_horizon_radius,
        photon_sphere_px = geo.photon_sphere_radius,
        isco_px = geo.isco_radius,
        seed = ?settings.seed,
        "starting"
    );

    if let Some(ticks) = cli.ticks {
        let census = app::run_headless(&settings, ticks);
        println!("{census}");
        return Ok(());
    }

    app::run(settings)
}
