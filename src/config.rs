use crate::tidal::SPAWN_RADIUS_MAX;
use anyhow::{ensure, Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) mass_solar: f64,
    pub(crate) horizon_px: f64,
    pub(crate) world_width: f64,
    pub(crate) world_height: f64,
    pub(crate) star_count: usize,
    pub(crate) lensing_radius: f64,
    pub(crate) particle_count: usize,
    pub(crate) disk_outer_radius: f64,
    pub(crate) disk_sweep_outer: f64,
    pub(crate) jet_count: usize,
    pub(crate) photon_ring_count: usize,
    pub(crate) hawking_count: usize,
    pub(crate) max_tidal_bodies: usize,
    pub(crate) max_fragments: usize,
    pub(crate) disruption_radius: f64,
    pub(crate) outer_bound: f64,
    pub(crate) tick_rate: u32,
    pub(crate) light_speed_px: f64,
    pub(crate) pan_step: f64,
    pub(crate) enable_color: bool,
    pub(crate) seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mass_solar: 10.0,
            horizon_px: 90.0,
            world_width: 900.0,
            world_height: 900.0,
            star_count: 600,
            lensing_radius: 420.0,
            particle_count: 1200,
            disk_outer_radius: 350.0,
            disk_sweep_outer: 360.0,
            jet_count: 150,
            photon_ring_count: 200,
            hawking_count: 20,
            max_tidal_bodies: 3,
            max_fragments: 64,
            disruption_radius: 260.0,
            outer_bound: 700.0,
            tick_rate: 60,
            light_speed_px: 8.0,
            pan_step: 15.0,
            enable_color: true,
            seed: None,
        }
    }
}

impl Settings {
    pub(crate) fn isco_px(&self) -> f64 {
        3.0 * self.horizon_px
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(
            self.mass_solar.is_finite() && self.mass_solar > 0.0,
            "mass_solar must be positive, got {}",
            self.mass_solar
        );
        ensure!(
            self.horizon_px.is_finite() && self.horizon_px > 0.0,
            "horizon_px must be positive, got {}",
            self.horizon_px
        );
        ensure!(
            self.world_width >= 1.0 && self.world_height >= 1.0,
            "world size must be at least 1x1 px"
        );
        ensure!(
            self.disk_outer_radius >= self.isco_px() + 20.0,
            "disk_outer_radius ({}) must leave room for respawns outside the ISCO ({} + 20)",
            self.disk_outer_radius,
            self.isco_px()
        );
        ensure!(
            self.disruption_radius > self.horizon_px,
            "disruption_radius ({}) must lie outside the horizon ({})",
            self.disruption_radius,
            self.horizon_px
        );
        ensure!(
            self.outer_bound > SPAWN_RADIUS_MAX,
            "outer_bound ({}) must enclose the tidal spawn ring (up to {SPAWN_RADIUS_MAX})",
            self.outer_bound
        );
        ensure!(
            (1..=240).contains(&self.tick_rate),
            "tick_rate must be within 1..=240, got {}",
            self.tick_rate
        );
        ensure!(
            self.light_speed_px.is_finite() && self.light_speed_px > 0.0,
            "light_speed_px must be positive"
        );
        Ok(())
    }

    /// CLI flags win over whatever the settings file said.
    pub(crate) fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(v) = cli.mass {
            self.mass_solar = v;
        }
        if let Some(v) = cli.horizon_px {
            self.horizon_px = v;
        }
        if let Some(v) = cli.particles {
            self.particle_count = v;
        }
        if let Some(v) = cli.jets {
            self.jet_count = v;
        }
        if let Some(v) = cli.max_fragments {
            self.max_fragments = v;
        }
        if let Some(v) = cli.disruption_radius {
            self.disruption_radius = v;
        }
        if let Some(v) = cli.outer_bound {
            self.outer_bound = v;
        }
        if let Some(v) = cli.tick_rate {
            self.tick_rate = v;
        }
        if let Some(v) = cli.seed {
            self.seed = Some(v);
        }
        if cli.no_color {
            self.enable_color = false;
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "blackhole", about = "Schwarzschild black hole in your terminal")]
pub(crate) struct Cli {
    /// settings file (JSON); defaults to the platform config dir
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// write the merged settings back to the settings file and continue
    #[arg(long)]
    pub(crate) save_config: bool,

    /// black hole mass in solar masses
    #[arg(long)]
    pub(crate) mass: Option<f64>,

    /// on-screen event horizon radius in pixels
    #[arg(long)]
    pub(crate) horizon_px: Option<f64>,

    #[arg(long)]
    pub(crate) particles: Option<usize>,

    #[arg(long)]
    pub(crate) jets: Option<usize>,

    #[arg(long)]
    pub(crate) max_fragments: Option<usize>,

    #[arg(long)]
    pub(crate) disruption_radius: Option<f64>,

    #[arg(long)]
    pub(crate) outer_bound: Option<f64>,

    /// simulation ticks per second
    #[arg(long)]
    pub(crate) tick_rate: Option<u32>,

    #[arg(long)]
    pub(crate) seed: Option<u64>,

    #[arg(long)]
    pub(crate) no_color: bool,

    /// run N ticks without a terminal and print a summary
    #[arg(long)]
    pub(crate) ticks: Option<u64>,

    /// log file; defaults to blackhole.log in the platform data dir
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,

    #[arg(short, long)]
    pub(crate) verbose: bool,
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "blackhole", "Blackhole")
        .context("could not resolve project directories")?;
    let config_dir = proj.config_dir().to_path_buf();
    let data_dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&config_dir).ok();
    fs::create_dir_all(&data_dir).ok();
    Ok(Paths {
        settings_path: config_dir.join("settings.json"),
        log_path: data_dir.join("blackhole.log"),
    })
}

/// A missing file means defaults; a file that exists but does not parse is an error.
pub(crate) fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let v = serde_json::from_str::<Settings>(&s).with_context(|| format!("parsing {}", path.display()))?;
    Ok(v)
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename-over-existing fails on Windows
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to).with_context(|| format!("renaming {} to {}", from.display(), to.display()))?;
    Ok(())
}

/// Defaults, then the settings file, then CLI flags; validated at the end.
pub(crate) fn resolve(cli: &Cli, default_path: &Path) -> Result<Settings> {
    let path = cli.config.as_deref().unwrap_or(default_path);
    let mut settings = load_settings(path)?;
    settings.apply_overrides(cli);
    settings.validate()?;
    if cli.save_config {
        save_settings_atomic(path, &settings)?;
        tracing::info!(path = %path.display(), "settings saved");
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn rejects_broken_geometry() {
        let bad = [
            Settings { mass_solar: 0.0, ..Settings::default() },
            Settings { horizon_px: -1.0, ..Settings::default() },
            Settings { horizon_px: f64::NAN, ..Settings::default() },
            Settings { horizon_px: 120.0, ..Settings::default() }, // ISCO 360 > disk edge
            Settings { disruption_radius: 80.0, ..Settings::default() },
            Settings { outer_bound: 600.0, ..Settings::default() },
            Settings { tick_rate: 0, ..Settings::default() },
            Settings { light_speed_px: 0.0, ..Settings::default() },
        ];
        for s in bad {
            assert!(s.validate().is_err(), "{s:?} should not validate");
        }
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "mass_solar": 25.0, "particle_count": 10 }"#).unwrap();
        let s = load_settings(&path).unwrap();
        assert_eq!(s.mass_solar, 25.0);
        assert_eq!(s.particle_count, 10);
        assert_eq!(s.horizon_px, 90.0);
    }

    #[test]
    fn missing_file_means_defaults_but_garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        assert_eq!(load_settings(&path).unwrap(), Settings::default());
        fs::write(&path, "{ not json").unwrap();
        assert!(load_settings(&path).is_err());
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let s = Settings {
            jet_count: 7,
            seed: Some(42),
            ..Settings::default()
        };
        save_settings_atomic(&path, &s).unwrap();
        save_settings_atomic(&path, &s).unwrap();
        assert_eq!(load_settings(&path).unwrap(), s);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn cli_overrides_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "mass_solar": 25.0, "tick_rate": 30 }"#).unwrap();
        let cli = Cli::parse_from(["blackhole", "--mass", "12", "--seed", "9", "--no-color"]);
        let s = resolve(&cli, &path).unwrap();
        assert_eq!(s.mass_solar, 12.0);
        assert_eq!(s.tick_rate, 30);
        assert_eq!(s.seed, Some(9));
        assert!(!s.enable_color);
    }

    #[test]
    fn invalid_overrides_fail_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let cli = Cli::parse_from(["blackhole", "--tick-rate", "0"]);
        assert!(resolve(&cli, &path).is_err());
    }
}
