use crate::math::Vec2;

pub(crate) const G: f64 = 6.674_30e-11;
pub(crate) const C: f64 = 299_792_458.0;
pub(crate) const SOLAR_MASS: f64 = 1.989e30;

/// Upper bound on orbital speed as a fraction of c.
pub(crate) const BETA_CEILING: f64 = 0.99;

/// Schwarzschild radius in metres.
pub(crate) fn schwarzschild_radius(mass_kg: f64) -> f64 {
    2.0 * G * mass_kg / (C * C)
}

/// Everything derived from the hole's mass and on-screen size.
///
/// Built once at startup. All radii are in pixels; `pixel_scale` converts
/// metres to pixels and is never recomputed while the simulation runs.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BlackHoleGeometry {
    pub(crate) mass_kg: f64,
    pub(crate) rs_m: f64,
    pub(crate) pixel_scale: f64,
    pub(crate) event_horizon_radius: f64,
    pub(crate) photon_sphere_radius: f64,
    pub(crate) isco_radius: f64,
    /// How many pixels light crosses per tick on screen.
    pub(crate) light_speed_px: f64,
}

impl BlackHoleGeometry {
    pub(crate) fn derive(mass_solar: f64, horizon_px: f64, light_speed_px: f64) -> Self {
        let mass_kg = mass_solar * SOLAR_MASS;
        let rs_m = schwarzschild_radius(mass_kg);
        Self {
            mass_kg,
            rs_m,
            pixel_scale: horizon_px / rs_m,
            event_horizon_radius: horizon_px,
            photon_sphere_radius: 1.5 * horizon_px,
            isco_radius: 3.0 * horizon_px,
            light_speed_px,
        }
    }

    pub(crate) fn to_metres(&self, r_px: f64) -> f64 {
        r_px / self.pixel_scale
    }

    /// Circular orbit speed at `r_px` as a fraction of c, capped at 0.99.
    pub(crate) fn keplerian_beta(&self, r_px: f64) -> f64 {
        let r_m = self.to_metres(r_px.max(1.0));
        let v = (G * self.mass_kg / r_m).sqrt();
        (v / C).min(BETA_CEILING)
    }

    /// Radians per tick for a circular orbit at `r_px`.
    pub(crate) fn keplerian_angular_speed(&self, r_px: f64) -> f64 {
        self.keplerian_beta(r_px) * self.light_speed_px / r_px.max(1.0)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SimulationClock {
    pub(crate) t: u64,
}

impl SimulationClock {
    pub(crate) fn advance(&mut self) {
        self.t += 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PanDirection {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Camera {
    pub(crate) offset: Vec2,
}

impl Camera {
    pub(crate) fn pan(&mut self, dir: PanDirection, step: f64) {
        let d = match dir {
            PanDirection::Left => Vec2::new(-step, 0.0),
            PanDirection::Right => Vec2::new(step, 0.0),
            PanDirection::Up => Vec2::new(0.0, -step),
            PanDirection::Down => Vec2::new(0.0, step),
        };
        self.offset = self.offset.add(d);
    }
}
