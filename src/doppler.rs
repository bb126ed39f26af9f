use crate::color::Rgb;
use crate::geometry::BETA_CEILING;
use crate::math::clamp01;

pub(crate) const GAMMA_CAP: f64 = 10.0;

/// Screen direction (y down) in which disk material moves toward the viewer.
/// This is also the near, brightened side of the inclined disk.
pub(crate) const LINE_OF_SIGHT_AXIS: f64 = std::f64::consts::FRAC_PI_2;

/// Beaming exponents: the approaching exponent exceeds the receding one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BeamingExponents {
    pub(crate) approaching: f64,
    pub(crate) receding: f64,
}

/// Procedural disk sweep.
pub(crate) const DISK_BEAMING: BeamingExponents = BeamingExponents {
    approaching: 3.0,
    receding: 2.0,
};

/// Discrete disk particles; tuned separately from the sweep.
pub(crate) const PARTICLE_BEAMING: BeamingExponents = BeamingExponents {
    approaching: 2.5,
    receding: 1.8,
};

/// Lorentz factor. At |β| ≥ 0.99 (or non-finite β) it is pinned to `GAMMA_CAP`.
pub(crate) fn lorentz_gamma(beta: f64) -> f64 {
    let b = beta.abs();
    if !(b < BETA_CEILING) {
        return GAMMA_CAP;
    }
    1.0 / (1.0 - b * b).sqrt()
}

pub(crate) fn doppler_factor(gamma: f64, beta: f64, cos_los: f64) -> f64 {
    (gamma * (1.0 + beta * cos_los)).max(1e-6)
}

/// `D^p` toward the viewer, `(1/D)^q` away from it; the smaller receding
/// exponent keeps the approaching side the brighter one.
pub(crate) fn beaming_multiplier(gamma: f64, beta: f64, cos_los: f64, exps: BeamingExponents) -> f64 {
    let d = doppler_factor(gamma, beta, cos_los);
    if cos_los > 0.0 {
        d.powf(exps.approaching)
    } else {
        (1.0 / d).powf(exps.receding)
    }
}

/// Jets point at the viewer, so only the approaching term applies.
pub(crate) fn jet_beaming(gamma: f64, beta: f64) -> f64 {
    gamma * (1.0 + beta)
}

/// Dim and redden light climbing out of the well. Full effect at the horizon,
/// none beyond twice the horizon radius.
pub(crate) fn gravitational_redshift(color: Rgb, r: f64, horizon: f64) -> Rgb {
    if r <= 0.0 {
        return color;
    }
    let grav = clamp01((2.0 * horizon - r) / horizon);
    let overall = 1.0 - 0.4 * grav;
    let g_gain = (1.0 - 0.8 * grav).max(0.0);
    let b_gain = (1.0 - 1.2 * grav).max(0.0);
    color.scale_each(overall, overall * g_gain, overall * b_gain)
}
