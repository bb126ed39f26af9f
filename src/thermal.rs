use crate::color::Rgb;
use crate::geometry::{BlackHoleGeometry, SOLAR_MASS};

pub(crate) const MAX_DISK_TEMPERATURE: f64 = 15_000.0;

/// Thin-disk temperature profile, zero inside the ISCO.
pub(crate) fn disk_temperature(geo: &BlackHoleGeometry, radius: f64) -> f64 {
    if radius < geo.isco_radius {
        return 0.0;
    }
    let r_m = geo.to_metres(radius);
    let t = 2.2e7 * (SOLAR_MASS / geo.mass_kg).powf(0.25) * (r_m / geo.rs_m).powf(-0.75);
    t.min(MAX_DISK_TEMPERATURE)
}

/// Blackbody-ish ramp: black -> red -> orange -> pale blue-white.
///
/// The unit scale is visual, not calibrated Kelvin. Brightness grows with `temp`
/// inside each band; the bands do not have to meet at their edges.
pub(crate) fn color_for_temperature(temp: f64) -> Rgb {
    let temp = if temp.is_nan() { 0.0 } else { temp };
    if temp <= 1000.0 {
        Rgb::from_f64(255.0 * (temp / 1000.0), 0.0, 0.0)
    } else if temp <= 3000.0 {
        Rgb::from_f64(255.0, 180.0 * ((temp - 1000.0) / 2000.0), 0.0)
    } else if temp <= 6000.0 {
        let k = (temp - 3000.0) / 3000.0;
        Rgb::from_f64(255.0, 180.0 + 75.0 * k, 200.0 * k)
    } else {
        Rgb::new(220, 220, 255)
    }
}

pub(crate) fn disk_color(geo: &BlackHoleGeometry, radius: f64) -> Rgb {
    color_for_temperature(disk_temperature(geo, radius))
}
