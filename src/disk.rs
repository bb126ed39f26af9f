use crate::doppler::{beaming_multiplier, lorentz_gamma, DISK_BEAMING, LINE_OF_SIGHT_AXIS};
use crate::draw::{DrawCommand, DrawList, FrameContext};
use crate::geometry::BlackHoleGeometry;
use crate::math::Vec2;
use crate::thermal::disk_color;

/// The near side of the inclined disk. Shares the Doppler line of sight.
pub(crate) const CRESCENT_AXIS: f64 = LINE_OF_SIGHT_AXIS;

const RADIAL_STEP: usize = 4;
const ANGULAR_STEP_DEG: usize = 3;
/// Squared crescent term below which a sample is not drawn.
const CRESCENT_FLOOR: f64 = 0.05;
const ROTATION_RATE: f64 = 0.002;

/// Squared cosine toward the crescent axis, zero on the far half.
pub(crate) fn crescent_term(angle: f64) -> f64 {
    let c = (angle - CRESCENT_AXIS).cos().max(0.0);
    c * c
}

/// Doppler beaming times the crescent mask, or `None` when the sample is masked out.
pub(crate) fn sweep_multiplier(beta: f64, gamma: f64, angle: f64) -> Option<f64> {
    let crescent = crescent_term(angle);
    if crescent < CRESCENT_FLOOR {
        return None;
    }
    let cos_los = (angle - LINE_OF_SIGHT_AXIS).cos();
    let beamed = beaming_multiplier(gamma, beta, cos_los, DISK_BEAMING);
    Some(beamed * (0.5 + 1.8 * crescent))
}

/// Procedural annulus painted every frame, independent of the discrete particles.
pub(crate) struct AccretionDiskField {
    inner: usize,
    outer: usize,
}

impl AccretionDiskField {
    pub(crate) fn new(geo: &BlackHoleGeometry, sweep_outer: f64) -> Self {
        Self {
            inner: (geo.isco_radius * 1.05) as usize,
            outer: sweep_outer.max(0.0) as usize,
        }
    }

    /// Inner bands rotate faster, roughly as the Keplerian r^-1.5.
    pub(crate) fn phase(geo: &BlackHoleGeometry, t: u64, radius: f64) -> f64 {
        t as f64 * ROTATION_RATE * (geo.isco_radius / radius).powf(1.5)
    }

    pub(crate) fn radii(&self) -> impl Iterator<Item = usize> {
        (self.inner..self.outer).step_by(RADIAL_STEP)
    }

    pub(crate) fn draw(&self, geo: &BlackHoleGeometry, ctx: &FrameContext, out: &mut DrawList) {
        let mid = (self.inner + self.outer) / 2;
        for radius in self.radii() {
            let r = radius as f64;
            let beta = geo.keplerian_beta(r);
            let gamma = lorentz_gamma(beta);
            let base = disk_color(geo, r);
            let phase = Self::phase(geo, ctx.t, r);
            let size = if radius < mid { 2.0 } else { 1.0 };

            for deg in (0..360).step_by(ANGULAR_STEP_DEG) {
                let angle = (deg as f64).to_radians() + phase;
                let Some(mult) = sweep_multiplier(beta, gamma, angle) else {
                    continue;
                };
                out.push(DrawCommand::Point {
                    pos: ctx.center.add(Vec2::polar(angle, r)),
                    color: base.scale(mult),
                    size,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{PI, TAU};

    fn geo() -> BlackHoleGeometry {
        BlackHoleGeometry::derive(10.0, 90.0, 8.0)
    }

    #[test]
    fn crescent_axis_is_the_brightest_angle() {
        let g = geo();
        for r in [290.0, 320.0, 355.0] {
            let beta = g.keplerian_beta(r);
            let gamma = lorentz_gamma(beta);
            let peak = sweep_multiplier(beta, gamma, CRESCENT_AXIS).unwrap();
            for i in 0..720 {
                let a = i as f64 * TAU / 720.0;
                if let Some(m) = sweep_multiplier(beta, gamma, a) {
                    assert!(m <= peak + 1e-12, "r={r} a={a} m={m} peak={peak}");
                }
            }
        }
    }

    #[test]
    fn far_side_is_masked() {
        let g = geo();
        let beta = g.keplerian_beta(300.0);
        let gamma = lorentz_gamma(beta);
        assert!(sweep_multiplier(beta, gamma, CRESCENT_AXIS + PI).is_none());
        assert!(sweep_multiplier(beta, gamma, CRESCENT_AXIS + PI / 2.0).is_none());
        assert_eq!(crescent_term(CRESCENT_AXIS + PI), 0.0);
    }

    #[test]
    fn inner_bands_lead_outer_bands() {
        let g = geo();
        let t = 1000;
        assert!(AccretionDiskField::phase(&g, t, 290.0) > AccretionDiskField::phase(&g, t, 350.0));
        assert_eq!(AccretionDiskField::phase(&g, 0, 290.0), 0.0);
    }

    #[test]
    fn sweep_covers_the_annulus_and_only_the_near_half() {
        let g = geo();
        let field = AccretionDiskField::new(&g, 360.0);
        let radii: Vec<usize> = field.radii().collect();
        assert_eq!(radii.first(), Some(&283));
        assert!(radii.iter().all(|r| *r < 360));

        let center = Vec2::new(450.0, 450.0);
        let mut out = DrawList::default();
        field.draw(&g, &FrameContext::at(center, 0), &mut out);
        assert!(!out.is_empty());
        for cmd in out.iter() {
            let DrawCommand::Point { pos, .. } = cmd else {
                panic!("disk sweep only emits points");
            };
            let d = pos.sub(center);
            assert!(d.len() >= 283.0 - 1e-9);
            // CRESCENT_AXIS points down the screen
            assert!(d.y > 0.0);
        }
    }
}
