use crate::color::Rgb;
use crate::doppler::{jet_beaming, lorentz_gamma};
use crate::draw::{DrawCommand, DrawList, FrameContext, OverlayShape};
use crate::geometry::BlackHoleGeometry;
use crate::math::{clamp01, Vec2};
use rand::Rng;

const LAUNCH_GAP: f64 = 30.0;
const OUTER_BOUND: f64 = 450.0;
const FADE_RANGE: f64 = 330.0;
const MAX_SPREAD: f64 = 0.15;
/// Pixels per unit of lateral spread.
const SPREAD_PX: f64 = 18.0;
const GLOW_GAIN: f64 = 0.28;
const JET_TINT: Rgb = Rgb::new(90, 140, 255);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum JetSide {
    Up,
    Down,
}

impl JetSide {
    fn sign(self) -> f64 {
        match self {
            JetSide::Up => -1.0,
            JetSide::Down => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct JetStream {
    pub(crate) side: JetSide,
    pub(crate) distance_from_center: f64,
    pub(crate) lateral_spread: f64,
    pub(crate) velocity_beta: f64,
    pub(crate) lorentz_gamma: f64,
}

impl JetStream {
    pub(crate) fn brightness(&self, geo: &BlackHoleGeometry) -> (f64, f64) {
        let fade = clamp01(1.0 - (self.distance_from_center - geo.event_horizon_radius - LAUNCH_GAP) / FADE_RANGE);
        let glow = fade * jet_beaming(self.lorentz_gamma, self.velocity_beta) * GLOW_GAIN;
        (fade, glow)
    }
}

pub(crate) struct JetSystem {
    pub(crate) streams: Vec<JetStream>,
}

impl JetSystem {
    pub(crate) fn new<R: Rng>(count: usize, geo: &BlackHoleGeometry, rng: &mut R) -> Self {
        let inner = geo.event_horizon_radius + LAUNCH_GAP;
        let streams = (0..count)
            .map(|_| {
                let beta = rng.gen_range(0.3..0.95);
                JetStream {
                    side: if rng.gen_bool(0.5) { JetSide::Up } else { JetSide::Down },
                    distance_from_center: rng.gen_range(inner..=OUTER_BOUND.max(inner)),
                    lateral_spread: rng.gen_range(-MAX_SPREAD..=MAX_SPREAD),
                    velocity_beta: beta,
                    lorentz_gamma: lorentz_gamma(beta),
                }
            })
            .collect();
        Self { streams }
    }

    pub(crate) fn tick<R: Rng>(&mut self, geo: &BlackHoleGeometry, rng: &mut R) {
        let inner = geo.event_horizon_radius + LAUNCH_GAP;
        for j in &mut self.streams {
            j.distance_from_center += j.velocity_beta * geo.light_speed_px;
            if j.distance_from_center > OUTER_BOUND {
                j.distance_from_center = inner;
                j.lateral_spread = rng.gen_range(-MAX_SPREAD..=MAX_SPREAD);
            }
        }
    }

    pub(crate) fn draw(&self, geo: &BlackHoleGeometry, ctx: &FrameContext, out: &mut DrawList) {
        for j in &self.streams {
            let pos = ctx.center.add(Vec2::new(
                j.lateral_spread * SPREAD_PX,
                j.side.sign() * j.distance_from_center,
            ));
            let (fade, glow) = j.brightness(geo);
            let color = JET_TINT.scale(glow);

            out.push(DrawCommand::Point {
                pos,
                color,
                size: 2.0 + fade * 1.5,
            });
            if fade > 0.2 {
                out.push(DrawCommand::Translucent {
                    shape: OverlayShape::Disc,
                    center: pos,
                    radius: 8.0,
                    color,
                    alpha: (30.0 * fade) as u8,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn geo() -> BlackHoleGeometry {
        BlackHoleGeometry::derive(10.0, 90.0, 8.0)
    }

    #[test]
    fn streams_recycle_without_changing_population() {
        let g = geo();
        let mut rng = StdRng::seed_from_u64(21);
        let mut jets = JetSystem::new(150, &g, &mut rng);
        let ups = jets.streams.iter().filter(|j| j.side == JetSide::Up).count();
        for _ in 0..2000 {
            jets.tick(&g, &mut rng);
            assert_eq!(jets.streams.len(), 150);
            for j in &jets.streams {
                assert!(j.distance_from_center >= g.event_horizon_radius + LAUNCH_GAP);
                assert!(j.distance_from_center <= OUTER_BOUND);
                assert!(j.lateral_spread.abs() <= MAX_SPREAD);
            }
        }
        // sides never flip
        assert_eq!(jets.streams.iter().filter(|j| j.side == JetSide::Up).count(), ups);
    }

    #[test]
    fn faster_points_climb_faster() {
        let g = geo();
        let mut rng = StdRng::seed_from_u64(2);
        let mut jets = JetSystem::new(2, &g, &mut rng);
        for (j, beta) in jets.streams.iter_mut().zip([0.3, 0.9]) {
            j.distance_from_center = 130.0;
            j.velocity_beta = beta;
            j.lorentz_gamma = lorentz_gamma(beta);
        }
        jets.tick(&g, &mut rng);
        assert!(jets.streams[1].distance_from_center > jets.streams[0].distance_from_center);
    }

    #[test]
    fn jets_fade_with_distance() {
        let g = geo();
        let mut j = JetStream {
            side: JetSide::Up,
            distance_from_center: g.event_horizon_radius + LAUNCH_GAP,
            lateral_spread: 0.0,
            velocity_beta: 0.5,
            lorentz_gamma: lorentz_gamma(0.5),
        };
        let (near_fade, near_glow) = j.brightness(&g);
        assert_eq!(near_fade, 1.0);
        j.distance_from_center = OUTER_BOUND;
        let (far_fade, far_glow) = j.brightness(&g);
        assert!(far_fade == 0.0 && far_glow == 0.0);
        assert!(near_glow > far_glow);
    }

    #[test]
    fn up_jets_draw_above_the_hole() {
        let g = geo();
        let mut rng = StdRng::seed_from_u64(9);
        let mut jets = JetSystem::new(1, &g, &mut rng);
        jets.streams[0].side = JetSide::Up;
        jets.streams[0].distance_from_center = 200.0;
        let center = Vec2::new(450.0, 450.0);
        let mut out = DrawList::default();
        jets.draw(&g, &FrameContext::at(center, 0), &mut out);
        match out.iter().next() {
            Some(DrawCommand::Point { pos, .. }) => assert_eq!(pos.y, 250.0),
            other => panic!("unexpected {other:?}"),
        }
        // fade is well above 0.2 here, so the halo follows
        assert_eq!(out.len(), 2);
    }
}
