use crate::color::Rgb;
use crate::doppler::gravitational_redshift;
use crate::draw::{DrawCommand, DrawList, FrameContext};
use crate::geometry::BlackHoleGeometry;
use crate::lensing::LensingModel;
use crate::math::{clamp01, Vec2};
use rand::Rng;
use std::f64::consts::TAU;

const PULL: f64 = 6.0e-4;
/// Radius at which the pull reaches full strength; weaker farther in.
const PULL_SOFTENING: f64 = 400.0;
const ANGLE_RADIUS_FLOOR: f64 = 40.0;
const FALL_IN_FACTOR: f64 = 0.95;
const LENS_STRENGTH: f64 = 0.6;
const STRETCH_ONSET: f64 = 350.0;
const STRETCH_RANGE: f64 = 300.0;
const SPAWN_RADIUS_MIN: f64 = 480.0;
/// Outer edge of the ring new bodies appear in.
pub(crate) const SPAWN_RADIUS_MAX: f64 = 620.0;

const BODY_COLORS: [Rgb; 3] = [
    Rgb::new(240, 230, 210),
    Rgb::new(210, 220, 255),
    Rgb::new(255, 245, 200),
];

#[derive(Clone, Copy, Debug)]
pub(crate) struct Kinematics {
    pub(crate) radius: f64,
    pub(crate) angle: f64,
    pub(crate) radial_velocity: f64,
    pub(crate) tangential_velocity: f64,
}

impl Kinematics {
    /// Inverse-square pull, softened by `r / 400`, then one Euler step.
    fn step(&mut self, horizon: f64) {
        let r = self.radius;
        let gravity = PULL * (horizon * horizon / (r * r + 1.0));
        self.radial_velocity -= gravity * (r / PULL_SOFTENING);
        self.radius += self.radial_velocity;
        self.angle += self.tangential_velocity / self.radius.max(ANGLE_RADIUS_FLOOR);
    }

    fn out_of_bounds(&self, horizon: f64, outer: f64) -> bool {
        self.radius <= horizon * FALL_IN_FACTOR || self.radius > outer
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct TidalBody {
    pub(crate) motion: Kinematics,
    pub(crate) base_length: f64,
    pub(crate) base_width: f64,
    pub(crate) color: Rgb,
    pub(crate) shredded: bool,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct TidalFragment {
    pub(crate) motion: Kinematics,
    pub(crate) base_length: f64,
    pub(crate) base_width: f64,
    pub(crate) color: Rgb,
    pub(crate) age: u32,
    pub(crate) max_age: u32,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct TidalConfig {
    pub(crate) max_bodies: usize,
    pub(crate) max_fragments: usize,
    pub(crate) disruption_radius: f64,
    pub(crate) outer_bound: f64,
}

/// Spawn, shred, decay. Bodies fall in from the outer ring, break into 4-7
/// fragments once inside the disruption radius, and the fragments live on
/// until they age out, fall in, or escape.
pub(crate) struct TidalDisruptionSystem {
    pub(crate) bodies: Vec<TidalBody>,
    pub(crate) fragments: Vec<TidalFragment>,
    pub(crate) spawn_cooldown: u32,
    cfg: TidalConfig,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TidalTickReport {
    pub(crate) spawned: usize,
    pub(crate) shredded: usize,
    pub(crate) fragments_born: usize,
}

pub(crate) fn stretch(r: f64) -> f64 {
    clamp01((STRETCH_ONSET - r) / STRETCH_RANGE)
}

impl TidalDisruptionSystem {
    pub(crate) fn new(cfg: TidalConfig) -> Self {
        Self {
            bodies: Vec::new(),
            fragments: Vec::new(),
            spawn_cooldown: 0,
            cfg,
        }
    }

    fn spawn_body<R: Rng>(&mut self, rng: &mut R) {
        let body = TidalBody {
            motion: Kinematics {
                radius: rng.gen_range(SPAWN_RADIUS_MIN..=SPAWN_RADIUS_MAX),
                angle: rng.gen_range(0.0..TAU),
                radial_velocity: -rng.gen_range(0.8..=1.6),
                tangential_velocity: rng.gen_range(-0.3..=0.3),
            },
            base_length: rng.gen_range(14.0..=24.0),
            base_width: rng.gen_range(6.0..=10.0),
            color: BODY_COLORS[rng.gen_range(0..BODY_COLORS.len())],
            shredded: false,
        };
        tracing::debug!(radius = body.motion.radius, "tidal body spawned");
        self.bodies.push(body);
    }

    fn shred<R: Rng>(&mut self, body: &mut TidalBody, rng: &mut R) -> usize {
        let n = rng.gen_range(4..=7);
        let mut born = 0;
        for _ in 0..n {
            if self.fragments.len() >= self.cfg.max_fragments {
                break;
            }
            let m = body.motion;
            self.fragments.push(TidalFragment {
                motion: Kinematics {
                    radius: m.radius + rng.gen_range(-10.0..=10.0),
                    angle: m.angle + rng.gen_range(-0.25..=0.25),
                    radial_velocity: m.radial_velocity * rng.gen_range(0.9..=1.3),
                    tangential_velocity: m.tangential_velocity + rng.gen_range(-0.3..=0.3),
                },
                base_length: body.base_length * rng.gen_range(0.5..=0.9),
                base_width: body.base_width * rng.gen_range(0.4..=0.8),
                color: body.color,
                age: 0,
                max_age: rng.gen_range(240..=420),
            });
            born += 1;
        }
        body.shredded = true;
        tracing::debug!(radius = body.motion.radius, fragments = born, "tidal body shredded");
        born
    }

    pub(crate) fn tick<R: Rng>(&mut self, geo: &BlackHoleGeometry, rng: &mut R) -> TidalTickReport {
        let h = geo.event_horizon_radius;
        let outer = self.cfg.outer_bound;
        let mut report = TidalTickReport::default();

        // Bodies: integrate, shred or drop, compact in one pass.
        let mut bodies = std::mem::take(&mut self.bodies);
        bodies.retain_mut(|b| {
            b.motion.step(h);
            if !b.shredded && b.motion.radius < self.cfg.disruption_radius {
                report.fragments_born += self.shred(b, rng);
                report.shredded += 1;
                return false;
            }
            !b.motion.out_of_bounds(h, outer)
        });
        self.bodies = bodies;

        self.fragments.retain_mut(|f| {
            f.motion.step(h);
            f.age += 1;
            !(f.motion.out_of_bounds(h, outer) || f.age >= f.max_age)
        });

        // Spawning only ever sees the pruned population.
        if self.spawn_cooldown == 0 && self.bodies.len() < self.cfg.max_bodies {
            self.spawn_body(rng);
            self.spawn_cooldown = rng.gen_range(240..=540);
            report.spawned += 1;
        } else {
            self.spawn_cooldown = self.spawn_cooldown.saturating_sub(1);
        }

        report
    }

    fn screen_pos(lens: &LensingModel, m: &Kinematics, center: Vec2) -> Vec2 {
        let a = lens.bend_angle(m.angle, m.radius, LENS_STRENGTH);
        center.add(Vec2::polar(a, m.radius))
    }

    /// Fragments first, then the intact bodies on top.
    pub(crate) fn draw(&self, geo: &BlackHoleGeometry, lens: &LensingModel, ctx: &FrameContext, out: &mut DrawList) {
        let h = geo.event_horizon_radius;
        for f in &self.fragments {
            let r = f.motion.radius;
            if r <= h {
                continue;
            }
            let s = stretch(r);
            let pos = Self::screen_pos(lens, &f.motion, ctx.center);
            let age_fade = (1.0 - f.age as f64 / f.max_age.max(1) as f64).max(0.2);
            out.push(DrawCommand::RotatedEllipse {
                center: pos,
                length: (f.base_length * (1.0 + 2.5 * s)).max(6.0),
                width: (f.base_width * (1.0 - 0.6 * s)).max(2.0),
                angle: ctx.center.sub(pos).angle(),
                color: gravitational_redshift(f.color.scale(age_fade), r, h),
            });
        }
        for b in &self.bodies {
            let r = b.motion.radius;
            if r <= h {
                continue;
            }
            let s = stretch(r);
            let pos = Self::screen_pos(lens, &b.motion, ctx.center);
            out.push(DrawCommand::RotatedEllipse {
                center: pos,
                length: (b.base_length * (1.0 + 3.0 * s)).max(8.0),
                width: (b.base_width * (1.0 - 0.5 * s)).max(2.0),
                angle: ctx.center.sub(pos).angle(),
                color: gravitational_redshift(b.color.scale(1.0 + 1.2 * s), r, h),
            });
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

    fn cfg() -> TidalConfig {
        TidalConfig {
            max_bodies: 3,
            max_fragments: 64,
            disruption_radius: 260.0,
            outer_bound: 700.0,
        }
    }

    fn body_at(radius: f64, vr: f64) -> TidalBody {
        TidalBody {
            motion: Kinematics {
                radius,
                angle: 0.3,
                radial_velocity: vr,
                tangential_velocity: 0.1,
            },
            base_length: 20.0,
            base_width: 8.0,
            color: BODY_COLORS[0],
            shredded: false,
        }
    }

    fn fragment_at(radius: f64, max_age: u32) -> TidalFragment {
        TidalFragment {
            motion: Kinematics {
                radius,
                angle: 0.0,
                radial_velocity: 0.0,
                tangential_velocity: 0.0,
            },
            base_length: 10.0,
            base_width: 4.0,
            color: BODY_COLORS[1],
            age: 0,
            max_age,
        }
    }

    #[test]
    fn crossing_the_disruption_radius_shreds_once() {
        let g = geo();
        let mut rng = StdRng::seed_from_u64(12);
        let mut sys = TidalDisruptionSystem::new(cfg());
        sys.spawn_cooldown = 1000;
        sys.bodies.push(body_at(261.0, -1.5));

        let report = sys.tick(&g, &mut rng);
        assert_eq!(report.shredded, 1);
        assert!((4..=7).contains(&report.fragments_born));
        assert_eq!(sys.fragments.len(), report.fragments_born);
        assert!(sys.bodies.is_empty());

        let again = sys.tick(&g, &mut rng);
        assert_eq!(again.shredded, 0);
        assert_eq!(again.fragments_born, 0);
    }

    #[test]
    fn fragments_inherit_from_their_parent() {
        let g = geo();
        let mut rng = StdRng::seed_from_u64(99);
        let mut sys = TidalDisruptionSystem::new(cfg());
        sys.spawn_cooldown = 1000;
        sys.bodies.push(body_at(261.0, -1.5));
        sys.tick(&g, &mut rng);
        for f in &sys.fragments {
            assert_eq!(f.color, BODY_COLORS[0]);
            assert!(f.base_length <= 20.0 * 0.9 + 1e-9 && f.base_length >= 10.0 - 1e-9);
            assert!(f.base_width <= 8.0 * 0.8 + 1e-9);
            assert!((240..=420).contains(&f.max_age));
            assert!(f.motion.radial_velocity < 0.0);
        }
    }

    #[test]
    fn fragment_expires_exactly_at_max_age() {
        let g = geo();
        let mut rng = StdRng::seed_from_u64(1);
        let mut sys = TidalDisruptionSystem::new(TidalConfig { max_bodies: 0, ..cfg() });
        // parked far out where the pull is negligible for 300 ticks
        sys.fragments.push(fragment_at(600.0, 300));
        for tick in 1..300 {
            sys.tick(&g, &mut rng);
            assert_eq!(sys.fragments.len(), 1, "gone early at tick {tick}");
            assert_eq!(sys.fragments[0].age, tick);
        }
        sys.tick(&g, &mut rng);
        assert!(sys.fragments.is_empty());
    }

    #[test]
    fn bodies_that_fall_in_or_escape_are_dropped() {
        let g = geo();
        let mut rng = StdRng::seed_from_u64(1);
        let mut sys = TidalDisruptionSystem::new(TidalConfig { max_bodies: 0, ..cfg() });
        let mut falling = body_at(90.0, -5.0);
        falling.shredded = true;
        sys.bodies.push(falling);
        sys.bodies.push(body_at(699.5, 2.0));
        let mut sinking = fragment_at(86.0, 400);
        sinking.motion.radial_velocity = -1.0;
        sys.fragments.push(sinking);
        sys.tick(&g, &mut rng);
        assert!(sys.bodies.is_empty());
        assert!(sys.fragments.is_empty());
    }

    #[test]
    fn spawn_respects_cap_and_cooldown() {
        let g = geo();
        let mut rng = StdRng::seed_from_u64(5);
        let mut sys = TidalDisruptionSystem::new(cfg());
        let first = sys.tick(&g, &mut rng);
        assert_eq!(first.spawned, 1);
        assert!((240..=540).contains(&sys.spawn_cooldown));
        let b = sys.bodies[0];
        assert!((480.0..=620.0).contains(&b.motion.radius));

        sys.spawn_cooldown = 0;
        for _ in 0..5000 {
            if sys.spawn_cooldown > 1 {
                sys.spawn_cooldown = 0;
            }
            sys.tick(&g, &mut rng);
            assert!(sys.bodies.len() <= 3);
            assert!(sys.fragments.len() <= 64);
        }
    }

    #[test]
    fn long_run_stays_bounded_and_outside_the_horizon() {
        let g = geo();
        let mut rng = StdRng::seed_from_u64(77);
        let mut sys = TidalDisruptionSystem::new(cfg());
        let mut shreds = 0;
        for _ in 0..20_000 {
            shreds += sys.tick(&g, &mut rng).shredded;
            assert!(sys.bodies.len() <= 3);
            for f in &sys.fragments {
                assert!(f.motion.radius > 0.95 * 90.0 && f.motion.radius <= 700.0);
                assert!(f.age < f.max_age);
            }
        }
        assert!(shreds > 0);
    }

    #[test]
    fn ellipses_stretch_and_point_inward() {
        let g = geo();
        let lens = LensingModel::new(90.0, 420.0);
        let mut sys = TidalDisruptionSystem::new(cfg());
        sys.bodies.push(body_at(500.0, 0.0));
        sys.bodies.push(body_at(120.0, 0.0));
        let center = Vec2::new(450.0, 450.0);
        let mut out = DrawList::default();
        sys.draw(&g, &lens, &FrameContext::at(center, 0), &mut out);

        let ellipses: Vec<(Vec2, f64, f64, f64)> = out
            .iter()
            .filter_map(|c| match c {
                DrawCommand::RotatedEllipse {
                    center,
                    length,
                    width,
                    angle,
                    ..
                } => Some((*center, *length, *width, *angle)),
                _ => None,
            })
            .collect();
        assert_eq!(ellipses.len(), 2);
        let (far_pos, far_len, far_wid, far_ang) = ellipses[0];
        let (_, near_len, near_wid, _) = ellipses[1];
        assert_eq!(far_len, 20.0);
        assert_eq!(far_wid, 8.0);
        assert!(near_len > far_len && near_wid < far_wid);
        let inward = center.sub(far_pos).angle();
        assert!((far_ang - inward).abs() < 1e-12);
        // outside the lensing ring the body sits at its true angle
        assert!((far_pos.sub(center).angle() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn stretch_ramps_from_350_to_50() {
        assert_eq!(stretch(400.0), 0.0);
        assert_eq!(stretch(350.0), 0.0);
        assert!((stretch(200.0) - 0.5).abs() < 1e-12);
        assert_eq!(stretch(50.0), 1.0);
        assert_eq!(stretch(10.0), 1.0);
    }

    #[test]
    fn nothing_inside_the_horizon_is_drawn() {
        let g = geo();
        assert_eq!(g.event_horizon_radius, 90.0);
        let lens = LensingModel::new(90.0, 420.0);
        let mut sys = TidalDisruptionSystem::new(cfg());
        sys.bodies.push(body_at(87.0, -1.0));
        sys.fragments.push(fragment_at(87.0, 400));
        sys.fragments.push(fragment_at(90.0, 400));
        let mut out = DrawList::default();
        sys.draw(&g, &lens, &FrameContext::at(Vec2::default(), 0), &mut out);
        assert!(!out.iter().any(|c| matches!(c, DrawCommand::RotatedEllipse { .. })));

        sys.bodies.push(body_at(91.0, -1.0));
        sys.draw(&g, &lens, &FrameContext::at(Vec2::default(), 0), &mut out);
        assert_eq!(out.len(), 1);
    }
}

