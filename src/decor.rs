//! Decorative effects around the horizon: the shimmering photon ring, Hawking
//! sparkles, and the static core overlays (ergosphere shells, lensing rings,
//! glow, horizon disc and rim). None of this makes a physical claim.

use crate::color::{Rgb, BLACK};
use crate::draw::{DrawCommand, DrawList, FrameContext, OverlayShape};
use crate::geometry::BlackHoleGeometry;
use crate::math::Vec2;
use rand::Rng;
use std::f64::consts::TAU;

const RING_SCALE: f64 = 1.1;

#[derive(Clone, Copy, Debug)]
pub(crate) struct PhotonRingPoint {
    pub(crate) angle: f64,
    pub(crate) angular_speed: f64,
    pub(crate) radial_offset: f64,
}

pub(crate) struct PhotonRing {
    pub(crate) points: Vec<PhotonRingPoint>,
    radius: f64,
}

impl PhotonRing {
    pub(crate) fn new<R: Rng>(count: usize, geo: &BlackHoleGeometry, rng: &mut R) -> Self {
        let radius = (geo.photon_sphere_radius * RING_SCALE).floor();
        let angular_speed = geo.light_speed_px / radius.max(1.0);
        let points = (0..count)
            .map(|_| PhotonRingPoint {
                angle: rng.gen_range(0.0..TAU),
                angular_speed,
                radial_offset: rng.gen_range(-2.0..=2.0),
            })
            .collect();
        Self { points, radius }
    }

    pub(crate) fn tick(&mut self) {
        for p in &mut self.points {
            p.angle = (p.angle + p.angular_speed).rem_euclid(TAU);
        }
    }

    pub(crate) fn draw(&self, ctx: &FrameContext, out: &mut DrawList) {
        let t = ctx.t as f64;
        for p in &self.points {
            let b = Rgb::channel(200.0 + 35.0 * (p.angle * 4.0 + t * 0.08).sin());
            out.push(DrawCommand::Point {
                pos: ctx.center.add(Vec2::polar(p.angle, self.radius + p.radial_offset)),
                color: Rgb::new(b, b, 230),
                size: 1.0 + (p.angle * 3.0).sin() * 0.5,
            });
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct HawkingSparkle {
    pub(crate) angle: f64,
    pub(crate) distance: f64,
    pub(crate) speed: f64,
    pub(crate) life: u32,
    pub(crate) max_life: u32,
}

impl HawkingSparkle {
    fn fresh<R: Rng>(geo: &BlackHoleGeometry, rng: &mut R) -> Self {
        let h = geo.event_horizon_radius;
        let life = rng.gen_range(15..=40);
        Self {
            angle: rng.gen_range(0.0..TAU),
            distance: rng.gen_range(h + 2.0..=h + 8.0),
            speed: rng.gen_range(0.2..=0.8),
            life,
            max_life: life,
        }
    }

    pub(crate) fn brightness(&self) -> f64 {
        70.0 * self.life as f64 / self.max_life.max(1) as f64
    }
}

pub(crate) struct HawkingSparkles {
    pub(crate) sparkles: Vec<HawkingSparkle>,
}

impl HawkingSparkles {
    pub(crate) fn new<R: Rng>(count: usize, geo: &BlackHoleGeometry, rng: &mut R) -> Self {
        Self {
            sparkles: (0..count).map(|_| HawkingSparkle::fresh(geo, rng)).collect(),
        }
    }

    pub(crate) fn tick<R: Rng>(&mut self, geo: &BlackHoleGeometry, rng: &mut R) {
        for s in &mut self.sparkles {
            s.distance += s.speed;
            s.life = s.life.saturating_sub(1);
            if s.life == 0 {
                *s = HawkingSparkle::fresh(geo, rng);
            }
        }
    }

    pub(crate) fn draw(&self, ctx: &FrameContext, out: &mut DrawList) {
        for s in &self.sparkles {
            let b = s.brightness();
            if b <= 6.0 {
                continue;
            }
            out.push(DrawCommand::Point {
                pos: ctx.center.add(Vec2::polar(s.angle, s.distance)),
                color: Rgb::from_f64(b, b, b + 30.0),
                size: 1.0,
            });
        }
    }
}

fn draw_ergosphere(geo: &BlackHoleGeometry, ctx: &FrameContext, out: &mut DrawList) {
    let base = geo.event_horizon_radius * 1.15;
    for i in 0..8u8 {
        out.push(DrawCommand::Translucent {
            shape: OverlayShape::Ring,
            center: ctx.center,
            radius: (base + i as f64 * 3.0).floor(),
            color: Rgb::new(140 + i * 8, 90 + i * 4, 200 - i * 10),
            alpha: 26 - i * 3,
        });
    }
}

fn draw_lensing_rings(geo: &BlackHoleGeometry, ctx: &FrameContext, out: &mut DrawList) {
    let base = (geo.photon_sphere_radius * RING_SCALE).floor();
    for i in 0..3u8 {
        let b = 220 - i * 50;
        out.push(DrawCommand::CircleOutline {
            center: ctx.center,
            radius: base + i as f64 * 6.0,
            color: Rgb::new(b, b - 30, b.saturating_add(40)),
            stroke: 1.0,
        });
    }
}

fn draw_glow(geo: &BlackHoleGeometry, ctx: &FrameContext, out: &mut DrawList) {
    let glow_r = geo.event_horizon_radius + 22.0;
    for i in 0..10u8 {
        out.push(DrawCommand::Translucent {
            shape: OverlayShape::Disc,
            center: ctx.center,
            radius: glow_r - i as f64 * 2.0,
            color: Rgb::new(200, 170, 120),
            alpha: 40 - i * 4,
        });
    }
}

fn draw_horizon(geo: &BlackHoleGeometry, ctx: &FrameContext, out: &mut DrawList) {
    let h = geo.event_horizon_radius;
    out.push(DrawCommand::FilledCircle {
        center: ctx.center,
        radius: h,
        color: BLACK,
    });
    for i in 0..18 {
        let shade = Rgb::channel(8.0 + (1.0 - i as f64 / 18.0) * 40.0);
        out.push(DrawCommand::CircleOutline {
            center: ctx.center,
            radius: h + i as f64,
            color: Rgb::grey(shade),
            stroke: 1.0,
        });
    }
}

/// Everything drawn between the disk sweep and the particles, in order.
pub(crate) fn draw_core(
    geo: &BlackHoleGeometry,
    ring: &PhotonRing,
    sparkles: &HawkingSparkles,
    ctx: &FrameContext,
    out: &mut DrawList,
) {
    draw_ergosphere(geo, ctx, out);
    draw_lensing_rings(geo, ctx, out);
    ring.draw(ctx, out);
    sparkles.draw(ctx, out);
    draw_glow(geo, ctx, out);
    draw_horizon(geo, ctx, out);
}

const LABEL_INK: Rgb = Rgb::new(255, 255, 200);

/// Annotated radii: a label, a leader line, and a dot on the radius itself.
pub(crate) fn draw_labels(geo: &BlackHoleGeometry, ctx: &FrameContext, out: &mut DrawList) {
    let labels = [
        ("Event Horizon (r=2GM/c²)", Vec2::new(120.0, -20.0), geo.event_horizon_radius),
        ("Photon Sphere (r=3GM/c²)", Vec2::new(140.0, 50.0), geo.photon_sphere_radius),
        ("ISCO", Vec2::new(100.0, 80.0), geo.isco_radius),
    ];
    for (text, offset, radius) in labels {
        let pos = ctx.center.add(offset);
        let end = ctx.center.add(Vec2::new(radius, 0.0));
        out.push(DrawCommand::Line {
            from: pos,
            to: end,
            color: LABEL_INK,
            stroke: 1.0,
        });
        out.push(DrawCommand::FilledCircle {
            center: end,
            radius: 3.0,
            color: LABEL_INK,
        });
        out.push(DrawCommand::Label {
            pos,
            text: text.to_string(),
            color: LABEL_INK,
        });
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
    fn photon_ring_orbits_just_outside_the_photon_sphere() {
        let g = geo();
        let mut rng = StdRng::seed_from_u64(4);
        let mut ring = PhotonRing::new(200, &g, &mut rng);
        assert_eq!(ring.radius, 148.0);
        let before: Vec<f64> = ring.points.iter().map(|p| p.angle).collect();
        ring.tick();
        assert_eq!(ring.points.len(), 200);
        for (p, a) in ring.points.iter().zip(before) {
            let moved = (p.angle - a).rem_euclid(TAU);
            assert!((moved - p.angular_speed).abs() < 1e-9);
        }

        let center = Vec2::new(0.0, 0.0);
        let mut out = DrawList::default();
        ring.draw(&FrameContext::at(center, 17), &mut out);
        for cmd in out.iter() {
            let DrawCommand::Point { pos, color, .. } = cmd else {
                panic!("ring emits points only");
            };
            let r = pos.len();
            assert!((146.0 - 1e-9..=150.0 + 1e-9).contains(&r));
            assert!((165..=235).contains(&color.r));
        }
    }

    #[test]
    fn sparkles_fade_then_restart() {
        let g = geo();
        let mut rng = StdRng::seed_from_u64(8);
        let mut sp = HawkingSparkles::new(20, &g, &mut rng);
        let s = &mut sp.sparkles[0];
        s.life = 2;
        s.max_life = 20;
        s.distance = 95.0;
        sp.tick(&g, &mut rng);
        let s = sp.sparkles[0];
        assert_eq!(s.life, 1);
        assert!(s.distance > 95.0);
        assert!(s.brightness() < 70.0 / 10.0);

        sp.tick(&g, &mut rng);
        let s = sp.sparkles[0];
        assert!((15..=40).contains(&s.life));
        assert_eq!(s.life, s.max_life);
        assert!(s.distance >= 92.0 && s.distance <= 98.0);

        for _ in 0..500 {
            sp.tick(&g, &mut rng);
            assert_eq!(sp.sparkles.len(), 20);
            assert!(sp.sparkles.iter().all(|s| s.life >= 1 && s.life <= s.max_life));
        }
    }

    #[test]
    fn dim_sparkles_are_skipped() {
        let g = geo();
        let mut rng = StdRng::seed_from_u64(8);
        let mut sp = HawkingSparkles::new(1, &g, &mut rng);
        sp.sparkles[0].life = 1;
        sp.sparkles[0].max_life = 40;
        let mut out = DrawList::default();
        sp.draw(&FrameContext::at(Vec2::default(), 0), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn horizon_disc_covers_the_glow() {
        let g = geo();
        let mut rng = StdRng::seed_from_u64(1);
        let ring = PhotonRing::new(4, &g, &mut rng);
        let sp = HawkingSparkles::new(4, &g, &mut rng);
        let mut out = DrawList::default();
        draw_core(&g, &ring, &sp, &FrameContext::at(Vec2::default(), 0), &mut out);
        let disc = out
            .iter()
            .position(|c| matches!(c, DrawCommand::FilledCircle { color, .. } if *color == BLACK))
            .expect("horizon disc");
        let last_glow = out
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Translucent { shape: OverlayShape::Disc, .. }))
            .expect("glow");
        assert!(disc > last_glow);
    }

    #[test]
    fn labels_point_at_their_radii() {
        let g = geo();
        let mut out = DrawList::default();
        draw_labels(&g, &FrameContext::at(Vec2::default(), 0), &mut out);
        let ends: Vec<f64> = out
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line { to, .. } => Some(to.x),
                _ => None,
            })
            .collect();
        assert_eq!(ends, [90.0, 135.0, 270.0]);
        assert_eq!(out.iter().filter(|c| matches!(c, DrawCommand::Label { .. })).count(), 3);
    }
}
