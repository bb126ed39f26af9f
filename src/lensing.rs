use crate::color::Rgb;
use crate::draw::{DrawCommand, DrawList, FrameContext};
use crate::math::Vec2;
use rand::Rng;
use std::f64::consts::PI;

#[derive(Clone, Copy, Debug)]
pub(crate) struct LensingModel {
    pub(crate) horizon: f64,
    pub(crate) influence_radius: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct LensedStar {
    pub(crate) pos: Vec2,
    pub(crate) brightness: u8,
    pub(crate) lensed: bool,
}

impl LensingModel {
    pub(crate) fn new(horizon: f64, influence_radius: f64) -> Self {
        Self {
            horizon,
            influence_radius,
        }
    }

    /// Weak-field bending angle; light at or inside the horizon is fully captured.
    pub(crate) fn deflection(&self, r: f64) -> f64 {
        if r <= self.horizon {
            return PI;
        }
        2.0 * self.horizon / r
    }

    pub(crate) fn magnification(&self, r: f64) -> f64 {
        let k = self.horizon / r;
        1.0 + 0.8 * k * k
    }

    /// Where a background point source at `pos` appears, or `None` when the
    /// horizon swallows it.
    pub(crate) fn apparent_position(&self, pos: Vec2, brightness: u8, center: Vec2) -> Option<LensedStar> {
        let d = pos.sub(center);
        let r = d.len();
        if r >= self.influence_radius {
            return Some(LensedStar {
                pos,
                brightness,
                lensed: false,
            });
        }
        if r <= self.horizon {
            return None;
        }

        let theta = d.angle() + self.deflection(r) * (self.horizon / r);
        let mag = self.magnification(r);
        Some(LensedStar {
            pos: center.add(Vec2::polar(theta, r * mag)),
            brightness: Rgb::channel(brightness as f64 * mag),
            lensed: true,
        })
    }

    /// Bend an orbital angle the way nearby background light is bent.
    pub(crate) fn bend_angle(&self, angle: f64, r: f64, strength: f64) -> f64 {
        if self.horizon < r && r < self.influence_radius {
            angle + self.deflection(r) * strength
        } else {
            angle
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Star {
    pub(crate) pos: Vec2,
    pub(crate) brightness: u8,
}

pub(crate) struct Starfield {
    pub(crate) stars: Vec<Star>,
    width: f64,
    height: f64,
}

impl Starfield {
    pub(crate) fn new<R: Rng>(count: usize, width: f64, height: f64, rng: &mut R) -> Self {
        let stars = (0..count)
            .map(|_| Star {
                pos: Vec2::new(rng.gen_range(0.0..=width), rng.gen_range(0.0..=height)),
                brightness: rng.gen_range(150..=255),
            })
            .collect();
        Self {
            stars,
            width,
            height,
        }
    }

    fn on_screen(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x < self.width && p.y >= 0.0 && p.y < self.height
    }

    pub(crate) fn draw(&self, lens: &LensingModel, ctx: &FrameContext, out: &mut DrawList) {
        for s in &self.stars {
            let Some(seen) = lens.apparent_position(s.pos, s.brightness, ctx.center) else {
                continue;
            };
            if seen.lensed && !self.on_screen(seen.pos) {
                continue;
            }
            out.push(DrawCommand::Point {
                pos: seen.pos,
                color: Rgb::grey(seen.brightness),
                size: 1.0,
            });
        }
    }
}
