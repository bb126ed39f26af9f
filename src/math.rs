use std::f64::consts::TAU;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Vec2 {
    pub(crate) x: f64,
    pub(crate) y: f64,
}

impl Vec2 {
    pub(crate) const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
    pub(crate) fn add(self, o: Vec2) -> Vec2 {
        Vec2 { x: self.x + o.x, y: self.y + o.y }
    }
    pub(crate) fn sub(self, o: Vec2) -> Vec2 {
        Vec2 { x: self.x - o.x, y: self.y - o.y }
    }
    pub(crate) fn len(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
    pub(crate) fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }
    /// Offset of length `r` in direction `angle` (screen space, y down).
    pub(crate) fn polar(angle: f64, r: f64) -> Vec2 {
        let (s, c) = angle.sin_cos();
        Vec2 { x: c * r, y: s * r }
    }
}

pub(crate) fn clamp01(x: f64) -> f64 {
    clamp(x, 0.0, 1.0)
}

/// NaN collapses to the lower bound.
pub(crate) fn clamp(x: f64, a: f64, b: f64) -> f64 {
    if x.is_nan() {
        return a;
    }
    x.max(a).min(b)
}

pub(crate) fn wrap_angle(a: f64) -> f64 {
    let w = a.rem_euclid(TAU);
    if w.is_finite() && w < TAU {
        w
    } else {
        0.0
    }
}
