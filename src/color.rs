use crate::math::clamp;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

pub(crate) const BLACK: Rgb = Rgb::new(0, 0, 0);

impl Rgb {
    pub(crate) const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub(crate) const fn grey(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Saturating channel conversion; fractions truncate toward zero.
    pub(crate) fn channel(v: f64) -> u8 {
        clamp(v, 0.0, 255.0) as u8
    }

    pub(crate) fn from_f64(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: Self::channel(r),
            g: Self::channel(g),
            b: Self::channel(b),
        }
    }

    /// Multiply every channel by `k`, clamping into [0, 255].
    pub(crate) fn scale(self, k: f64) -> Self {
        self.scale_each(k, k, k)
    }

    pub(crate) fn scale_each(self, kr: f64, kg: f64, kb: f64) -> Self {
        Self::from_f64(
            self.r as f64 * kr,
            self.g as f64 * kg,
            self.b as f64 * kb,
        )
    }

    #[cfg(test)]
    pub(crate) fn luma(self) -> u32 {
        self.r as u32 + self.g as u32 + self.b as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_saturates_instead_of_wrapping() {
        let c = Rgb::new(200, 100, 10).scale(3.0);
        assert_eq!(c, Rgb::new(255, 255, 30));
        assert_eq!(Rgb::new(200, 100, 10).scale(-1.0), BLACK);
        assert_eq!(Rgb::new(200, 100, 10).scale(f64::NAN), BLACK);
    }

    #[test]
    fn channel_truncates() {
        assert_eq!(Rgb::channel(12.9), 12);
        assert_eq!(Rgb::channel(1e9), 255);
    }
}
