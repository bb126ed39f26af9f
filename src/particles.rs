use crate::color::Rgb;
use crate::doppler::{beaming_multiplier, lorentz_gamma, LINE_OF_SIGHT_AXIS, PARTICLE_BEAMING};
use crate::draw::{DrawCommand, DrawList, FrameContext};
use crate::geometry::BlackHoleGeometry;
use crate::math::{wrap_angle, Vec2};
use crate::thermal::disk_color;
use rand::Rng;
use std::f64::consts::TAU;

pub(crate) const TRAIL_LEN: usize = 12;

/// Fraction of the radius lost per tick at the ISCO.
const VISCOSITY: f64 = 1.0e-4;

/// Gap kept between a fresh particle and the ISCO.
const RESPAWN_MARGIN: f64 = 20.0;
const INITIAL_MARGIN: f64 = 10.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct TrailSample {
    /// Position relative to the hole, so panning moves the trail with it.
    pub(crate) offset: Vec2,
    pub(crate) color: Rgb,
}

/// Fixed-capacity history; pushing into a full trail drops the oldest sample.
#[derive(Clone, Debug)]
pub(crate) struct Trail<const N: usize> {
    buf: [TrailSample; N],
    head: usize,
    len: usize,
}

impl<const N: usize> Trail<N> {
    pub(crate) fn new() -> Self {
        Self {
            buf: [TrailSample::default(); N],
            head: 0,
            len: 0,
        }
    }

    pub(crate) fn push(&mut self, s: TrailSample) {
        self.buf[self.head] = s;
        self.head = (self.head + 1) % N;
        if self.len < N {
            self.len += 1;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Oldest first.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &TrailSample> + '_ {
        let start = (self.head + N - self.len) % N;
        (0..self.len).map(move |i| &self.buf[(start + i) % N])
    }

    pub(crate) fn newest(&self) -> Option<&TrailSample> {
        if self.len == 0 {
            return None;
        }
        Some(&self.buf[(self.head + N - 1) % N])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ParticlePhase {
    Orbiting,
    /// Reinitialised this tick after sinking below the ISCO; not drawn until next tick.
    Respawned,
}

#[derive(Clone, Debug)]
pub(crate) struct OrbitingParticle {
    pub(crate) radius: f64,
    pub(crate) angle: f64,
    pub(crate) angular_speed: f64,
    pub(crate) velocity_beta: f64,
    pub(crate) lorentz_gamma: f64,
    pub(crate) trail: Trail<TRAIL_LEN>,
    pub(crate) phase: ParticlePhase,
}

impl OrbitingParticle {
    fn on_circular_orbit(geo: &BlackHoleGeometry, radius: f64, angle: f64) -> Self {
        let beta = geo.keplerian_beta(radius);
        Self {
            radius,
            angle,
            angular_speed: geo.keplerian_angular_speed(radius),
            velocity_beta: beta,
            lorentz_gamma: lorentz_gamma(beta),
            trail: Trail::new(),
            phase: ParticlePhase::Orbiting,
        }
    }

    fn respawn<R: Rng>(&mut self, geo: &BlackHoleGeometry, outer: f64, rng: &mut R) {
        let r = rng.gen_range(geo.isco_radius + RESPAWN_MARGIN..=outer);
        let beta = geo.keplerian_beta(r);
        self.radius = r;
        self.angle = rng.gen_range(0.0..TAU);
        self.angular_speed = geo.keplerian_angular_speed(r);
        self.velocity_beta = beta;
        self.lorentz_gamma = lorentz_gamma(beta);
        self.trail.clear();
        self.phase = ParticlePhase::Respawned;
    }

    pub(crate) fn beaming(&self) -> f64 {
        let cos_los = (self.angle - LINE_OF_SIGHT_AXIS).cos();
        beaming_multiplier(self.lorentz_gamma, self.velocity_beta, cos_los, PARTICLE_BEAMING)
    }

    /// Thermal colour at the current radius, beamed against the line of sight.
    pub(crate) fn color(&self, geo: &BlackHoleGeometry) -> Rgb {
        disk_color(geo, self.radius).scale(self.beaming())
    }
}

pub(crate) struct ParticleSystem {
    pub(crate) particles: Vec<OrbitingParticle>,
    outer_radius: f64,
}

impl ParticleSystem {
    pub(crate) fn new<R: Rng>(count: usize, geo: &BlackHoleGeometry, outer_radius: f64, rng: &mut R) -> Self {
        let particles = (0..count)
            .map(|_| {
                let r = rng.gen_range(geo.isco_radius + INITIAL_MARGIN..=outer_radius);
                let a = rng.gen_range(0.0..TAU);
                OrbitingParticle::on_circular_orbit(geo, r, a)
            })
            .collect();
        Self {
            particles,
            outer_radius,
        }
    }

    /// Advance every orbit one tick; returns how many particles were recycled.
    pub(crate) fn tick<R: Rng>(&mut self, geo: &BlackHoleGeometry, rng: &mut R) -> usize {
        let mut respawned = 0;
        for p in &mut self.particles {
            p.angle = wrap_angle(p.angle + p.angular_speed);
            let visc = VISCOSITY * (p.radius / geo.isco_radius).powi(-2);
            p.radius -= visc * p.radius;

            if p.radius < geo.isco_radius {
                p.respawn(geo, self.outer_radius, rng);
                respawned += 1;
                continue;
            }

            p.phase = ParticlePhase::Orbiting;
            let color = p.color(geo);
            p.trail.push(TrailSample {
                offset: Vec2::polar(p.angle, p.radius),
                color,
            });
        }
        if respawned > 0 {
            tracing::debug!(respawned, "disk particles crossed the ISCO");
        }
        respawned
    }

    pub(crate) fn draw(&self, geo: &BlackHoleGeometry, ctx: &FrameContext, out: &mut DrawList) {
        for p in &self.particles {
            if p.phase == ParticlePhase::Respawned || p.radius <= geo.event_horizon_radius || p.trail.is_empty() {
                continue;
            }
            let n = p.trail.len() as f64;
            for (i, s) in p.trail.iter().enumerate() {
                let fade = (i + 1) as f64 / n * 0.6;
                out.push(DrawCommand::Point {
                    pos: ctx.center.add(s.offset),
                    color: s.color.scale(fade),
                    size: 1.0,
                });
            }
            if let Some(head) = p.trail.newest() {
                out.push(DrawCommand::Point {
                    pos: ctx.center.add(head.offset),
                    color: head.color,
                    size: 2.0,
                });
            }
        }
    }
}
