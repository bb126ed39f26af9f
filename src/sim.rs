use crate::config::Settings;
use crate::decor::{draw_core, draw_labels, HawkingSparkles, PhotonRing};
use crate::disk::AccretionDiskField;
use crate::draw::{DrawList, FrameContext};
use crate::geometry::{BlackHoleGeometry, Camera, PanDirection, SimulationClock};
use crate::jets::JetSystem;
use crate::lensing::{LensingModel, Starfield};
use crate::math::Vec2;
use crate::particles::ParticleSystem;
use crate::tidal::{TidalConfig, TidalDisruptionSystem};
use rand::{rngs::StdRng, SeedableRng};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    ToggleLabels,
    ToggleHelp,
    Pan(PanDirection),
    Quit,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct DisplayFlags {
    pub(crate) show_labels: bool,
    pub(crate) show_help: bool,
}

/// Population snapshot, mostly for the headless run and the status line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Census {
    pub(crate) t: u64,
    pub(crate) particles: usize,
    pub(crate) jets: usize,
    pub(crate) ring_points: usize,
    pub(crate) sparkles: usize,
    pub(crate) tidal_bodies: usize,
    pub(crate) fragments: usize,
}

impl fmt::Display for Census {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={} particles={} jets={} ring={} sparkles={} bodies={} fragments={}",
            self.t, self.particles, self.jets, self.ring_points, self.sparkles, self.tidal_bodies, self.fragments
        )
    }
}

pub(crate) struct SimulationState {
    pub(crate) geometry: BlackHoleGeometry,
    pub(crate) clock: SimulationClock,
    pub(crate) camera: Camera,
    pub(crate) display: DisplayFlags,
    lensing: LensingModel,
    stars: Starfield,
    pub(crate) particles: ParticleSystem,
    disk: AccretionDiskField,
    pub(crate) jets: JetSystem,
    pub(crate) photon_ring: PhotonRing,
    pub(crate) hawking: HawkingSparkles,
    pub(crate) tidal: TidalDisruptionSystem,
    rng: StdRng,
    world: Vec2,
    pan_step: f64,
}

impl SimulationState {
    /// Expects settings that already passed `Settings::validate`.
    pub(crate) fn new(s: &Settings) -> Self {
        let mut rng = match s.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let geometry = BlackHoleGeometry::derive(s.mass_solar, s.horizon_px, s.light_speed_px);

        let stars = Starfield::new(s.star_count, s.world_width, s.world_height, &mut rng);
        let particles = ParticleSystem::new(s.particle_count, &geometry, s.disk_outer_radius, &mut rng);
        let jets = JetSystem::new(s.jet_count, &geometry, &mut rng);
        let photon_ring = PhotonRing::new(s.photon_ring_count, &geometry, &mut rng);
        let hawking = HawkingSparkles::new(s.hawking_count, &geometry, &mut rng);
        let tidal = TidalDisruptionSystem::new(TidalConfig {
            max_bodies: s.max_tidal_bodies,
            max_fragments: s.max_fragments,
            disruption_radius: s.disruption_radius,
            outer_bound: s.outer_bound,
        });

        Self {
            geometry,
            clock: SimulationClock::default(),
            camera: Camera::default(),
            display: DisplayFlags::default(),
            lensing: LensingModel::new(geometry.event_horizon_radius, s.lensing_radius),
            stars,
            particles,
            disk: AccretionDiskField::new(&geometry, s.disk_sweep_outer),
            jets,
            photon_ring,
            hawking,
            tidal,
            rng,
            world: Vec2::new(s.world_width, s.world_height),
            pan_step: s.pan_step,
        }
    }

    pub(crate) fn world_size(&self) -> Vec2 {
        self.world
    }

    /// Screen position of the hole, camera pan included.
    pub(crate) fn center(&self) -> Vec2 {
        Vec2::new(self.world.x * 0.5, self.world.y * 0.5).add(self.camera.offset)
    }

    /// Quit is the caller's business.
    pub(crate) fn apply(&mut self, action: Action) {
        match action {
            Action::ToggleLabels => self.display.show_labels = !self.display.show_labels,
            Action::ToggleHelp => self.display.show_help = !self.display.show_help,
            Action::Pan(dir) => self.camera.pan(dir, self.pan_step),
            Action::Quit => {}
        }
    }

    pub(crate) fn tick(&mut self) {
        self.clock.advance();
        let geo = &self.geometry;
        let rng = &mut self.rng;

        self.particles.tick(geo, rng);
        self.jets.tick(geo, rng);
        self.photon_ring.tick();
        self.hawking.tick(geo, rng);
        let report = self.tidal.tick(geo, rng);
        if report.spawned + report.shredded > 0 {
            tracing::debug!(
                t = self.clock.t,
                spawned = report.spawned,
                shredded = report.shredded,
                fragments = report.fragments_born,
                "tidal activity"
            );
        }
    }

    /// Rebuild `out` back to front.
    pub(crate) fn compose(&self, out: &mut DrawList) {
        out.clear();
        let geo = &self.geometry;
        let ctx = FrameContext::at(self.center(), self.clock.t);

        self.stars.draw(&self.lensing, &ctx, out);
        self.tidal.draw(geo, &self.lensing, &ctx, out);
        self.jets.draw(geo, &ctx, out);
        self.disk.draw(geo, &ctx, out);
        draw_core(geo, &self.photon_ring, &self.hawking, &ctx, out);
        self.particles.draw(geo, &ctx, out);
        if self.display.show_labels {
            draw_labels(geo, &ctx, out);
        }
    }

    pub(crate) fn census(&self) -> Census {
        Census {
            t: self.clock.t,
            particles: self.particles.particles.len(),
            jets: self.jets.streams.len(),
            ring_points: self.photon_ring.points.len(),
            sparkles: self.hawking.sparkles.len(),
            tidal_bodies: self.tidal.bodies.len(),
            fragments: self.tidal.fragments.len(),
        }
    }
}
