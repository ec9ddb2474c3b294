use std::time::{Duration, Instant};

use nalgebra::Vector3;
use tracing::{debug, trace};

use crate::body::{BodyId, BodyKind, SolarSystem};
use crate::camera::{Camera, CameraCommand, CameraController, ControllerConfig};
use crate::io::StarCatalog;
use crate::lighting::LightingConfig;
use crate::render::hud::{body_info_lines, nearest_body, status_lines, INFO_HUD_DURATION};
use crate::render::{
    draw_order, render_body, render_orbit_paths, render_ring_system, BodyDraw, FrameBuffer, OverlayConfig,
    OverlayPolicy, RenderConfig, RenderContext, StarfieldConfig, StarfieldRenderer,
};
use crate::sim::{FrameStats, SimClock};

/// Where a fresh scene puts the camera: on the −X axis, looking at the origin.
pub const DEFAULT_CAMERA_DISTANCE: f64 = 1.0e7;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Pre-resolved host input for one scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneCommand {
    Camera(CameraCommand),
    ToggleLabels,
    ToggleIcons,
    ToggleFocusCulling,
    ToggleStarfield,
    ToggleOrbits(BodyKind),
    ToggleRingIncidence,
    FasterTime,
    SlowerTime,
    TogglePause,
    /// Show the detail panel for the body nearest the camera.
    ShowNearestInfo,
}

/// What one call to [`Scene::render_frame`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    pub sim_time: f64,
    pub shaded: usize,
    pub flat: usize,
    pub points: usize,
    pub stars: usize,
    pub spike: bool,
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// Everything one view of a system needs between frames.
///
/// There is exactly one writer: the host thread calling [`Scene::apply`] and
/// [`Scene::render_frame`].
#[derive(Debug, Clone)]
pub struct Scene {
    system: SolarSystem,
    pub camera: Camera,
    pub controller: CameraController,
    pub overlay: OverlayPolicy,
    pub render: RenderConfig,
    pub lighting: LightingConfig,
    pub starfield: StarfieldRenderer,
    catalog: Option<StarCatalog>,
    pub clock: SimClock,
    pub stats: FrameStats,
    info: Option<(BodyId, f64)>, // body, real seconds left on screen
}

impl Scene {
    pub fn new(system: SolarSystem, width: u32, height: u32) -> Self {
        let render = RenderConfig::default();
        let controller = CameraController::new(ControllerConfig::default());
        let mut camera = Camera::new(width, height);
        camera.set_position(Vector3::new(-DEFAULT_CAMERA_DISTANCE, 0.0, 0.0));
        camera.set_orientation(controller.yaw(), controller.pitch());

        let mut scene = Self {
            clock: SimClock::starting_at(system.time),
            stats: FrameStats::new(render.frame_spike_ms),
            system,
            camera,
            controller,
            overlay: OverlayPolicy::new(OverlayConfig::default()),
            render,
            lighting: LightingConfig::default(),
            starfield: StarfieldRenderer::new(StarfieldConfig::default()),
            catalog: None,
            info: None,
        };
        scene.refocus();
        scene
    }

    pub fn with_catalog(mut self, catalog: StarCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn system(&self) -> &SolarSystem {
        &self.system
    }

    pub fn catalog(&self) -> Option<&StarCatalog> {
        self.catalog.as_ref()
    }

    pub fn set_catalog(&mut self, catalog: Option<StarCatalog>) {
        self.catalog = catalog;
    }

    /// Replace the whole system between frames.
    ///
    /// The clock jumps to the new system's saved time and any camera lock is
    /// dropped, since body ids do not carry over.
    pub fn load_system(&mut self, system: SolarSystem) -> SolarSystem {
        let old = std::mem::replace(&mut self.system, system);
        self.clock.set_seconds(self.system.time);
        self.controller.apply(CameraCommand::Unlock, &mut self.camera, &self.system);
        self.info = None;
        self.refocus();
        debug!(bodies = self.system.len(), time_s = self.system.time, "system swapped");
        old
    }

    /// Lock the camera to a body by name. Returns false if no such body.
    pub fn lock_to(&mut self, name: &str) -> bool {
        match self.system.find(name) {
            Some(id) => {
                self.apply(SceneCommand::Camera(CameraCommand::LockTo(id)));
                true
            }
            None => false,
        }
    }

    pub fn info_body(&self) -> Option<BodyId> {
        self.info.map(|(id, _)| id)
    }

    fn refocus(&mut self) {
        let pos = self.camera.position();
        self.overlay.update_focus(&self.system, &pos, self.controller.locked_body());
    }

    pub fn apply(&mut self, cmd: SceneCommand) {
        match cmd {
            SceneCommand::Camera(c) => self.controller.apply(c, &mut self.camera, &self.system),
            SceneCommand::ToggleLabels => self.overlay.config.show_labels ^= true,
            SceneCommand::ToggleIcons => self.overlay.config.show_icons ^= true,
            SceneCommand::ToggleFocusCulling => self.overlay.config.focus_culling ^= true,
            SceneCommand::ToggleStarfield => self.starfield.config.enabled ^= true,
            SceneCommand::ToggleOrbits(kind) => {
                let paths = &mut self.render.orbit_paths;
                match kind {
                    BodyKind::Planet => paths.planets ^= true,
                    BodyKind::Moon => paths.moons ^= true,
                    BodyKind::Asteroid => paths.asteroids ^= true,
                    BodyKind::Star => {}
                }
            }
            SceneCommand::ToggleRingIncidence => self.lighting.ring_incidence ^= true,
            SceneCommand::FasterTime => self.clock.faster(),
            SceneCommand::SlowerTime => self.clock.slower(),
            SceneCommand::TogglePause => self.clock.toggle_pause(),
            SceneCommand::ShowNearestInfo => {
                let pos = self.camera.position();
                self.info = nearest_body(&self.system, &pos).map(|id| (id, INFO_HUD_DURATION));
            }
        }
    }

    /// Produce one frame after `real_dt` of wall time.
    ///
    /// Order: clock, propagation, camera, focus, clear, starfield, orbit
    /// paths, then bodies far to near, each followed by its rings.
    pub fn render_frame(&mut self, real_dt: Duration, fb: &mut FrameBuffer) -> FrameReport {
        let started = Instant::now();
        let mut report = FrameReport::default();

        let t = self.clock.step(real_dt);
        self.system.propagate_all(t);
        report.sim_time = t;

        self.controller.update(real_dt.as_secs_f64(), &mut self.camera, &self.system);
        self.refocus();

        let (w, h) = (fb.width() as u32, fb.height() as u32);
        if w != self.camera.width() || h != self.camera.height() {
            self.camera.set_viewport(w, h);
        }
        fb.clear(self.render.background);

        if self.starfield.config.enabled {
            if let Some(catalog) = &self.catalog {
                report.stars = self.starfield.render(catalog, &self.camera, fb).drawn;
            }
        }

        let ctx = RenderContext { config: &self.render, lighting: &self.lighting, overlay: &self.overlay };
        if ctx.config.orbit_paths.any() {
            render_orbit_paths(&self.system, &self.camera, &ctx, fb);
        }

        let order = draw_order(&self.system, &self.camera.position());
        for &(id, _) in order.iter().rev() {
            match render_body(&self.system, id, &self.camera, &ctx, fb) {
                BodyDraw::Shaded => report.shaded += 1,
                BodyDraw::FlatDisk => report.flat += 1,
                BodyDraw::Icon | BodyDraw::Subpixel => report.points += 1,
                BodyDraw::Skipped => {}
            }
            for rings in self.system.rings_of(id) {
                render_ring_system(rings, &self.system, &self.camera, t, &ctx, fb);
            }
        }

        self.write_hud(real_dt, fb);

        report.spike = self.stats.record(started.elapsed());
        trace!(
            t,
            shaded = report.shaded,
            flat = report.flat,
            points = report.points,
            stars = report.stars,
            "frame"
        );
        report
    }

    fn write_hud(&mut self, real_dt: Duration, fb: &mut FrameBuffer) {
        fb.hud = status_lines(
            self.clock.display_speed(),
            self.controller.speed_level(),
            self.controller.speed(),
            self.lighting.km_per_unit,
        );

        if let Some((id, left)) = self.info {
            let left = left - real_dt.as_secs_f64();
            if left <= 0.0 {
                self.info = None;
            } else {
                self.info = Some((id, left));
                fb.hud.push(String::new());
                let pos = self.camera.position();
                fb.hud.extend(body_info_lines(&self.system, id, &pos, self.lighting.km_per_unit));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::presets;
    use crate::camera::controller::Movement;
    use crate::io::StarCatalog;
    use crate::render::rings::RingDefaults;

    fn scene() -> Scene {
        Scene::new(presets::sun_earth_moon().unwrap(), 320, 240)
    }

    #[test]
    fn default_view_sees_the_star() {
        let mut scene = scene();
        let mut fb = FrameBuffer::new(320, 240);
        let report = scene.render_frame(Duration::from_millis(16), &mut fb);
        // The Sun is under a pixel from here, so it shows as its icon.
        assert!(report.flat + report.points >= 1, "{:?}", report);
        assert!(fb.count_lit() > 0);
        assert_eq!(fb.hud.len(), 2);
        assert_eq!(scene.stats.frames(), 1);
    }

    #[test]
    fn locked_camera_renders_shaded_planet() {
        let mut scene = scene();
        assert!(scene.lock_to("Earth"));
        // Look down at Earth from the lock offset.
        scene.controller.set_orientation(90.0, -89.0);
        let mut fb = FrameBuffer::new(320, 240);
        let report = scene.render_frame(Duration::from_millis(16), &mut fb);
        assert!(report.shaded >= 1, "{:?}", report);
        let earth = scene.system().find("Earth").unwrap();
        assert_eq!(scene.overlay.focus(), Some(earth));
    }

    #[test]
    fn saturn_rings_draw_particles() {
        let sys = presets::saturn_system(&RingDefaults::default()).unwrap();
        let mut scene = Scene::new(sys, 320, 240);
        scene.controller.config.lock_height_radii = 6.0;
        assert!(scene.lock_to("Saturn"));
        scene.controller.set_orientation(90.0, -89.0);

        let mut fb = FrameBuffer::new(320, 240);
        scene.render_frame(Duration::ZERO, &mut fb);
        let with_rings = fb.count_lit();

        // Cull every band and redraw the same view.
        scene.render.rings.cull_factor = 0.0;
        scene.render_frame(Duration::ZERO, &mut fb);
        let planet_only = fb.count_lit();
        assert!(planet_only > 0);
        assert!(with_rings > planet_only, "rings added no pixels ({} vs {})", with_rings, planet_only);
    }

    #[test]
    fn clock_drives_propagation() {
        let mut scene = scene();
        scene.clock.set_level(20);
        let earth = scene.system().find("Earth").unwrap();
        let before = scene.system()[earth].position;
        let mut fb = FrameBuffer::new(64, 48);
        let report = scene.render_frame(Duration::from_secs(1), &mut fb);
        assert!((report.sim_time - 524_288.0).abs() < 1e-6);
        assert!((scene.system()[earth].position - before).norm() > 1.0);

        scene.apply(SceneCommand::TogglePause);
        let again = scene.render_frame(Duration::from_secs(1), &mut fb);
        assert_eq!(again.sim_time, report.sim_time);
    }

    #[test]
    fn load_system_swaps_and_resets() {
        let mut scene = scene();
        assert!(scene.lock_to("Moon"));
        let mut replacement = presets::saturn_system(&RingDefaults::default()).unwrap();
        replacement.time = 1234.0;
        let old = scene.load_system(replacement);
        assert!(old.find("Moon").is_some());
        assert!(scene.system().find("Saturn").is_some());
        assert_eq!(scene.controller.locked_body(), None);
        assert!((scene.clock.seconds() - 1234.0).abs() < 1e-9);
    }

    #[test]
    fn nearest_info_expires() {
        let mut scene = scene();
        assert!(scene.lock_to("Moon"));
        scene.apply(SceneCommand::ShowNearestInfo);
        assert_eq!(scene.info_body(), scene.system().find("Moon"));

        let mut fb = FrameBuffer::new(64, 48);
        scene.render_frame(Duration::from_secs(1), &mut fb);
        assert!(fb.hud.iter().any(|l| l.starts_with("Nearest: Moon")));

        scene.render_frame(Duration::from_secs(30), &mut fb);
        assert_eq!(scene.info_body(), None);
        assert_eq!(fb.hud.len(), 2);
    }

    #[test]
    fn toggles_flip_config() {
        let mut scene = scene();
        scene.apply(SceneCommand::ToggleLabels);
        assert!(scene.overlay.config.show_labels);
        scene.apply(SceneCommand::ToggleOrbits(BodyKind::Moon));
        assert!(scene.render.orbit_paths.moons);
        scene.apply(SceneCommand::ToggleStarfield);
        assert!(!scene.starfield.config.enabled);
        scene.apply(SceneCommand::FasterTime);
        assert_eq!(scene.clock.display_speed(), 2.0);
    }

    #[test]
    fn movement_commands_move_camera() {
        let mut scene = scene();
        let start = scene.camera.position();
        scene.apply(SceneCommand::Camera(CameraCommand::Move(Movement::Forward, true)));
        let mut fb = FrameBuffer::new(64, 48);
        scene.render_frame(Duration::from_secs(1), &mut fb);
        let moved = scene.camera.position() - start;
        // Default heading is +X.
        assert!((moved.x - scene.controller.speed()).abs() < 1e-6, "{:?}", moved);
    }

    #[test]
    fn starfield_draws_when_catalog_present() {
        let mut catalog = StarCatalog::default();
        catalog.push([1.0, 0.0, 0.0], 1.0, 0xFFFFFFFF);
        catalog.push([-1.0, 0.0, 0.0], 1.0, 0xFFFFFFFF);
        let mut scene = scene().with_catalog(catalog);
        let mut fb = FrameBuffer::new(64, 48);
        let report = scene.render_frame(Duration::ZERO, &mut fb);
        assert_eq!(report.stars, 1);

        scene.apply(SceneCommand::ToggleStarfield);
        let report = scene.render_frame(Duration::ZERO, &mut fb);
        assert_eq!(report.stars, 0);
    }
}
