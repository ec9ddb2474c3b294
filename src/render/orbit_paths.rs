use std::f64::consts::TAU;

use super::color::Rgb;
use super::framebuffer::FrameBuffer;
use super::RenderContext;
use crate::body::{BodyId, BodyKind, SolarSystem};
use crate::camera::Camera;
use crate::orbital::orbit_point;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitPathConfig {
    pub planets: bool,
    pub moons: bool,
    pub asteroids: bool,
    pub base_alpha: f64,
    pub min_visible_px: f64,
    pub fade_ref_px: f64,
    pub fade_gamma: f64,
    pub min_segments: u32,
    pub max_segments: u32,
    pub tint_base: u8,     // gray the line starts from
    pub tint_amount: f64,  // how far toward the body color
}

impl Default for OrbitPathConfig {
    fn default() -> Self {
        Self {
            planets: false,
            moons: false,
            asteroids: false,
            base_alpha: 0.25,
            min_visible_px: 2.0,
            fade_ref_px: 25.0,
            fade_gamma: 0.65,
            min_segments: 48,
            max_segments: 200,
            tint_base: 70,
            tint_amount: 0.25,
        }
    }
}

impl OrbitPathConfig {
    pub fn enabled_for(&self, kind: BodyKind) -> bool {
        match kind {
            BodyKind::Planet => self.planets,
            BodyKind::Moon => self.moons,
            BodyKind::Asteroid => self.asteroids,
            BodyKind::Star => false,
        }
    }

    pub fn any(&self) -> bool {
        self.planets || self.moons || self.asteroids
    }

    /// Polyline segment count for an orbit spanning `orbit_px` pixels.
    pub fn segments_for(&self, orbit_px: f64) -> u32 {
        let span = (self.max_segments - self.min_segments) as f64;
        let seg = (self.min_segments as f64 + span * (orbit_px / 400.0).min(1.0)).round() as u32;
        seg.clamp(self.min_segments, self.max_segments)
    }

    pub fn alpha_for(&self, orbit_px: f64) -> f64 {
        let t = (orbit_px / self.fade_ref_px).clamp(0.0, 1.0);
        self.base_alpha * t.powf(self.fade_gamma)
    }
}

/// Draw faded orbit ellipses for every enabled, overlay-approved body.
pub fn render_orbit_paths(system: &SolarSystem, camera: &Camera, ctx: &RenderContext<'_>, fb: &mut FrameBuffer) {
    let cfg = &ctx.config.orbit_paths;
    if !cfg.any() {
        return;
    }
    for kind in [BodyKind::Planet, BodyKind::Moon, BodyKind::Asteroid] {
        if !cfg.enabled_for(kind) {
            continue;
        }
        for (id, _) in system.of_kind(kind) {
            if ctx.overlay.approves(system, id) {
                render_orbit_path(system, id, camera, cfg, fb);
            }
        }
    }
}

fn render_orbit_path(system: &SolarSystem, id: BodyId, camera: &Camera, cfg: &OrbitPathConfig, fb: &mut FrameBuffer) {
    let body = &system[id];
    let (Some(el), Some(parent)) = (body.elements, body.parent.and_then(|p| system.get(p))) else {
        return;
    };
    let apo = el.apoapsis();
    if apo <= 0.0 || camera.project(&parent.position).is_none() {
        return;
    }
    let px_per_unit = camera.pixels_per_unit_at(&parent.position);
    if px_per_unit <= 0.0 {
        return;
    }

    let orbit_px = apo * px_per_unit;
    if orbit_px < cfg.min_visible_px {
        return;
    }
    let alpha = cfg.alpha_for(orbit_px);
    if alpha <= 0.001 {
        return;
    }
    let color = Rgb::gray(cfg.tint_base).mix(body.color(), cfg.tint_amount);

    let seg = cfg.segments_for(orbit_px);
    let mut prev: Option<(f64, f64)> = None;
    for i in 0..=seg {
        let nu = TAU * i as f64 / seg as f64;
        let world = parent.position + orbit_point(&el, nu);
        match camera.project(&world) {
            Some(p) => {
                if let Some((x0, y0)) = prev {
                    fb.draw_line(x0, y0, p.x, p.y, color, alpha);
                }
                prev = Some((p.x, p.y));
            }
            None => prev = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{presets, BodyBuilder};
    use crate::orbital::OrbitalElements;
    use crate::lighting::LightingConfig;
    use crate::render::overlay::OverlayPolicy;
    use crate::render::RenderConfig;
    use nalgebra::Vector3;

    #[test]
    fn segment_count_scales() {
        let cfg = OrbitPathConfig::default();
        assert_eq!(cfg.segments_for(0.0), 48);
        assert_eq!(cfg.segments_for(200.0), 124);
        assert_eq!(cfg.segments_for(10_000.0), 200);
    }

    #[test]
    fn fade_reaches_base_alpha() {
        let cfg = OrbitPathConfig::default();
        assert_eq!(cfg.alpha_for(25.0), 0.25);
        assert_eq!(cfg.alpha_for(100.0), 0.25);
        assert!(cfg.alpha_for(5.0) < 0.25);
    }

    #[test]
    fn planet_orbit_drawn_from_above() {
        let sys = presets::sun_earth_moon().unwrap();
        let mut config = RenderConfig::default();
        config.orbit_paths.planets = true;
        let lighting = LightingConfig::default();
        let overlay = OverlayPolicy::default();
        let ctx = RenderContext { config: &config, lighting: &lighting, overlay: &overlay };

        let earth = sys.find("Earth").unwrap();
        let a = sys[earth].elements.unwrap().a;
        let mut cam = Camera::new(300, 300);
        cam.set_position(Vector3::new(0.0, 3.0 * a, -0.1 * a));
        cam.set_orientation(0.0, -88.0);

        let mut fb = FrameBuffer::new(300, 300);
        render_orbit_paths(&sys, &cam, &ctx, &mut fb);
        assert!(fb.count_lit() > 100, "lit pixels {}", fb.count_lit());

        config.orbit_paths.planets = false;
        let ctx = RenderContext { config: &config, lighting: &lighting, overlay: &overlay };
        let mut fb = FrameBuffer::new(300, 300);
        render_orbit_paths(&sys, &cam, &ctx, &mut fb);
        assert_eq!(fb.count_lit(), 0);
    }

    #[test]
    fn sample_at_the_eye_plane_is_clipped() {
        let mut sys = SolarSystem::new();
        let sun = sys.add_body(BodyBuilder::new("Sun", BodyKind::Star).radius(10.0).build()).unwrap();
        sys.add_body(
            BodyBuilder::new("Rock", BodyKind::Planet)
                .radius(1.0)
                .orbit(sun, OrbitalElements::circular(1000.0, 100.0))
                .build(),
        )
        .unwrap();
        sys.propagate_all(0.0);

        let mut config = RenderConfig::default();
        config.orbit_paths.planets = true;
        let lighting = LightingConfig::default();
        let overlay = OverlayPolicy::default();
        let ctx = RenderContext { config: &config, lighting: &lighting, overlay: &overlay };

        // Facing -X from a hair past the nu = 0 sample, one unit off to the side:
        // that sample projects about 1e11 px off screen.
        let mut cam = Camera::new(300, 300);
        cam.set_position(Vector3::new(1000.0 + 1e-9, 0.0, -1.0));
        cam.set_orientation(270.0, 0.0);
        let near = cam.project(&Vector3::new(1000.0, 0.0, 0.0)).unwrap();
        assert!(near.x.abs() > 1e9, "x = {}", near.x);

        let mut fb = FrameBuffer::new(300, 300);
        render_orbit_paths(&sys, &cam, &ctx, &mut fb);
        let lit = fb.count_lit();
        assert!(lit > 0 && lit < 300 * 300, "lit pixels {}", lit);
    }
}
