use nalgebra::Vector3;

use super::framebuffer::FrameBuffer;
use crate::body::{BodyId, BodyKind, SolarSystem};
use crate::camera::{Camera, ScreenPoint};

// ---------------------------------------------------------------------------
// Overlay configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    pub show_labels: bool,
    pub show_icons: bool,
    pub focus_culling: bool,
    pub min_alpha: f64,
    pub max_alpha: f64,
    pub fade_ref_px: f64,           // radius at which overlays reach full fade-in
    pub fade_gamma: f64,
    pub focus_padding: f64,         // system radius = furthest moon a × padding
    pub focus_fallback_radii: f64,  // system radius without moons, in planet radii
    pub label_lift_px: f64,
    pub label_parent_px: f64,       // labels this close to the parent may hide
    pub label_small_px: f64,        // ...when the body is smaller than this
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            show_labels: false,
            show_icons: true,
            focus_culling: true,
            min_alpha: 0.02,
            max_alpha: 1.0,
            fade_ref_px: 0.75,
            fade_gamma: 0.1,
            focus_padding: 5.0,
            focus_fallback_radii: 250.0,
            label_lift_px: 4.0,
            label_parent_px: 15.0,
            label_small_px: 5.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Focus-aware overlay policy
// ---------------------------------------------------------------------------

/// Decides which bodies get icons, labels, sub-pixel dots and orbit paths.
///
/// With focus culling on and the camera inside a planet's system, only that
/// planet and its moons (plus stars) are approved.
#[derive(Debug, Clone, Default)]
pub struct OverlayPolicy {
    pub config: OverlayConfig,
    focus: Option<BodyId>,
}

impl OverlayPolicy {
    pub fn new(config: OverlayConfig) -> Self {
        Self { config, focus: None }
    }

    pub fn focus(&self) -> Option<BodyId> {
        self.focus
    }

    /// Re-evaluate the focus planet. A locked body wins; otherwise the planet
    /// whose system the camera sits deepest inside.
    pub fn update_focus(&mut self, system: &SolarSystem, camera_pos: &Vector3<f64>, locked: Option<BodyId>) {
        if !self.config.focus_culling {
            self.focus = None;
            return;
        }

        if let Some(id) = locked {
            self.focus = system.get(id).and_then(|b| match b.kind {
                BodyKind::Planet => Some(id),
                BodyKind::Moon => b.parent,
                _ => None,
            });
            return;
        }

        let mut best = None;
        let mut best_score = f64::INFINITY;
        for (id, planet) in system.of_kind(BodyKind::Planet) {
            let sys_r = self.system_radius(system, id);
            if sys_r <= 0.0 {
                continue;
            }
            let d = (camera_pos - planet.position).norm();
            if d <= sys_r {
                let score = d / sys_r;
                if score < best_score {
                    best_score = score;
                    best = Some(id);
                }
            }
        }
        self.focus = best;
    }

    /// Extent of a planet's system: furthest moon orbit padded, else a
    /// multiple of the planet radius.
    pub fn system_radius(&self, system: &SolarSystem, planet: BodyId) -> f64 {
        let max_moon_a = system
            .children(planet)
            .filter(|(_, b)| b.kind == BodyKind::Moon)
            .filter_map(|(_, b)| b.elements.map(|el| el.a))
            .fold(0.0_f64, f64::max);
        if max_moon_a > 0.0 {
            max_moon_a * self.config.focus_padding
        } else {
            system.get(planet).map_or(0.0, |p| (p.radius * self.config.focus_fallback_radii).max(1.0))
        }
    }

    pub fn approves(&self, system: &SolarSystem, id: BodyId) -> bool {
        let Some(body) = system.get(id) else { return false };
        if body.kind == BodyKind::Star || !self.config.focus_culling {
            return true;
        }
        match self.focus {
            None => true,
            Some(f) if f == id => true,
            Some(f) => body.kind == BodyKind::Moon && body.parent == Some(f),
        }
    }

    /// Overlay opacity for a body drawn at `pixel_radius`.
    pub fn alpha(&self, system: &SolarSystem, id: BodyId, pixel_radius: f64) -> f64 {
        if !self.approves(system, id) {
            return 0.0;
        }
        if pixel_radius >= 1.0 {
            return 1.0;
        }
        let c = &self.config;
        let t = (pixel_radius / c.fade_ref_px).clamp(0.0, 1.0);
        (c.min_alpha + (c.max_alpha - c.min_alpha) * t.powf(c.fade_gamma)).clamp(0.0, 1.0)
    }

    /// Queue the body's name label above its disk, unless it would pile up on
    /// its parent's label.
    pub fn label(
        &self,
        system: &SolarSystem,
        id: BodyId,
        camera: &Camera,
        screen: &ScreenPoint,
        pixel_radius: f64,
        fb: &mut FrameBuffer,
    ) {
        if !self.config.show_labels {
            return;
        }
        let Some(body) = system.get(id) else { return };
        if body.name.is_empty() || !body.capabilities().labelled {
            return;
        }
        let alpha = self.alpha(system, id, pixel_radius);
        if alpha <= 0.0 {
            return;
        }

        if let Some(parent) = body.parent.and_then(|p| system.get(p)) {
            if let Some(ps) = camera.project(&parent.position) {
                if ps.distance_to(screen) < self.config.label_parent_px && pixel_radius < self.config.label_small_px {
                    return;
                }
            }
        }

        let x = screen.x.round() as i64;
        let y = (screen.y - pixel_radius - self.config.label_lift_px).round() as i64;
        fb.push_label(body.name.clone(), x, y, alpha);
    }
}
