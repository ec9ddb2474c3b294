pub mod body;
pub mod color;
pub mod framebuffer;
pub mod hud;
pub mod orbit_paths;
pub mod order;
pub mod overlay;
pub mod rings;
pub mod starfield;

use crate::lighting::LightingConfig;

pub use body::{render_body, BodyDraw};
pub use color::Rgb;
pub use framebuffer::{FrameBuffer, Label};
pub use orbit_paths::{render_orbit_paths, OrbitPathConfig};
pub use order::{draw_order, sort_by_distance};
pub use overlay::{OverlayConfig, OverlayPolicy};
pub use rings::{render_ring_system, RingBand, RingDefaults, RingSystem};
pub use starfield::{StarStats, StarfieldConfig, StarfieldRenderer};

// ---------------------------------------------------------------------------
// Render configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub segments: u32,            // coarse lighting samples per scanline
    pub subpixel_min_alpha: f64,
    pub surface_safety: f64,      // skip a body when the camera is within radius × this
    pub background: Rgb,
    pub frame_spike_ms: f64,      // frames slower than this are logged and counted
    pub rings: RingDefaults,
    pub orbit_paths: OrbitPathConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            segments: 128,
            subpixel_min_alpha: 0.1,
            surface_safety: 1.02,
            background: Rgb::BLACK,
            frame_spike_ms: 100.0,
            rings: RingDefaults::default(),
            orbit_paths: OrbitPathConfig::default(),
        }
    }
}

/// Read-only state shared by the per-body draw calls of one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub config: &'a RenderConfig,
    pub lighting: &'a LightingConfig,
    pub overlay: &'a OverlayPolicy,
}
