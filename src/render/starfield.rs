use nalgebra::Vector3;
use tracing::trace;

use super::color::Rgb;
use super::framebuffer::{alpha_level, FrameBuffer};
use crate::camera::Camera;
use crate::io::StarCatalog;

#[derive(Debug, Clone, PartialEq)]
pub struct StarfieldConfig {
    pub enabled: bool,
    pub star_distance: f64,   // world units in front of the camera
    pub mag_exposure: f64,    // multiplier on 10^(-0.4 m)
    pub eye_adaptation: f64,  // asinh tone-map strength
    pub point_radius_px: f64,
    pub alpha_min: f64,
    pub alpha_max: f64,
    pub max_exposure: f64,    // cap on the running auto-exposure gain
    pub skip_brighter_than: f64, // catalogs may carry the Sun itself
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            star_distance: 1.0e9,
            mag_exposure: 3.0,
            eye_adaptation: 12.0,
            point_radius_px: 0.5,
            alpha_min: 0.001,
            alpha_max: 0.98,
            max_exposure: 2.0,
            skip_brighter_than: -5.0,
        }
    }
}

impl StarfieldConfig {
    /// Linear brightness in [0, 1] from visual magnitude (Pogson).
    pub fn brightness(&self, mag: f64) -> f64 {
        (10f64.powf(-0.4 * mag) * self.mag_exposure).clamp(0.0, 1.0)
    }

    /// asinh tone map for a dark-adapted eye; maps [0, 1] onto [0, 1].
    pub fn perceptual(&self, b: f64) -> f64 {
        let k = self.eye_adaptation;
        (k * b.clamp(0.0, 1.0)).asinh() / k.asinh()
    }
}

/// Per-frame summary of the stars that landed in the viewport, logged at
/// trace level.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StarStats {
    pub drawn: usize,
    pub min_mag: f64,
    pub max_mag: f64,
    pub min_alpha: f64,
    pub max_alpha: f64,
    pub mean_alpha: f64,
}

/// Draws a [`StarCatalog`] as one-pixel background points.
///
/// Keeps the brightest pre-exposure alpha seen so far and scales later
/// frames by its inverse (capped), so the brightest star lands near full
/// opacity whatever the catalog's magnitude range.
#[derive(Debug, Clone, Default)]
pub struct StarfieldRenderer {
    pub config: StarfieldConfig,
    max_star_alpha: f64,
}

impl StarfieldRenderer {
    pub fn new(config: StarfieldConfig) -> Self {
        Self { config, max_star_alpha: 0.0 }
    }

    pub fn max_star_alpha(&self) -> f64 {
        self.max_star_alpha
    }

    fn exposure(&self) -> f64 {
        if self.max_star_alpha > 0.0 {
            (1.0 / self.max_star_alpha).min(self.config.max_exposure)
        } else {
            1.0
        }
    }

    pub fn render(&mut self, catalog: &StarCatalog, camera: &Camera, fb: &mut FrameBuffer) -> StarStats {
        let cfg = &self.config;
        let cam = camera.position();
        let r = cfg.point_radius_px;
        let coverage = (std::f64::consts::PI * r * r).clamp(0.0, 1.0);
        let exposure = self.exposure();

        let mut stats = StarStats {
            min_mag: f64::INFINITY,
            max_mag: f64::NEG_INFINITY,
            min_alpha: f64::INFINITY,
            max_alpha: f64::NEG_INFINITY,
            ..StarStats::default()
        };
        let mut sum_alpha = 0.0;
        let mut max_seen = self.max_star_alpha;

        for ((dir, &mag), &argb) in catalog.dirs.iter().zip(&catalog.mags).zip(&catalog.colors) {
            let mag = mag as f64;
            if mag < cfg.skip_brighter_than {
                continue;
            }
            let d = Vector3::new(dir[0] as f64, dir[1] as f64, dir[2] as f64);
            let Some(screen) = camera.project(&(cam + d * cfg.star_distance)) else { continue };

            let a0 = cfg.perceptual(cfg.brightness(mag)) * coverage;
            max_seen = max_seen.max(a0);
            let alpha = (a0 * exposure).clamp(cfg.alpha_min, cfg.alpha_max);

            let (x, y) = screen.pixel();
            if fb.get(x, y).is_none() {
                continue;
            }
            fb.blend_level(x, y, Rgb::from_packed(argb), alpha_level(alpha));

            stats.drawn += 1;
            stats.min_mag = stats.min_mag.min(mag);
            stats.max_mag = stats.max_mag.max(mag);
            stats.min_alpha = stats.min_alpha.min(alpha);
            stats.max_alpha = stats.max_alpha.max(alpha);
            sum_alpha += alpha;
        }
        self.max_star_alpha = max_seen;

        if stats.drawn == 0 {
            return StarStats::default();
        }
        stats.mean_alpha = sum_alpha / stats.drawn as f64;
        trace!(
            drawn = stats.drawn,
            mag_min = stats.min_mag,
            mag_max = stats.max_mag,
            alpha_min = stats.min_alpha,
            alpha_max = stats.max_alpha,
            alpha_mean = stats.mean_alpha,
            "starfield"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn catalog() -> StarCatalog {
        let mut c = StarCatalog::default();
        // Camera at the origin with yaw 0 looks down +Z.
        c.push([0.0, 0.0, 1.0], 0.0, 0xFFFFFFFF);
        c.push([0.05, 0.0, 0.998_75], 4.0, 0xFFFFFFFF);
        c.push([0.0, 0.0, -1.0], 1.0, 0xFFFFFFFF); // behind
        c.push([0.0, 0.05, 0.998_75], -26.7, 0xFFFFFFFF); // the Sun
        c
    }

    fn camera() -> Camera {
        let mut cam = Camera::new(200, 200);
        cam.set_position(Vector3::zeros());
        cam.set_orientation(0.0, 0.0);
        cam
    }

    #[test]
    fn tone_map_is_monotonic_and_normalized() {
        let cfg = StarfieldConfig::default();
        assert!(cfg.perceptual(0.0).abs() < 1e-12);
        assert!((cfg.perceptual(1.0) - 1.0).abs() < 1e-12);
        let mut prev = -1.0;
        for m in (-10..=12).rev() {
            let p = cfg.perceptual(cfg.brightness(m as f64 * 0.5));
            assert!(p >= prev, "mag {} darker than fainter star", m);
            prev = p;
        }
    }

    #[test]
    fn draws_visible_stars_only() {
        let mut fb = FrameBuffer::new(200, 200);
        fb.clear(Rgb::BLACK);
        let mut sf = StarfieldRenderer::default();
        let stats = sf.render(&catalog(), &camera(), &mut fb);
        assert_eq!(stats.drawn, 2, "behind-camera and sun records must be skipped");
        assert!(stats.max_alpha <= 0.98 + 1e-12);
        assert!(stats.min_alpha >= 0.001 - 1e-12);
        assert!(fb.get(100, 100).unwrap() != Rgb::BLACK);
        assert!(sf.max_star_alpha() > 0.0);
    }

    #[test]
    fn stars_outside_the_viewport_are_not_counted() {
        let mut c = StarCatalog::default();
        c.push([0.0, 0.0, 1.0], 2.0, 0xFFFFFFFF);
        // In front of the camera but about 64 degrees off axis, past the
        // 35 degree half field of view.
        c.push([0.9, 0.0, 0.436], 2.0, 0xFFFFFFFF);
        c.push([0.0, -0.9, 0.436], 2.0, 0xFFFFFFFF);

        let cam = camera();
        assert!(cam.project(&Vector3::new(0.9e9, 0.0, 0.436e9)).is_some());

        let mut fb = FrameBuffer::new(200, 200);
        fb.clear(Rgb::BLACK);
        let stats = StarfieldRenderer::default().render(&c, &cam, &mut fb);
        assert_eq!(stats.drawn, 1);
        assert_eq!(fb.count_lit(), 1);
    }

    #[test]
    fn auto_exposure_brightens_faint_fields() {
        let mut faint = StarCatalog::default();
        faint.push([0.0, 0.0, 1.0], 6.0, 0xFFFFFFFF);

        let mut sf = StarfieldRenderer::default();
        let mut fb = FrameBuffer::new(200, 200);
        let first = sf.render(&faint, &camera(), &mut fb);
        let second = sf.render(&faint, &camera(), &mut fb);
        assert!(second.max_alpha > first.max_alpha);
        assert!(second.max_alpha <= first.max_alpha * 2.0 + 1e-12);
    }

    #[test]
    fn empty_catalog_draws_nothing() {
        let mut fb = FrameBuffer::new(10, 10);
        fb.clear(Rgb::BLACK);
        let stats = StarfieldRenderer::default().render(&StarCatalog::default(), &camera(), &mut fb);
        assert_eq!(stats, StarStats::default());
        assert_eq!(fb.count_lit(), 0);
    }
}
