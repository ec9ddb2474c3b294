use std::f64::consts::TAU;

use nalgebra::Vector3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use super::color::Rgb;
use super::framebuffer::{alpha_level, FrameBuffer};
use super::RenderContext;
use crate::body::{BodyId, SolarSystem};
use crate::camera::Camera;
use crate::math::{safe_normalize, smoothstep, EPSILON};

// ---------------------------------------------------------------------------
// Ring data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RingBand {
    pub inner: f64,          // sim units from planet center
    pub outer: f64,
    pub particle_count: usize,
    pub color: Rgb,
    pub optical_depth: f64,  // opacity knob, independent of particle count
}

/// One procedurally placed ring particle. Never mutated after generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingParticle {
    pub radius: f64,     // from planet center
    pub phase: f64,      // rad at t = 0
    pub height: f64,     // offset along the ring normal
    pub size: f64,       // physical radius, sim units
    pub brightness: f64, // alpha jitter in [0.9, 1.1]
}

#[derive(Debug, Clone)]
pub struct PreparedBand {
    pub band: RingBand,
    pub particles: Vec<RingParticle>,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RingDefaults {
    pub shadow_brightness: f64,
    pub shadow_softness: f64,  // fraction of planet radius, 0 = hard edge
    pub thickness_frac: f64,   // slab thickness as a fraction of band width
    pub min_size_frac: f64,    // particle size range in planet radii
    pub max_size_frac: f64,
    pub cull_factor: f64,      // skip a band beyond outer × this
    pub max_alpha: f64,
}

impl Default for RingDefaults {
    fn default() -> Self {
        Self {
            shadow_brightness: 0.15,
            shadow_softness: 0.0,
            thickness_frac: 0.02,
            min_size_frac: 2e-7,
            max_size_frac: 8e-7,
            cull_factor: 100.0,
            max_alpha: 1.25,
        }
    }
}

/// Stable 32-bit string hash (`h = 31·h + byte`), so seeds do not depend on
/// the process.
pub fn name_hash(name: &str) -> u32 {
    name.bytes().fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(b as u32))
}

/// Deterministic per-band seed from planet name, band index and color.
pub fn band_seed(planet_name: &str, band_index: usize, color: Rgb) -> u64 {
    let argb = 0xFF00_0000 | color.packed();
    (name_hash(planet_name) as u64) ^ (band_index as u64).wrapping_mul(0x9E37_79B9) ^ argb as u64
}

pub fn generate_particles(band: &RingBand, seed: u64, planet_radius: f64, defaults: &RingDefaults) -> Vec<RingParticle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let span = band.outer - band.inner;
    let thickness = span * defaults.thickness_frac;
    let min_size = planet_radius * defaults.min_size_frac;
    let max_size = planet_radius * defaults.max_size_frac;

    (0..band.particle_count)
        .map(|_| RingParticle {
            radius: band.inner + rng.gen::<f64>() * span,
            phase: rng.gen::<f64>() * TAU,
            height: (rng.gen::<f64>() - 0.5) * thickness,
            size: min_size + rng.gen::<f64>() * (max_size - min_size),
            brightness: 0.9 + 0.2 * rng.gen::<f64>(),
        })
        .collect()
}

/// Per-band alpha weight so total coverage tracks optical depth regardless
/// of particle count. Area factors of π cancel.
pub fn band_weight(band: &RingBand, particles: &[RingParticle]) -> f64 {
    let sum_size2: f64 = particles.iter().map(|p| p.size * p.size).sum();
    if sum_size2 <= 1e-18 {
        return 0.0;
    }
    band.optical_depth * (band.outer * band.outer - band.inner * band.inner) / sum_size2
}

// ---------------------------------------------------------------------------
// Ring system
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RingSystem {
    planet: BodyId,
    pub angular_speed: f64, // rad/s
    normal: Vector3<f64>,
    right: Vector3<f64>,
    forward: Vector3<f64>,
    pub shadow_brightness: f64,
    pub shadow_softness: f64,
    bands: Vec<PreparedBand>,
}

impl RingSystem {
    pub fn new(planet: BodyId, angular_speed: f64, normal: Vector3<f64>) -> Self {
        let normal = safe_normalize(&normal);
        let reference = if normal.y.abs() < 0.9 {
            Vector3::new(0.0, 1.0, 0.0)
        } else {
            Vector3::new(1.0, 0.0, 0.0)
        };
        let right = safe_normalize(&reference.cross(&normal));
        let forward = safe_normalize(&normal.cross(&right));
        let defaults = RingDefaults::default();
        Self {
            planet,
            angular_speed,
            normal,
            right,
            forward,
            shadow_brightness: defaults.shadow_brightness,
            shadow_softness: defaults.shadow_softness,
            bands: Vec::new(),
        }
    }

    pub fn planet(&self) -> BodyId { self.planet }
    pub fn normal(&self) -> Vector3<f64> { self.normal }
    pub fn bands(&self) -> &[PreparedBand] { &self.bands }

    /// Generate particles for `band` and append it.
    pub fn add_band(&mut self, band: RingBand, planet_name: &str, planet_radius: f64, defaults: &RingDefaults) {
        let seed = band_seed(planet_name, self.bands.len(), band.color);
        let particles = generate_particles(&band, seed, planet_radius, defaults);
        let weight = band_weight(&band, &particles);
        debug!(planet = planet_name, particles = particles.len(), weight, "ring band prepared");
        self.bands.push(PreparedBand { band, particles, weight });
    }

    /// Planet-relative world offset of a particle at time `t`.
    pub fn particle_offset(&self, p: &RingParticle, t: f64) -> Vector3<f64> {
        let (sin_a, cos_a) = (p.phase + self.angular_speed * t).sin_cos();
        self.right * (p.radius * cos_a) + self.forward * (p.radius * sin_a) + self.normal * p.height
    }

    /// Brightness multiplier from the planet's shadow at `particle`.
    pub fn shadow_factor(&self, sun: &Vector3<f64>, particle: &Vector3<f64>, planet: &Vector3<f64>, planet_r: f64) -> f64 {
        let d = particle - sun;
        let dd = d.norm_squared();
        if dd < EPSILON {
            return 1.0;
        }
        let t = (planet - sun).dot(&d) / dd;
        if t <= 0.0 || t >= 1.0 {
            return 1.0;
        }
        let closest = sun + d * t;
        let dist2 = (planet - closest).norm_squared();

        let soft = self.shadow_softness * planet_r;
        if soft <= 1e-9 {
            return if dist2 < planet_r * planet_r { self.shadow_brightness } else { 1.0 };
        }
        let dist = dist2.sqrt();
        if dist <= planet_r {
            return self.shadow_brightness;
        }
        if dist >= planet_r + soft {
            return 1.0;
        }
        let s = smoothstep(0.0, 1.0, (dist - planet_r) / soft);
        self.shadow_brightness + (1.0 - self.shadow_brightness) * s
    }
}

// ---------------------------------------------------------------------------
// Ring rendering
// ---------------------------------------------------------------------------

/// Particle opacity: the band's calibrated coverage capped at `max_alpha`,
/// then scaled by shadow, solar illumination and incidence.
fn particle_alpha(coverage_alpha: f64, max_alpha: f64, light: f64) -> f64 {
    coverage_alpha.clamp(0.0, max_alpha) * light
}

/// Draw every particle of `rings` as a single composited pixel.
pub fn render_ring_system(
    rings: &RingSystem,
    system: &SolarSystem,
    camera: &Camera,
    t: f64,
    ctx: &RenderContext<'_>,
    fb: &mut FrameBuffer,
) {
    if rings.bands.is_empty() {
        return;
    }
    let Some(planet) = system.get(rings.planet) else { return };
    let Some(sun) = system.light_source(rings.planet).and_then(|s| system.get(s)) else { return };

    let ppos = planet.position;
    let spos = sun.position;
    let illum = ctx.lighting.solar_illumination(&ppos, &spos);
    let incidence = ctx.lighting.ring_incidence(&rings.normal, &ppos, &spos);

    let dist = camera.distance_to(&ppos);
    if dist <= 0.0 {
        return;
    }

    // Planet behind the camera: rings still draw, without occlusion.
    let planet_screen = camera.project(&ppos);
    let planet_px = planet_screen
        .as_ref()
        .map_or(0.0, |s| camera.apparent_pixel_radius_from(&ppos, planet.radius, s));

    let mut px_per_unit = if planet_screen.is_some() && planet.radius > 0.0 {
        planet_px / planet.radius
    } else {
        0.0
    };
    if px_per_unit <= 0.0 {
        px_per_unit = camera.pixels_per_unit_at_distance(dist);
    }

    let to_camera = camera.position() - ppos;
    let defaults = &ctx.config.rings;

    for prepared in &rings.bands {
        if dist > prepared.band.outer * defaults.cull_factor {
            continue;
        }
        let color = prepared.band.color;

        for p in &prepared.particles {
            let offset = rings.particle_offset(p, t);
            let world = ppos + offset;
            let Some(screen) = camera.project(&world) else { continue };

            let front = offset.dot(&to_camera) > 0.0;
            if !front {
                if let Some(ps) = &planet_screen {
                    if screen.distance_to(ps) < planet_px {
                        continue;
                    }
                }
            }

            let shadow = rings.shadow_factor(&spos, &world, &ppos, planet.radius);

            let r_px = p.size * px_per_unit;
            let coverage = (std::f64::consts::PI * r_px * r_px).min(1.0);
            if coverage <= 0.0 {
                continue;
            }
            let light = shadow * illum * incidence;
            let alpha = particle_alpha(prepared.weight * coverage * p.brightness, defaults.max_alpha, light);
            if alpha <= 0.0 {
                continue;
            }

            let (x, y) = screen.pixel();
            fb.blend_level(x, y, color, alpha_level(alpha));
        }
    }
}
