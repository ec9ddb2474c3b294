use nalgebra::Vector3;

use crate::math::EPSILON;

/// One astronomical unit in kilometres.
pub const AU_KM: f64 = 149_597_870.7;
/// Scene scale: kilometres per simulation unit.
pub const KM_PER_UNIT: f64 = 100.0;

// ---------------------------------------------------------------------------
// Lighting configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LightingConfig {
    pub ambient: f64,
    pub solar_min: f64,          // floor of the inverse-square falloff
    pub solar_max: f64,          // slight overbright allowed near the star
    pub km_per_unit: f64,
    pub ring_incidence: bool,    // dim rings when light grazes the ring plane
    pub ring_incidence_gamma: f64,
    pub ring_incidence_min: f64,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient: 0.0,
            solar_min: 0.1,
            solar_max: 1.25,
            km_per_unit: KM_PER_UNIT,
            ring_incidence: false,
            ring_incidence_gamma: 0.7,
            ring_incidence_min: 0.25,
        }
    }
}

impl LightingConfig {
    /// One AU expressed in simulation units.
    pub fn au_units(&self) -> f64 {
        AU_KM / self.km_per_unit
    }

    /// Inverse-square illumination relative to 1 AU, clamped to
    /// [`solar_min`, `solar_max`].
    ///
    /// [`solar_min`]: LightingConfig::solar_min
    /// [`solar_max`]: LightingConfig::solar_max
    pub fn solar_illumination(&self, at: &Vector3<f64>, sun: &Vector3<f64>) -> f64 {
        let dist2 = (at - sun).norm_squared().max(EPSILON);
        let au = self.au_units();
        (au * au / dist2).clamp(self.solar_min, self.solar_max)
    }

    /// Surface intensity in [0, 1] from a Lambert term and solar factor.
    pub fn planet_intensity(&self, lambert: f64, solar: f64) -> f64 {
        let lambert = lambert.clamp(0.0, 1.0);
        (self.ambient + (1.0 - self.ambient) * lambert * solar).clamp(0.0, 1.0)
    }

    /// Ring brightness factor from the light's angle to the ring plane.
    /// Always 1 when the incidence term is disabled.
    pub fn ring_incidence(&self, normal: &Vector3<f64>, planet: &Vector3<f64>, sun: &Vector3<f64>) -> f64 {
        if !self.ring_incidence {
            return 1.0;
        }
        let to_sun = sun - planet;
        let len = to_sun.norm();
        if len < EPSILON {
            return 1.0;
        }
        let inc = (to_sun / len).dot(normal).abs().powf(self.ring_incidence_gamma);
        self.ring_incidence_min + (1.0 - self.ring_incidence_min) * inc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_au_is_unity() {
        let cfg = LightingConfig::default();
        let au = cfg.au_units();
        let s = cfg.solar_illumination(&Vector3::new(au, 0.0, 0.0), &Vector3::zeros());
        assert!((s - 1.0).abs() < 1e-9, "solar at 1 AU = {}", s);
    }

    #[test]
    fn falloff_is_clamped() {
        let cfg = LightingConfig::default();
        let sun = Vector3::zeros();
        assert_eq!(cfg.solar_illumination(&Vector3::new(1.0, 0.0, 0.0), &sun), 1.25);
        assert_eq!(cfg.solar_illumination(&sun, &sun), 1.25);
        assert_eq!(cfg.solar_illumination(&Vector3::new(1e12, 0.0, 0.0), &sun), 0.1);
    }

    #[test]
    fn intensity_saturates() {
        let cfg = LightingConfig::default();
        assert_eq!(cfg.planet_intensity(1.0, 1.25), 1.0);
        assert_eq!(cfg.planet_intensity(-0.5, 1.0), 0.0);
        assert!((cfg.planet_intensity(0.5, 1.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn ring_incidence_bounds() {
        let mut cfg = LightingConfig::default();
        let n = Vector3::new(0.0, 1.0, 0.0);
        let planet = Vector3::zeros();
        assert_eq!(cfg.ring_incidence(&n, &planet, &Vector3::new(1.0, 0.0, 0.0)), 1.0);

        cfg.ring_incidence = true;
        let edge_on = cfg.ring_incidence(&n, &planet, &Vector3::new(1.0, 0.0, 0.0));
        let face_on = cfg.ring_incidence(&n, &planet, &Vector3::new(0.0, 5.0, 0.0));
        assert!((edge_on - 0.25).abs() < 1e-12);
        assert!((face_on - 1.0).abs() < 1e-12);
    }
}
