use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Ecliptic <-> engine frame
// ---------------------------------------------------------------------------
//
// Orbital math runs in the ecliptic frame (XY = ecliptic plane, +Z = north).
// The engine frame is Y-up: ecliptic (x, y, z) maps to engine (x, z, y).
// Every caller that turns orbital geometry into world positions (propagator,
// ring normals, orbit paths) goes through these two functions.

/// Map an ecliptic-frame vector into the Y-up engine frame.
pub fn ecliptic_to_engine(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(v.x, v.z, v.y)
}

/// Rotate an orbital-plane point into the ecliptic frame.
///
/// `theta` is the argument of latitude ω + ν; the 3-1-3 sequence (ω, i, Ω)
/// collapses to this closed form.
pub fn orbital_plane_to_ecliptic(r: f64, theta: f64, inc: f64, raan: f64) -> Vector3<f64> {
    let (sin_t, cos_t) = theta.sin_cos();
    let (sin_o, cos_o) = raan.sin_cos();
    let (sin_i, cos_i) = inc.sin_cos();

    Vector3::new(
        r * (cos_o * cos_t - sin_o * sin_t * cos_i),
        r * (sin_o * cos_t + cos_o * sin_t * cos_i),
        r * (sin_t * sin_i),
    )
}

/// Unit normal of an orbital plane in the ecliptic frame.
pub fn orbit_normal_ecliptic(inc: f64, raan: f64) -> Vector3<f64> {
    let (sin_o, cos_o) = raan.sin_cos();
    let (sin_i, cos_i) = inc.sin_cos();
    Vector3::new(sin_o * sin_i, -cos_o * sin_i, cos_i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn remap_swaps_y_and_z() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(ecliptic_to_engine(&v), Vector3::new(1.0, 3.0, 2.0));
        assert_eq!(ecliptic_to_engine(&ecliptic_to_engine(&v)), v);
    }

    #[test]
    fn ecliptic_north_is_engine_up() {
        let north = Vector3::new(0.0, 0.0, 1.0);
        assert_eq!(ecliptic_to_engine(&north), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn plane_rotation_preserves_radius() {
        let p = orbital_plane_to_ecliptic(42.0, 1.3, 0.4, 2.1);
        assert!((p.norm() - 42.0).abs() < 1e-9);
    }

    #[test]
    fn plane_point_is_perpendicular_to_normal() {
        let (inc, raan) = (0.7, 1.9);
        let n = orbit_normal_ecliptic(inc, raan);
        for k in 0..12 {
            let p = orbital_plane_to_ecliptic(5.0, k as f64 * 0.5, inc, raan);
            assert!(p.dot(&n).abs() < 1e-9, "point {} leaves the plane", k);
        }
    }

    #[test]
    fn polar_orbit_reaches_north() {
        let p = orbital_plane_to_ecliptic(1.0, FRAC_PI_2, FRAC_PI_2, 0.0);
        assert!((p.z - 1.0).abs() < 1e-12);
    }
}
