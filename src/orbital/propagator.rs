use nalgebra::Vector3;

use super::elements::OrbitalElements;
use super::frame::{ecliptic_to_engine, orbital_plane_to_ecliptic};
use crate::math::{guarded_div, wrap_pi};

/// Fixed Newton-Raphson iteration count for Kepler's equation.
///
/// There is no convergence check. With the `M + e·sin M` starting guess the
/// residual stays below 1e-9 for e ≤ 0.9; accuracy near e → 1 is not
/// guaranteed.
pub const KEPLER_ITERATIONS: usize = 5;

// ---------------------------------------------------------------------------
// Anomalies
// ---------------------------------------------------------------------------

/// Mean anomaly at simulation time `t` (s), wrapped into [-π, π].
///
/// Time is first wrapped into [0, period) so huge or negative times do not
/// lose precision in `n·t`.
pub fn mean_anomaly_at(el: &OrbitalElements, t: f64) -> f64 {
    let mut t_orbit = t % el.period;
    if t_orbit < 0.0 {
        t_orbit += el.period;
    }
    wrap_pi(el.m0 + el.mean_motion() * t_orbit)
}

/// Solve M = E − e·sin E for the eccentric anomaly E.
pub fn solve_kepler(mean_anomaly: f64, e: f64) -> f64 {
    let m = mean_anomaly;
    let mut ea = m + e * m.sin();
    for _ in 0..KEPLER_ITERATIONS {
        let f = ea - e * ea.sin() - m;
        let fp = 1.0 - e * ea.cos();
        ea -= guarded_div(f, fp);
    }
    ea
}

/// True anomaly ν from eccentric anomaly E.
pub fn true_anomaly(eccentric_anomaly: f64, e: f64) -> f64 {
    let (sin_e, cos_e) = eccentric_anomaly.sin_cos();
    let denom = 1.0 - e * cos_e;
    let cos_nu = guarded_div(cos_e - e, denom);
    let sin_nu = guarded_div((1.0 - e * e).sqrt() * sin_e, denom);
    sin_nu.atan2(cos_nu)
}

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// Parent-relative position in the ecliptic frame at time `t`.
pub fn relative_position_ecliptic(el: &OrbitalElements, t: f64) -> Vector3<f64> {
    let m = mean_anomaly_at(el, t);
    let ea = solve_kepler(m, el.e);
    let nu = true_anomaly(ea, el.e);
    let r = el.a * (1.0 - el.e * ea.cos());
    orbital_plane_to_ecliptic(r, el.argp + nu, el.inc, el.raan)
}

/// World (engine-frame) position of a body at simulation time `t`.
///
/// Pure function of its inputs: nothing is integrated, so `t` may jump
/// arbitrarily. `parent_pos` is already in the engine frame.
pub fn propagate(el: &OrbitalElements, parent_pos: &Vector3<f64>, t: f64) -> Vector3<f64> {
    parent_pos + ecliptic_to_engine(&relative_position_ecliptic(el, t))
}

/// Parent-relative engine-frame point on the orbit at true anomaly `nu`.
pub fn orbit_point(el: &OrbitalElements, nu: f64) -> Vector3<f64> {
    let p = el.a * (1.0 - el.e * el.e);
    let r = guarded_div(p, 1.0 + el.e * nu.cos());
    ecliptic_to_engine(&orbital_plane_to_ecliptic(r, el.argp + nu, el.inc, el.raan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn sample_elements() -> OrbitalElements {
        OrbitalElements {
            a: 7_500.0,
            e: 0.37,
            inc: 0.4,
            raan: 1.1,
            argp: 2.3,
            m0: 0.9,
            period: 3_600.0,
        }
    }

    #[test]
    fn periodic_in_time() {
        let el = sample_elements();
        let parent = Vector3::new(10.0, -20.0, 30.0);
        for &t in &[0.0, 17.5, 1234.0, -900.0] {
            let base = propagate(&el, &parent, t);
            for k in [-3i32, -1, 1, 2, 10] {
                let shifted = propagate(&el, &parent, t + k as f64 * el.period);
                let err = (shifted - base).norm();
                assert!(err < 1e-6 * el.a, "t={} k={} drift {:.3e}", t, k, err);
            }
        }
    }

    #[test]
    fn circular_orbit_keeps_radius() {
        let mut el = sample_elements();
        el.e = 0.0;
        let parent = Vector3::new(5.0, 5.0, 5.0);
        for i in 0..200 {
            let t = i as f64 * 37.3;
            let d = (propagate(&el, &parent, t) - parent).norm();
            assert!((d - el.a).abs() < 1e-6, "radius {} at t={}", d, t);
        }
    }

    #[test]
    fn kepler_residual_grid() {
        let mut worst = 0.0_f64;
        for ei in 0..=90 {
            let e = ei as f64 / 100.0;
            for mi in -180..=180 {
                let m = (mi as f64).to_radians();
                let ea = solve_kepler(m, e);
                worst = worst.max((ea - e * ea.sin() - m).abs());
            }
        }
        assert!(worst < 1e-6, "worst Kepler residual {:.3e}", worst);
    }

    #[test]
    fn quarter_period_circular_scenario() {
        let el = OrbitalElements::circular(1000.0, 100.0);
        let m = mean_anomaly_at(&el, 25.0);
        let nu = true_anomaly(solve_kepler(m, el.e), el.e);
        assert!((nu - FRAC_PI_2).abs() < 1e-9, "true anomaly {}", nu.to_degrees());

        let ecl = relative_position_ecliptic(&el, 25.0);
        assert!((ecl - Vector3::new(0.0, 1000.0, 0.0)).norm() < 1e-6);

        // In the Y-up engine frame the in-plane ecliptic +Y lands on +Z.
        let world = propagate(&el, &Vector3::zeros(), 25.0);
        assert!((world - Vector3::new(0.0, 0.0, 1000.0)).norm() < 1e-6);
    }

    #[test]
    fn inclined_orbit_rises_out_of_engine_plane() {
        let mut el = OrbitalElements::circular(1000.0, 100.0);
        el.inc = FRAC_PI_2;
        let world = propagate(&el, &Vector3::zeros(), 25.0);
        assert!((world.y - 1000.0).abs() < 1e-6, "engine up {:?}", world);
    }

    #[test]
    fn eccentric_orbit_hits_apsides() {
        let mut el = OrbitalElements::circular(1000.0, 100.0);
        el.e = 0.5;
        let peri = propagate(&el, &Vector3::zeros(), 0.0).norm();
        let apo = propagate(&el, &Vector3::zeros(), 50.0).norm();
        assert!((peri - el.periapsis()).abs() < 1e-6);
        assert!((apo - el.apoapsis()).abs() < 1e-6);
    }

    #[test]
    fn orbit_point_matches_propagation() {
        let el = sample_elements();
        let t = 811.0;
        let m = mean_anomaly_at(&el, t);
        let nu = true_anomaly(solve_kepler(m, el.e), el.e);
        let on_path = orbit_point(&el, nu);
        let propagated = propagate(&el, &Vector3::zeros(), t);
        assert!((on_path - propagated).norm() < 1e-6 * el.a);
    }

    #[test]
    fn mean_anomaly_wraps_negative_time() {
        let el = OrbitalElements::circular(1.0, 10.0);
        let m = mean_anomaly_at(&el, -2.5);
        assert!((m - (-PI / 2.0)).abs() < 1e-9 || (m - 3.0 * PI / 2.0).abs() < 1e-9);
    }
}
