use std::f64::consts::PI;

use thiserror::Error;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Reasons a set of elements is unusable by the propagator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidElements {
    #[error("orbital period must be positive, got {0}")]
    NonPositivePeriod(f64),
    #[error("eccentricity must be in [0, 1), got {0}")]
    EccentricityOutOfRange(f64),
    #[error("semi-major axis must be positive, got {0}")]
    NonPositiveSemiMajorAxis(f64),
    #[error("element `{0}` is not finite")]
    NotFinite(&'static str),
}

/// Classical Keplerian elements in the parent-centered ecliptic frame.
///
/// Angles are stored in radians, the period in seconds. Values are assumed
/// validated (see [`OrbitalElements::validate`]) once they reach the
/// propagator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    pub a: f64,      // semi-major axis, sim units
    pub e: f64,      // eccentricity, [0, 1)
    pub inc: f64,    // inclination, rad
    pub raan: f64,   // longitude of ascending node Ω, rad
    pub argp: f64,   // argument of periapsis ω, rad
    pub m0: f64,     // mean anomaly at t = 0, rad
    pub period: f64, // s
}

impl OrbitalElements {
    /// Build from save-file units: angles in degrees, period in days.
    pub fn from_degrees(
        a: f64,
        e: f64,
        inc_deg: f64,
        raan_deg: f64,
        argp_deg: f64,
        m0_deg: f64,
        period_days: f64,
    ) -> Self {
        Self {
            a,
            e,
            inc: inc_deg.to_radians(),
            raan: raan_deg.to_radians(),
            argp: argp_deg.to_radians(),
            m0: m0_deg.to_radians(),
            period: period_days * SECONDS_PER_DAY,
        }
    }

    /// Circular, equatorial orbit starting at periapsis.
    pub fn circular(a: f64, period: f64) -> Self {
        Self { a, e: 0.0, inc: 0.0, raan: 0.0, argp: 0.0, m0: 0.0, period }
    }

    /// Mean motion n = 2π / T (rad/s).
    pub fn mean_motion(&self) -> f64 {
        2.0 * PI / self.period
    }

    pub fn period_days(&self) -> f64 {
        self.period / SECONDS_PER_DAY
    }

    pub fn periapsis(&self) -> f64 {
        self.a * (1.0 - self.e)
    }

    pub fn apoapsis(&self) -> f64 {
        self.a * (1.0 + self.e)
    }

    /// Reject elements the propagator cannot handle.
    pub fn validate(&self) -> Result<(), InvalidElements> {
        let fields = [
            ("a", self.a),
            ("e", self.e),
            ("i", self.inc),
            ("raan", self.raan),
            ("argp", self.argp),
            ("m0", self.m0),
            ("period", self.period),
        ];
        for (name, v) in fields {
            if !v.is_finite() {
                return Err(InvalidElements::NotFinite(name));
            }
        }
        if self.period <= 0.0 {
            return Err(InvalidElements::NonPositivePeriod(self.period));
        }
        if !(0.0..1.0).contains(&self.e) {
            return Err(InvalidElements::EccentricityOutOfRange(self.e));
        }
        if self.a <= 0.0 {
            return Err(InvalidElements::NonPositiveSemiMajorAxis(self.a));
        }
        Ok(())
    }
}
