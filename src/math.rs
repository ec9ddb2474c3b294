use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Shared numeric guards
// ---------------------------------------------------------------------------

/// Floor applied to lengths and squared distances before dividing.
pub const EPSILON: f64 = 1e-12;

/// World "up" used for camera basis construction and vertical movement.
pub fn world_up() -> Vector3<f64> {
    Vector3::new(0.0, 1.0, 0.0)
}

/// Normalize `v`, flooring its length at `EPSILON` instead of producing NaN.
pub fn safe_normalize(v: &Vector3<f64>) -> Vector3<f64> {
    let len = v.norm().max(EPSILON);
    v / len
}

/// Divide with the denominator floored at `EPSILON` in magnitude (sign kept).
pub fn guarded_div(num: f64, den: f64) -> f64 {
    if den.abs() < EPSILON {
        num / EPSILON.copysign(den)
    } else {
        num / den
    }
}

/// Wrap an angle into [-π, π] via atan2.
pub fn wrap_pi(angle: f64) -> f64 {
    angle.sin().atan2(angle.cos())
}

pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
