use nalgebra::Vector3;

use crate::math::{safe_normalize, world_up};

/// Orthonormal camera frame derived from yaw/pitch (degrees).
///
/// yaw = 0, pitch = 0 looks along +Z with +Y up. Camera space looks down −Z,
/// so camera-space axes are (right, up, −forward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub forward: Vector3<f64>,
    pub right: Vector3<f64>,
    pub up: Vector3<f64>,
}

impl CameraBasis {
    pub fn from_yaw_pitch(yaw_deg: f64, pitch_deg: f64) -> Self {
        let (sin_y, cos_y) = yaw_deg.to_radians().sin_cos();
        let (sin_p, cos_p) = pitch_deg.to_radians().sin_cos();

        let forward = safe_normalize(&Vector3::new(sin_y * cos_p, sin_p, cos_y * cos_p));
        let right = safe_normalize(&world_up().cross(&forward));
        let up = safe_normalize(&forward.cross(&right));
        Self { forward, right, up }
    }

    /// Express a world-space offset in camera space.
    pub fn to_camera(&self, offset: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(offset.dot(&self.right), offset.dot(&self.up), -offset.dot(&self.forward))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orthonormal_over_range() {
        for yaw in (0..360).step_by(7) {
            for pitch in (-89..=89).step_by(5) {
                let b = CameraBasis::from_yaw_pitch(yaw as f64, pitch as f64);
                for v in [b.forward, b.right, b.up] {
                    assert!((v.norm() - 1.0).abs() < 1e-9, "yaw={} pitch={} |v|={}", yaw, pitch, v.norm());
                }
                assert!(b.forward.dot(&b.right).abs() < 1e-9);
                assert!(b.forward.dot(&b.up).abs() < 1e-9);
                assert!(b.right.dot(&b.up).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn zero_orientation_looks_down_z() {
        let b = CameraBasis::from_yaw_pitch(0.0, 0.0);
        assert!((b.forward - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
        assert!((b.right - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((b.up - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn to_camera_preserves_length() {
        let b = CameraBasis::from_yaw_pitch(123.0, -37.0);
        let v = Vector3::new(3.0, -7.0, 11.0);
        assert!((b.to_camera(&v).norm() - v.norm()).abs() < 1e-9);
        assert!((b.to_camera(&b.forward) - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
    }
}
