pub mod basis;
pub mod controller;

use nalgebra::{Matrix4, Perspective3, Vector3, Vector4};

use crate::math::EPSILON;

pub use basis::CameraBasis;
pub use controller::{CameraCommand, CameraController, ControllerConfig};

pub const DEFAULT_FOV_DEG: f64 = 70.0;
pub const DEFAULT_NEAR: f64 = 1.0;
pub const DEFAULT_FAR: f64 = 1.0e13;

/// Pixel-space location of a projected point (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub depth: f64, // clip w, the distance in front of the camera
}

impl ScreenPoint {
    pub fn distance_to(&self, other: &ScreenPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Nearest pixel (rounded), which may lie outside the viewport.
    pub fn pixel(&self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }
}

// ---------------------------------------------------------------------------
// Camera / frustum
// ---------------------------------------------------------------------------

/// Perspective camera with a cached basis and projection matrix.
///
/// Every setter that touches orientation or lens parameters rebuilds the
/// cache, so the basis is never stale within a frame.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vector3<f64>,
    yaw: f64,   // deg
    pitch: f64, // deg
    fov: f64,   // vertical, deg
    near: f64,
    far: f64,
    width: u32,
    height: u32,
    basis: CameraBasis,
    projection: Matrix4<f64>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let mut cam = Self {
            position: Vector3::zeros(),
            yaw: 0.0,
            pitch: 0.0,
            fov: DEFAULT_FOV_DEG,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            width: width.max(1),
            height: height.max(1),
            basis: CameraBasis::from_yaw_pitch(0.0, 0.0),
            projection: Matrix4::identity(),
        };
        cam.rebuild_projection();
        cam
    }

    // -- setters ------------------------------------------------------------

    pub fn set_position(&mut self, p: Vector3<f64>) {
        self.position = p;
    }

    pub fn set_orientation(&mut self, yaw_deg: f64, pitch_deg: f64) {
        self.yaw = yaw_deg;
        self.pitch = pitch_deg;
        self.basis = CameraBasis::from_yaw_pitch(yaw_deg, pitch_deg);
    }

    pub fn set_fov(&mut self, fov_deg: f64) {
        self.fov = fov_deg.clamp(1.0, 179.0);
        self.rebuild_projection();
    }

    pub fn set_clip(&mut self, near: f64, far: f64) {
        self.near = near.max(EPSILON);
        self.far = far.max(self.near * 2.0);
        self.rebuild_projection();
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.rebuild_projection();
    }

    fn rebuild_projection(&mut self) {
        self.projection =
            Perspective3::new(self.aspect(), self.fov.to_radians(), self.near, self.far).to_homogeneous();
    }

    // -- getters ------------------------------------------------------------

    pub fn position(&self) -> Vector3<f64> { self.position }
    pub fn yaw(&self) -> f64 { self.yaw }
    pub fn pitch(&self) -> f64 { self.pitch }
    pub fn fov(&self) -> f64 { self.fov }
    pub fn near(&self) -> f64 { self.near }
    pub fn far(&self) -> f64 { self.far }
    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }
    pub fn basis(&self) -> &CameraBasis { &self.basis }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn distance_to(&self, p: &Vector3<f64>) -> f64 {
        (p - self.position).norm()
    }

    // -- transforms ---------------------------------------------------------

    pub fn world_to_camera(&self, p: &Vector3<f64>) -> Vector3<f64> {
        self.basis.to_camera(&(p - self.position))
    }

    /// Rotate a world direction into camera space (no translation).
    pub fn direction_to_camera(&self, d: &Vector3<f64>) -> Vector3<f64> {
        self.basis.to_camera(d)
    }

    /// Project a camera-space point. `None` when it is at or behind the eye.
    pub fn camera_to_screen(&self, c: &Vector3<f64>) -> Option<ScreenPoint> {
        let clip = self.projection * Vector4::new(c.x, c.y, c.z, 1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        Some(ScreenPoint {
            x: (ndc_x * 0.5 + 0.5) * self.width as f64,
            y: (-ndc_y * 0.5 + 0.5) * self.height as f64,
            depth: clip.w,
        })
    }

    pub fn project(&self, p: &Vector3<f64>) -> Option<ScreenPoint> {
        self.camera_to_screen(&self.world_to_camera(p))
    }

    /// On-screen radius of a sphere, measured by projecting its center and a
    /// point `radius` along the camera's right axis. 0 when either point fails
    /// to project.
    pub fn apparent_pixel_radius(&self, center: &Vector3<f64>, radius: f64) -> f64 {
        match self.project(center) {
            Some(c) => self.apparent_pixel_radius_from(center, radius, &c),
            None => 0.0,
        }
    }

    /// Same as [`Camera::apparent_pixel_radius`] with the center already
    /// projected.
    pub fn apparent_pixel_radius_from(&self, center: &Vector3<f64>, radius: f64, projected: &ScreenPoint) -> f64 {
        let edge = center + self.basis.right * radius;
        match self.project(&edge) {
            Some(e) => e.distance_to(projected),
            None => 0.0,
        }
    }

    /// Screen pixels per world unit at `point`.
    pub fn pixels_per_unit_at(&self, point: &Vector3<f64>) -> f64 {
        self.apparent_pixel_radius(point, 1.0)
    }

    /// Fallback scale from the vertical fov alone, for points that do not
    /// project.
    pub fn pixels_per_unit_at_distance(&self, distance: f64) -> f64 {
        let half = (self.fov.to_radians() * 0.5).tan();
        (self.height as f64 * 0.5) / (half * distance).max(EPSILON)
    }

    /// Unit camera-space ray through pixel (`px`, `py`) on the near plane.
    pub fn pixel_ray(&self, px: f64, py: f64) -> Vector3<f64> {
        let half_h = self.near * (self.fov.to_radians() * 0.5).tan();
        let half_w = half_h * self.aspect();
        let ndc_x = 2.0 * px / self.width as f64 - 1.0;
        let ndc_y = 1.0 - 2.0 * py / self.height as f64;
        let p = Vector3::new(ndc_x * half_w, ndc_y * half_h, -self.near);
        p / p.norm().max(EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_camera() -> Camera {
        let mut cam = Camera::new(800, 800);
        cam.set_fov(90.0);
        cam
    }

    #[test]
    fn behind_camera_not_visible() {
        let mut cam = square_camera();
        cam.set_position(Vector3::new(0.0, 0.0, 0.0));
        cam.set_orientation(0.0, 0.0);
        assert!(cam.project(&Vector3::new(0.0, 0.0, -10.0)).is_none());
        assert!(cam.project(&Vector3::new(0.0, 0.0, 0.0)).is_none());
        assert!(cam.project(&Vector3::new(0.0, 0.0, 10.0)).is_some());
    }

    #[test]
    fn on_axis_body_projects_to_center() {
        let mut cam = square_camera();
        cam.set_position(Vector3::new(0.0, 0.0, -1000.0));
        cam.set_orientation(0.0, 0.0);
        let c = cam.project(&Vector3::zeros()).unwrap();
        assert!((c.x - 400.0).abs() < 1e-9 && (c.y - 400.0).abs() < 1e-9, "{:?}", c);

        let r = cam.apparent_pixel_radius(&Vector3::zeros(), 10.0);
        let analytic = 10.0 / 1000.0 * 400.0;
        assert!((r - analytic).abs() / analytic < 0.01, "r={} analytic={}", r, analytic);
    }

    #[test]
    fn yaw_ninety_looks_along_x() {
        let mut cam = square_camera();
        cam.set_position(Vector3::new(-1000.0, 0.0, 0.0));
        cam.set_orientation(90.0, 0.0);
        let c = cam.project(&Vector3::zeros()).unwrap();
        assert!((c.x - 400.0).abs() < 1e-6 && (c.y - 400.0).abs() < 1e-6);
        let r = cam.apparent_pixel_radius(&Vector3::zeros(), 10.0);
        assert!((r - 4.0).abs() / 4.0 < 0.01, "r={}", r);

        // From (0,0,-1000) a yaw of 90° looks sideways and the origin sits
        // exactly on the eye plane.
        cam.set_position(Vector3::new(0.0, 0.0, -1000.0));
        assert!(cam.project(&Vector3::zeros()).is_none());
    }

    #[test]
    fn pixel_radius_decreases_with_distance() {
        let mut cam = square_camera();
        cam.set_orientation(0.0, 0.0);
        let mut last = f64::INFINITY;
        for k in 1..60 {
            cam.set_position(Vector3::new(0.0, 0.0, -(50.0 * k as f64)));
            let r = cam.apparent_pixel_radius(&Vector3::zeros(), 10.0);
            assert!(r < last, "radius {} not below {} at step {}", r, last, k);
            last = r;
        }
    }

    #[test]
    fn screen_y_grows_downward() {
        let mut cam = square_camera();
        cam.set_position(Vector3::new(0.0, 0.0, -100.0));
        let above = cam.project(&Vector3::new(0.0, 10.0, 0.0)).unwrap();
        let below = cam.project(&Vector3::new(0.0, -10.0, 0.0)).unwrap();
        assert!(above.y < below.y);
    }

    #[test]
    fn pixel_ray_through_center_is_forward() {
        let cam = square_camera();
        let ray = cam.pixel_ray(400.0, 400.0);
        assert!((ray - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn pixels_per_unit_fallback_agrees_on_axis() {
        let mut cam = square_camera();
        cam.set_position(Vector3::new(0.0, 0.0, -500.0));
        let projected = cam.pixels_per_unit_at(&Vector3::zeros());
        let fallback = cam.pixels_per_unit_at_distance(500.0);
        assert!((projected - fallback).abs() / fallback < 1e-3);
    }
}
