use nalgebra::Vector3;
use tracing::debug;

use super::{Camera, CameraBasis};
use crate::body::{BodyId, SolarSystem};
use crate::math::world_up;

// ---------------------------------------------------------------------------
// Semantic input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
    Up,
    Down,
}

/// Pre-resolved camera input. Raw key and mouse decoding stays in the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraCommand {
    /// Start (`true`) or stop holding a movement direction.
    Move(Movement, bool),
    /// Start (`true`) or stop holding a rotation direction.
    Turn(Turn, bool),
    SpeedUp,
    SlowDown,
    DragStart,
    /// Pointer moved by (dx, dy) pixels while dragging.
    DragBy { dx: f64, dy: f64 },
    DragEnd,
    LockTo(BodyId),
    Unlock,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub initial_yaw: f64,        // deg
    pub turn_rate: f64,          // deg/s
    pub base_speed: f64,         // units/s at speed level 0
    pub min_speed_level: i32,
    pub max_speed_level: i32,
    pub drag_sensitivity: f64,   // deg per full viewport drag
    pub lock_height_radii: f64,  // initial lock offset above the body
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            initial_yaw: 90.0,
            turn_rate: 45.0,
            base_speed: 500.0,
            min_speed_level: -4,
            max_speed_level: 12,
            drag_sensitivity: 180.0,
            lock_height_radii: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Held {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    turn_left: bool,
    turn_right: bool,
    turn_up: bool,
    turn_down: bool,
}

impl Held {
    fn any(&self) -> bool {
        self.forward
            || self.backward
            || self.left
            || self.right
            || self.up
            || self.down
            || self.turn_left
            || self.turn_right
            || self.turn_up
            || self.turn_down
    }
}

/// Free-fly camera with optional lock-to-body.
///
/// While locked the camera keeps a persistent offset from the body, and
/// movement edits the offset instead of the absolute position.
#[derive(Debug, Clone)]
pub struct CameraController {
    pub config: ControllerConfig,
    yaw: f64,
    pitch: f64,
    speed_level: i32,
    held: Held,
    dragging: bool,
    locked: Option<BodyId>,
    lock_offset: Vector3<f64>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl CameraController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            yaw: wrap_yaw(config.initial_yaw),
            pitch: 0.0,
            speed_level: 0,
            held: Held::default(),
            dragging: false,
            locked: None,
            lock_offset: Vector3::zeros(),
            config,
        }
    }

    pub fn yaw(&self) -> f64 { self.yaw }
    pub fn pitch(&self) -> f64 { self.pitch }
    pub fn speed_level(&self) -> i32 { self.speed_level }
    pub fn locked_body(&self) -> Option<BodyId> { self.locked }

    pub fn set_orientation(&mut self, yaw: f64, pitch: f64) {
        self.yaw = wrap_yaw(yaw);
        self.pitch = clamp_pitch(pitch);
    }

    /// Current travel speed in units per second.
    pub fn speed(&self) -> f64 {
        self.config.base_speed * 2f64.powi(self.speed_level)
    }

    pub fn apply(&mut self, cmd: CameraCommand, camera: &mut Camera, system: &SolarSystem) {
        match cmd {
            CameraCommand::Move(dir, on) => {
                let flag = match dir {
                    Movement::Forward => &mut self.held.forward,
                    Movement::Backward => &mut self.held.backward,
                    Movement::Left => &mut self.held.left,
                    Movement::Right => &mut self.held.right,
                    Movement::Up => &mut self.held.up,
                    Movement::Down => &mut self.held.down,
                };
                *flag = on;
            }
            CameraCommand::Turn(dir, on) => {
                let flag = match dir {
                    Turn::Left => &mut self.held.turn_left,
                    Turn::Right => &mut self.held.turn_right,
                    Turn::Up => &mut self.held.turn_up,
                    Turn::Down => &mut self.held.turn_down,
                };
                *flag = on;
            }
            CameraCommand::SpeedUp => {
                self.speed_level = (self.speed_level + 1).min(self.config.max_speed_level);
            }
            CameraCommand::SlowDown => {
                self.speed_level = (self.speed_level - 1).max(self.config.min_speed_level);
            }
            CameraCommand::DragStart => self.dragging = true,
            CameraCommand::DragEnd => self.dragging = false,
            CameraCommand::DragBy { dx, dy } => {
                if self.dragging {
                    let w = camera.width() as f64;
                    let h = camera.height() as f64;
                    let s = self.config.drag_sensitivity;
                    self.yaw = wrap_yaw(self.yaw + dx / w * s);
                    self.pitch = clamp_pitch(self.pitch - dy / h * s);
                    camera.set_orientation(self.yaw, self.pitch);
                }
            }
            CameraCommand::LockTo(id) => match system.get(id) {
                Some(body) => {
                    self.locked = Some(id);
                    self.lock_offset = Vector3::new(0.0, body.radius * self.config.lock_height_radii, 0.0);
                    camera.set_position(body.position + self.lock_offset);
                    debug!(body = %body.name, "camera locked");
                }
                None => self.unlock(),
            },
            CameraCommand::Unlock => self.unlock(),
        }
    }

    fn unlock(&mut self) {
        self.locked = None;
        self.lock_offset = Vector3::zeros();
    }

    /// Advance by `dt` seconds of real time: follow the locked body, then
    /// apply held rotation and movement.
    pub fn update(&mut self, dt: f64, camera: &mut Camera, system: &SolarSystem) {
        let anchor = match self.locked.map(|id| system.get(id)) {
            Some(Some(body)) => Some(body.position),
            Some(None) => {
                self.unlock();
                None
            }
            None => None,
        };

        camera.set_orientation(self.yaw, self.pitch);
        if let Some(p) = anchor {
            camera.set_position(p + self.lock_offset);
        }
        if !self.held.any() {
            return;
        }

        let step = self.config.turn_rate * dt;
        let h = self.held;
        let mut yaw = self.yaw;
        let mut pitch = self.pitch;
        if h.turn_left { yaw -= step; }
        if h.turn_right { yaw += step; }
        if h.turn_up { pitch += step; }
        if h.turn_down { pitch -= step; }
        self.set_orientation(yaw, pitch);
        camera.set_orientation(self.yaw, self.pitch);

        let basis = CameraBasis::from_yaw_pitch(self.yaw, self.pitch);
        let mut dir = Vector3::zeros();
        if h.forward { dir += basis.forward; }
        if h.backward { dir -= basis.forward; }
        if h.right { dir += basis.right; }
        if h.left { dir -= basis.right; }
        if h.up { dir += world_up(); }
        if h.down { dir -= world_up(); }

        let len = dir.norm();
        if len == 0.0 {
            return;
        }
        let delta = dir / len * self.speed() * dt;

        match anchor {
            Some(p) => {
                self.lock_offset += delta;
                camera.set_position(p + self.lock_offset);
            }
            None => camera.set_position(camera.position() + delta),
        }
    }
}

fn wrap_yaw(yaw: f64) -> f64 {
    let y = yaw % 360.0;
    if y < 0.0 { y + 360.0 } else { y }
}

fn clamp_pitch(pitch: f64) -> f64 {
    pitch.clamp(-89.0, 89.0)
}
