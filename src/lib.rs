pub mod math;
pub mod orbital;
pub mod body;
pub mod camera;
pub mod lighting;
pub mod render;
pub mod io;
pub mod sim;
pub mod scene;

pub use body::{BodyId, BodyKind, CelestialBody, SolarSystem};
pub use camera::{Camera, ScreenPoint};
pub use orbital::{propagate, OrbitalElements};
pub use render::{render_body, render_ring_system, FrameBuffer};
pub use scene::{Scene, SceneCommand};
