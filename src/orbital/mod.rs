pub mod elements;
pub mod frame;
pub mod propagator;

pub use elements::{InvalidElements, OrbitalElements, SECONDS_PER_DAY};
pub use frame::ecliptic_to_engine;
pub use propagator::{orbit_point, propagate};
