pub mod clock;
pub mod stats;

pub use clock::{SimClock, MAX_TIME_LEVEL, MIN_TIME_LEVEL};
pub use stats::{FrameStats, FRAME_HISTORY};
