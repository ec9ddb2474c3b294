use std::time::Duration;

// ---------------------------------------------------------------------------
// Simulation clock
// ---------------------------------------------------------------------------

pub const MIN_TIME_LEVEL: u32 = 1;
pub const MAX_TIME_LEVEL: u32 = 23;

/// Simulation time in integer nanoseconds, advanced by scaled real time.
///
/// Display speed is `2^(level - 1)` simulated seconds per real second.
#[derive(Debug, Clone, PartialEq)]
pub struct SimClock {
    time_ns: i64,
    level: u32,
    paused: bool,
}

impl Default for SimClock {
    fn default() -> Self {
        Self { time_ns: 0, level: MIN_TIME_LEVEL, paused: false }
    }
}

impl SimClock {
    pub fn starting_at(seconds: f64) -> Self {
        let mut clock = Self::default();
        clock.set_seconds(seconds);
        clock
    }

    pub fn time_ns(&self) -> i64 {
        self.time_ns
    }

    pub fn seconds(&self) -> f64 {
        self.time_ns as f64 * 1e-9
    }

    pub fn set_seconds(&mut self, seconds: f64) {
        self.time_ns = (seconds * 1e9).round() as i64;
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn set_level(&mut self, level: u32) {
        self.level = level.clamp(MIN_TIME_LEVEL, MAX_TIME_LEVEL);
    }

    pub fn faster(&mut self) {
        self.set_level(self.level + 1);
    }

    pub fn slower(&mut self) {
        self.set_level(self.level.saturating_sub(1));
    }

    pub fn display_speed(&self) -> f64 {
        (1u64 << (self.level - 1)) as f64
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Advance by `real` wall time; returns the new simulation time in seconds.
    pub fn step(&mut self, real: Duration) -> f64 {
        if !self.paused {
            let delta = (real.as_nanos() as f64 * self.display_speed()) as i64;
            self.time_ns = self.time_ns.saturating_add(delta);
        }
        self.seconds()
    }
}
