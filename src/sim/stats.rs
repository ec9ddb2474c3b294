use std::collections::VecDeque;
use std::time::Duration;

use tracing::warn;

/// Number of recent frame times kept for plotting.
pub const FRAME_HISTORY: usize = 240;

/// Frame timing record. Slow frames are logged and counted, never aborted.
#[derive(Debug, Clone)]
pub struct FrameStats {
    pub spike_threshold_ms: f64,
    frames: u64,
    spikes: u64,
    last_ms: f64,
    history: VecDeque<f64>,
}

impl FrameStats {
    pub fn new(spike_threshold_ms: f64) -> Self {
        Self {
            spike_threshold_ms,
            frames: 0,
            spikes: 0,
            last_ms: 0.0,
            history: VecDeque::with_capacity(FRAME_HISTORY),
        }
    }

    /// Record one frame; returns true when it counted as a spike.
    pub fn record(&mut self, elapsed: Duration) -> bool {
        let ms = elapsed.as_secs_f64() * 1000.0;
        self.frames += 1;
        self.last_ms = ms;
        if self.history.len() == FRAME_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(ms);

        let spike = ms > self.spike_threshold_ms;
        if spike {
            self.spikes += 1;
            warn!(frame = self.frames, ms, spikes = self.spikes, "frame spike");
        }
        spike
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn spikes(&self) -> u64 {
        self.spikes
    }

    pub fn last_ms(&self) -> f64 {
        self.last_ms
    }

    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    pub fn mean_ms(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().sum::<f64>() / self.history.len() as f64
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(100.0)
    }
}
