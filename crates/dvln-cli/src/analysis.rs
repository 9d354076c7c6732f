//! Timing checkpoints for `--analysis`

use std::time::{Duration, Instant};

/// Wall clock timer started at program entry
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time since the timer started
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Checkpoint line such as `Analysis: init: 1.2ms`
    pub fn checkpoint(&self, label: &str) -> String {
        format!("Analysis: {}: {:?}", label, self.elapsed())
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::start()
    }
}
