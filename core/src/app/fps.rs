//! Frame counting

use std::time::{Duration, Instant};

/// Counts ticks from the start of a loop
#[derive(Debug)]
pub struct FrameCounter {
    start: Instant,
    frames: u64,
}

impl FrameCounter {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            frames: 0,
        }
    }

    pub fn tick(&mut self) {
        self.frames += 1;
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.frames,
            elapsed: self.start.elapsed(),
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Average ticks per second, `None` when no time elapsed
    pub fn average_fps(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        (secs > 0.0).then(|| self.frames as f64 / secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_fps() {
        let summary = RunSummary {
            frames: 120,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(summary.average_fps(), Some(60.0));
    }

    #[test]
    fn test_average_fps_zero_elapsed() {
        let summary = RunSummary {
            frames: 10,
            elapsed: Duration::ZERO,
        };
        assert_eq!(summary.average_fps(), None);
    }

    #[test]
    fn test_frame_counter_counts_ticks() {
        let mut counter = FrameCounter::start();
        counter.tick();
        counter.tick();
        counter.tick();
        assert_eq!(counter.summary().frames, 3);
    }
}
