//! Game loop timing
//!
//! The host calls [`FrameGate::poll`] on every animation frame and runs as many
//! simulation ticks as it returns.
//!
//! In `FrameSkip` mode a tick runs only when a full interval has passed since
//! the last tick, and the clock then resets to the current frame. Time left
//! over is dropped, so under load the real tick rate drifts a little below the
//! nominal rate. `Accumulator` mode carries the remainder instead.

use crate::consts::MAX_SUBSTEPS;
use crate::settings::TimestepMode;

#[derive(Debug, Clone)]
pub struct FrameGate {
    interval_ms: f64,
    mode: TimestepMode,
    last_tick_ms: f64,
    accumulator_ms: f64,
    running: bool,
}

impl FrameGate {
    pub fn new(fps: u32, mode: TimestepMode, start_ms: f64) -> Self {
        Self {
            interval_ms: 1000.0 / fps.max(1) as f64,
            mode,
            last_tick_ms: start_ms,
            accumulator_ms: 0.0,
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of ticks due at `now_ms`
    pub fn poll(&mut self, now_ms: f64) -> u32 {
        if !self.running {
            return 0;
        }

        match self.mode {
            TimestepMode::FrameSkip => {
                if now_ms - self.last_tick_ms >= self.interval_ms {
                    self.last_tick_ms = now_ms;
                    1
                } else {
                    0
                }
            }
            TimestepMode::Accumulator => {
                // Clamp long stalls (tab in background) to avoid a burst of catch-up
                let elapsed = (now_ms - self.last_tick_ms).clamp(0.0, 100.0);
                self.last_tick_ms = now_ms;
                self.accumulator_ms += elapsed;

                let mut substeps = 0;
                while self.accumulator_ms >= self.interval_ms && substeps < MAX_SUBSTEPS {
                    self.accumulator_ms -= self.interval_ms;
                    substeps += 1;
                }
                if substeps == MAX_SUBSTEPS {
                    self.accumulator_ms = self.accumulator_ms.min(self.interval_ms);
                }
                substeps
            }
        }
    }

    /// Stop the gate. Safe to call more than once.
    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Frame gate stopped");
        }
        self.running = false;
    }

    /// Start counting again from `now_ms`
    pub fn restart(&mut self, now_ms: f64) {
        self.last_tick_ms = now_ms;
        self.accumulator_ms = 0.0;
        self.running = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_skip_waits_for_interval() {
        let mut gate = FrameGate::new(100, TimestepMode::FrameSkip, 0.0);
        assert_eq!(gate.poll(5.0), 0);
        assert_eq!(gate.poll(10.0), 1);
        assert_eq!(gate.poll(15.0), 0);
        assert_eq!(gate.poll(20.0), 1);
    }

    #[test]
    fn test_frame_skip_drops_leftover_time() {
        let mut gate = FrameGate::new(100, TimestepMode::FrameSkip, 0.0);
        // A long frame still yields a single tick
        assert_eq!(gate.poll(35.0), 1);
        // The clock restarted at 35, not at 30
        assert_eq!(gate.poll(44.0), 0);
        assert_eq!(gate.poll(45.0), 1);
    }

    #[test]
    fn test_frame_skip_drift() {
        // 60 Hz frames against a 144 Hz gate: every frame ticks, so the
        // effective rate is the frame rate, below nominal
        let mut gate = FrameGate::new(144, TimestepMode::FrameSkip, 0.0);
        let ticks: u32 = (1..=60).map(|i| gate.poll(i as f64 * 1000.0 / 60.0)).sum();
        assert_eq!(ticks, 60);
    }

    #[test]
    fn test_accumulator_catches_up() {
        let mut gate = FrameGate::new(100, TimestepMode::Accumulator, 0.0);
        assert_eq!(gate.poll(35.0), 3);
        // 5 ms carried over
        assert_eq!(gate.poll(39.0), 0);
        assert_eq!(gate.poll(45.0), 1);
    }

    #[test]
    fn test_accumulator_caps_substeps() {
        let mut gate = FrameGate::new(1000, TimestepMode::Accumulator, 0.0);
        assert_eq!(gate.poll(50.0), MAX_SUBSTEPS);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut gate = FrameGate::new(100, TimestepMode::FrameSkip, 0.0);
        gate.stop();
        gate.stop();
        assert!(!gate.is_running());
        assert_eq!(gate.poll(1000.0), 0);

        gate.restart(1000.0);
        assert!(gate.is_running());
        assert_eq!(gate.poll(1010.0), 1);
    }
}
