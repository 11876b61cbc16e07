//! Fixed-step timing for the simulation loop.

use std::time::{Duration, Instant};

/// Upper bound on fixed steps consumed per frame before the backlog is dropped.
const MAX_STEPS_PER_FRAME: u32 = 8;

/// Turns wall-clock frames into a sequence of fixed simulation steps.
#[derive(Debug)]
pub struct StepClock {
    /// Time of the last frame.
    last_frame: Instant,
    /// Fixed simulation timestep (default 60 Hz).
    fixed_timestep: Duration,
    /// Accumulated wall time not yet consumed by fixed steps.
    accumulator: Duration,
    /// Fixed steps consumed during the current frame.
    steps_this_frame: u32,
}

impl Default for StepClock {
    fn default() -> Self {
        Self::new(60.0)
    }
}

impl StepClock {
    /// Create a clock producing steps at `hz` per second.
    pub fn new(hz: f64) -> Self {
        Self {
            last_frame: Instant::now(),
            fixed_timestep: Duration::from_secs_f64(1.0 / hz),
            accumulator: Duration::ZERO,
            steps_this_frame: 0,
        }
    }

    /// Update timing at the start of a new frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.accumulator += now - self.last_frame;
        self.last_frame = now;
        self.steps_this_frame = 0;
    }

    /// Check if a fixed step should run and consume the time.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.steps_this_frame >= MAX_STEPS_PER_FRAME {
            if self.accumulator >= self.fixed_timestep {
                log::debug!(
                    "dropping {:.3}s of simulation backlog",
                    self.accumulator.as_secs_f32()
                );
                self.accumulator = Duration::ZERO;
            }
            return false;
        }
        if self.accumulator >= self.fixed_timestep {
            self.accumulator -= self.fixed_timestep;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    /// Time until the next fixed step is due.
    pub fn time_until_next_step(&self) -> Duration {
        self.fixed_timestep.saturating_sub(self.accumulator)
    }
}
