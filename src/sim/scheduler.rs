//! Fixed-timestep scheduling with slow-motion throttling
//!
//! Normal mode runs exactly one physics advance per rendered frame. Slow
//! motion keeps the physics step size fixed but stretches the wall-clock
//! interval between advances to `SIM_DT / factor`, banking real time in an
//! accumulator. Presentation reads `blend()` to interpolate positions
//! between the last two advances so motion stays smooth at full frame rate.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_SUBSTEPS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepScheduler {
    sim_dt: f64,
    slow_factor: f64,
    slow_motion: bool,
    accumulator: f64,
}

impl StepScheduler {
    pub fn new(sim_dt: f64, slow_factor: f64) -> Self {
        Self {
            sim_dt,
            slow_factor,
            slow_motion: false,
            accumulator: 0.0,
        }
    }

    /// The physics step size, identical in both modes
    #[inline]
    pub fn sim_dt(&self) -> f64 {
        self.sim_dt
    }

    #[inline]
    pub fn slow_motion(&self) -> bool {
        self.slow_motion
    }

    /// Enter or leave slow motion. Leaving drops any banked real time so
    /// normal mode resumes cleanly on the next frame.
    pub fn set_slow_motion(&mut self, on: bool) {
        if self.slow_motion && !on {
            self.accumulator = 0.0;
        }
        self.slow_motion = on;
    }

    /// Bank a rendered frame's real elapsed time and return how many fixed
    /// physics advances to run now (0 or more).
    pub fn advance(&mut self, real_dt: f64) -> u32 {
        if !self.slow_motion {
            return 1;
        }
        // cap pathological frame gaps so a paused tab cannot demand
        // hundreds of catch-up steps
        self.accumulator += real_dt.max(0.0).min(0.25);
        let interval = self.sim_dt / self.slow_factor;
        let mut steps = 0;
        while self.accumulator >= interval && steps < MAX_SUBSTEPS {
            self.accumulator -= interval;
            steps += 1;
        }
        steps
    }

    /// Fractional progress toward the next physics advance, in [0, 1].
    /// Presentation-facing only; 1.0 outside slow motion (the snapshot is
    /// always current there).
    pub fn blend(&self) -> f64 {
        if !self.slow_motion {
            return 1.0;
        }
        let interval = self.sim_dt / self.slow_factor;
        (self.accumulator / interval).clamp(0.0, 1.0)
    }

    /// Drop banked time (arena reset)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.slow_motion = false;
    }
}
