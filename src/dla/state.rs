//! Accumulated growth of one crawl component and its run lifecycle.

use crate::geom::Line3;

use super::engine::{GrowthTarget, grow_segment, seed_segment};
use super::error::DlaError;
use super::params::SimulationParameters;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    /// Step budget used up; the next run starts over.
    Exhausted,
}

/// What a call to [`GrowthState::step`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Not running; nothing changed.
    Skipped,
    /// One segment was appended.
    Grown(Line3),
    /// Budget already used up; the run is now exhausted.
    Exhausted,
}

#[derive(Debug, Clone, Default)]
pub struct GrowthState {
    segments: Vec<Line3>,
    step_count: usize,
    needs_reset: bool,
    phase: Phase,
}

impl GrowthState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn segments(&self) -> &[Line3] {
        &self.segments
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    #[must_use]
    pub fn needs_reset(&self) -> bool {
        self.needs_reset
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Run signal went high. Data is left alone until the first step.
    pub fn start(&mut self) {
        self.phase = Phase::Running;
    }

    /// Run signal went low. Keeps the grown segments; an exhausted run still
    /// starts over on the next `start`.
    pub fn stop(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Drop all grown segments and return to idle.
    pub fn reset(&mut self) {
        self.segments.clear();
        self.step_count = 0;
        self.needs_reset = false;
        self.phase = Phase::Idle;
    }

    /// Grow one segment.
    ///
    /// The first step of a run also lays down the seed segment. On error the
    /// state is left exactly as it was.
    pub fn step(
        &mut self,
        params: &SimulationParameters,
        target: &GrowthTarget,
    ) -> Result<StepOutcome, DlaError> {
        if self.phase != Phase::Running {
            return Ok(StepOutcome::Skipped);
        }

        // a pending reset only takes effect once the step succeeds
        let (step_count, existing): (usize, &[Line3]) = if self.needs_reset {
            (0, &[])
        } else {
            (self.step_count, &self.segments)
        };

        if step_count as u64 >= params.max_steps {
            self.exhaust();
            return Ok(StepOutcome::Exhausted);
        }

        let step_index = step_count as u64;
        let seed = existing.is_empty().then(|| seed_segment(target.start()));
        let grown = match seed {
            Some(seed) => grow_segment(&[seed], target, params, step_index)?,
            None => grow_segment(existing, target, params, step_index)?,
        };

        if self.needs_reset {
            self.segments.clear();
            self.needs_reset = false;
        }
        self.segments.extend(seed);
        self.segments.push(grown);
        self.step_count = step_count + 1;
        log::debug!("grew segment {} of {}", self.step_count, params.max_steps);

        if self.step_count as u64 >= params.max_steps {
            self.exhaust();
        }
        Ok(StepOutcome::Grown(grown))
    }

    /// Short label for the host UI.
    #[must_use]
    pub fn status_message(&self) -> String {
        if self.phase == Phase::Idle && self.segments.is_empty() {
            "Stopped.".to_owned()
        } else {
            format!("Step: {}", self.step_count)
        }
    }

    fn exhaust(&mut self) {
        self.phase = Phase::Exhausted;
        self.needs_reset = true;
    }
}
