//! Angle animation clock.
//!
//! Produces a linearly interpolated angle from elapsed wall-clock time. The
//! orbit controller never reads a timer itself; something has to call
//! [`AngleAnimation::drive`] each frame.

use std::time::Duration;

use super::orbit::OrbitController;
use super::transform::TransformSink;
use crate::error::{ViewerError, ViewerResult};

/// How many times the animation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopCount {
    Finite(u32),
    #[default]
    Infinite,
}

/// Linear interpolation from `start` to `end` over `duration`, looped.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleAnimation {
    start: f32,
    end: f32,
    duration: Duration,
    loops: LoopCount,
}

impl Default for AngleAnimation {
    /// 0 to 360 degrees every 4 seconds, forever.
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 360.0,
            duration: Duration::from_millis(4000),
            loops: LoopCount::Infinite,
        }
    }
}

impl AngleAnimation {
    pub fn new(start: f32, end: f32, duration: Duration, loops: LoopCount) -> ViewerResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(ViewerError::InvalidAnimation(format!(
                "endpoints must be finite, got {start} and {end}"
            )));
        }
        if duration.is_zero() {
            return Err(ViewerError::InvalidAnimation(
                "duration must be non-zero".to_string(),
            ));
        }
        if loops == LoopCount::Finite(0) {
            return Err(ViewerError::InvalidAnimation(
                "loop count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            start,
            end,
            duration,
            loops,
        })
    }

    /// Full turn from 0 to 360 over `duration`, repeated forever.
    pub fn full_turn(duration: Duration) -> ViewerResult<Self> {
        Self::new(0.0, 360.0, duration, LoopCount::Infinite)
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn loops(&self) -> LoopCount {
        self.loops
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        match self.loops {
            LoopCount::Infinite => false,
            LoopCount::Finite(n) => elapsed >= self.duration * n,
        }
    }

    /// Angle at `elapsed`, or `None` once a finite animation has completed.
    pub fn value_at(&self, elapsed: Duration) -> Option<f32> {
        if self.is_finished(elapsed) {
            return None;
        }
        let duration = self.duration.as_nanos();
        let progress = (elapsed.as_nanos() % duration) as f64 / duration as f64;
        Some(self.start + (self.end - self.start) * progress as f32)
    }

    /// Write the angle at `elapsed` into `controller`.
    ///
    /// Returns whether the controller pushed a new transform. A finished
    /// animation leaves the controller untouched.
    pub fn drive<S: TransformSink>(
        &self,
        controller: &mut OrbitController<S>,
        elapsed: Duration,
    ) -> ViewerResult<bool> {
        match self.value_at(elapsed) {
            Some(angle) => controller.set_angle(angle),
            None => Ok(false),
        }
    }
}
