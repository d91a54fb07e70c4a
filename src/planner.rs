//! Sample instant planning.
//!
//! A [`SamplePlan`] turns a requested time range and interval into the
//! ordered instants at which frames are captured. The requested end is
//! clamped to the video duration when that is known.

use crate::error::StillsError;

/// Tolerance added to the end of the range so an instant that lands on the
/// end (up to floating-point noise) is still sampled.
pub const END_EPSILON: f64 = 1e-6;

/// A validated, clamped sampling range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePlan {
    start: f64,
    end: Option<f64>,
    interval: f64,
}

impl SamplePlan {
    /// Build a plan from the requested range and the video duration.
    ///
    /// - `end` falls back to `duration` when unset or past the duration; it
    ///   stays unset when both are unknown.
    /// - `start` is clamped to zero.
    ///
    /// # Errors
    ///
    /// Returns [`StillsError::InvalidParameter`] if `interval` is not a
    /// positive finite number, or if the bounded range holds more instants
    /// than can be counted.
    pub fn new(
        start: f64,
        end: Option<f64>,
        interval: f64,
        duration: Option<f64>,
    ) -> Result<Self, StillsError> {
        if !(interval.is_finite() && interval > 0.0) {
            return Err(StillsError::InvalidParameter(format!(
                "interval must be > 0 (got {interval})"
            )));
        }

        let end = match (end, duration) {
            (None, duration) => duration,
            (Some(end), Some(duration)) if end > duration => Some(duration),
            (Some(end), _) => Some(end),
        };
        let start = if start.is_finite() { start.max(0.0) } else { 0.0 };

        if let Some(end) = end {
            if end.is_nan() {
                return Err(StillsError::InvalidParameter(
                    "end time must be a number".to_string(),
                ));
            }
            if step_count(start, end, interval) >= usize::MAX as f64 {
                return Err(StillsError::InvalidParameter(format!(
                    "too many sample instants between {start}s and {end}s every {interval}s"
                )));
            }
        }

        Ok(Self {
            start,
            end,
            interval,
        })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    /// The effective end time, if bounded.
    pub fn end(&self) -> Option<f64> {
        self.end
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Length of the sampled range, when the end is known and after the start.
    pub fn span(&self) -> Option<f64> {
        self.end
            .map(|end| end - self.start)
            .filter(|span| *span > 0.0)
    }

    /// Number of planned instants, or `None` for an unbounded plan.
    pub fn len(&self) -> Option<usize> {
        let end = self.end?;
        if end + END_EPSILON < self.start {
            return Some(0);
        }
        let limit = end + END_EPSILON;
        let mut count = (step_count(self.start, end, self.interval) as usize).saturating_add(1);
        // The division can land one step off the instants themselves.
        while count > 0 && self.instant(count - 1) > limit {
            count -= 1;
        }
        while let Some(next) = count.checked_add(1) {
            if self.instant(count) > limit {
                break;
            }
            count = next;
        }
        Some(count)
    }

    /// `true` when the plan is bounded and yields no instant.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Instant of the `index`-th frame.
    pub fn instant(&self, index: usize) -> f64 {
        self.start + index as f64 * self.interval
    }

    /// Iterate over the planned instants in order.
    pub fn instants(&self) -> SampleInstants {
        SampleInstants {
            plan: *self,
            index: 0,
        }
    }
}

/// Whole intervals between `start` and `end`, before any fix-up.
fn step_count(start: f64, end: f64, interval: f64) -> f64 {
    ((end + END_EPSILON - start) / interval).floor().max(0.0)
}

/// Iterator over the instants of a [`SamplePlan`].
///
/// Unbounded when the plan has no end.
#[derive(Debug, Clone)]
pub struct SampleInstants {
    plan: SamplePlan,
    index: usize,
}

impl Iterator for SampleInstants {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let instant = self.plan.instant(self.index);
        if let Some(end) = self.plan.end {
            if instant > end + END_EPSILON {
                return None;
            }
        }
        self.index += 1;
        Some(instant)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.plan.len() {
            Some(len) => {
                let remaining = len.saturating_sub(self.index);
                (remaining, Some(remaining))
            }
            None => (usize::MAX, None),
        }
    }
}
