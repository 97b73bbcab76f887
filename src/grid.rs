use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::timeline::Interval;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("step must be positive, got {0}")]
    NonPositiveStep(Duration),
    #[error("span must be positive, got {0}")]
    NonPositiveSpan(Duration),
    #[error("step {step} is longer than span {span}")]
    StepExceedsSpan { step: Duration, span: Duration },
    #[error("span {span} from {start} runs past the supported date range")]
    OutOfRange { start: DateTime<Utc>, span: Duration },
    #[error("{len} samples exceed the limit of {max}")]
    TooManySamples { len: i64, max: i64 },
}

/// Upper bound on grid length; keeps `step * i` within `i32` multipliers.
pub const MAX_SAMPLES: i64 = i32::MAX as i64;

/// Whole steps in `span`, and whether they divide it exactly.
///
/// Uses nanoseconds when both fit in an `i64`, then coarser units.
fn whole_steps(span: Duration, step: Duration) -> (i64, bool) {
    let resolutions = [
        span.num_nanoseconds().zip(step.num_nanoseconds()),
        span.num_microseconds().zip(step.num_microseconds()),
        Some((span.num_milliseconds(), step.num_milliseconds())),
    ];
    resolutions
        .into_iter()
        .flatten()
        .find(|&(_, step)| step > 0)
        .map(|(span, step)| (span / step, span % step == 0))
        .unwrap_or((i64::MAX, false))
}

/// Evenly spaced sample instants over `[start, start + span)`.
///
/// The sample count is `floor(span / step)`. When the step does not divide
/// the span, the trailing partial interval gets no sample of its own; the
/// run window reported by [`TimeGrid::window`] still covers the full span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeGrid {
    start: DateTime<Utc>,
    span: Duration,
    step: Duration,
    len: usize,
}

impl TimeGrid {
    pub fn new(start: DateTime<Utc>, span: Duration, step: Duration) -> Result<Self, GridError> {
        if step <= Duration::zero() {
            return Err(GridError::NonPositiveStep(step));
        }
        if span <= Duration::zero() {
            return Err(GridError::NonPositiveSpan(span));
        }
        if step > span {
            return Err(GridError::StepExceedsSpan { step, span });
        }

        if start.checked_add_signed(span).is_none() {
            return Err(GridError::OutOfRange { start, span });
        }

        let (count, exact) = whole_steps(span, step);
        if count > MAX_SAMPLES {
            return Err(GridError::TooManySamples {
                len: count,
                max: MAX_SAMPLES,
            });
        }
        if !exact {
            log::debug!(
                "Span {} is not a whole number of {} steps, dropping the trailing partial step",
                span,
                step
            );
        }
        let len = count as usize;

        Ok(Self {
            start,
            span,
            step,
            len,
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn step_minutes(&self) -> f64 {
        match self.step.num_microseconds() {
            Some(us) => us as f64 / 60_000_000.0,
            None => self.step.num_milliseconds() as f64 / 60_000.0,
        }
    }

    /// Caller-requested run window, `[start, start + span]`.
    pub fn window(&self) -> Interval {
        Interval::new(self.start, self.start + self.span)
    }

    pub fn instants(&self) -> Vec<DateTime<Utc>> {
        // len <= MAX_SAMPLES and every instant precedes start + span
        (0..self.len)
            .map(|i| self.start + self.step * i as i32)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 8, 0, 0, 0).unwrap()
    }

    #[test]
    fn day_at_five_minutes() {
        let grid = TimeGrid::new(start(), Duration::hours(24), Duration::minutes(5)).unwrap();
        let instants = grid.instants();

        assert_eq!(grid.len(), 288);
        assert_eq!(instants.len(), 288);
        assert_eq!(instants[0], start());
        assert!(instants.windows(2).all(|w| w[1] - w[0] == Duration::minutes(5)));
        assert_eq!(grid.step_minutes(), 5.0);
    }

    #[test]
    fn partial_interval_is_dropped() {
        let grid = TimeGrid::new(start(), Duration::minutes(17), Duration::minutes(5)).unwrap();
        let instants = grid.instants();

        assert_eq!(instants.len(), 3);
        assert_eq!(*instants.last().unwrap(), start() + Duration::minutes(10));
        assert_eq!(grid.window().end, start() + Duration::minutes(17));
    }

    #[test]
    fn restartable() {
        let grid = TimeGrid::new(start(), Duration::hours(1), Duration::seconds(90)).unwrap();
        assert_eq!(grid.instants(), grid.instants());
        assert_eq!(grid.len(), 40);
    }

    #[test]
    fn sub_millisecond_step() {
        let grid = TimeGrid::new(start(), Duration::seconds(1), Duration::microseconds(500)).unwrap();
        let instants = grid.instants();

        assert_eq!(grid.len(), 2000);
        assert_eq!(instants.len(), 2000);
        assert_eq!(instants[1] - instants[0], Duration::microseconds(500));
        assert_eq!(*instants.last().unwrap(), start() + Duration::microseconds(999_500));
    }

    #[test]
    fn uneven_sub_millisecond_step_floors() {
        let grid =
            TimeGrid::new(start(), Duration::milliseconds(1), Duration::microseconds(300)).unwrap();
        assert_eq!(grid.len(), 3);
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let err = TimeGrid::new(start(), Duration::days(1), Duration::microseconds(1)).unwrap_err();
        assert!(matches!(
            err,
            GridError::TooManySamples { len: 86_400_000_000, max: MAX_SAMPLES }
        ));

        let grid = TimeGrid::new(start(), Duration::days(365), Duration::milliseconds(15)).unwrap();
        assert!(grid.len() as i64 <= MAX_SAMPLES);
        assert_eq!(grid.len(), 2_102_400_000);
    }

    #[test]
    fn rejects_bad_steps() {
        assert!(matches!(
            TimeGrid::new(start(), Duration::hours(1), Duration::zero()),
            Err(GridError::NonPositiveStep(_))
        ));
        assert!(matches!(
            TimeGrid::new(start(), Duration::hours(1), Duration::minutes(-5)),
            Err(GridError::NonPositiveStep(_))
        ));
        assert!(matches!(
            TimeGrid::new(start(), Duration::zero(), Duration::minutes(5)),
            Err(GridError::NonPositiveSpan(_))
        ));
        assert!(matches!(
            TimeGrid::new(start(), Duration::minutes(1), Duration::minutes(5)),
            Err(GridError::StepExceedsSpan { .. })
        ));
    }
}
