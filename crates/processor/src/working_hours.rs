//! Working time elapsed between two instants
//!
//! Only time inside the working-hour window of working days counts. The
//! computation is day-segmented: each working day touched by the interval
//! contributes its overlap with the window, weekends contribute nothing.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use thiserror::Error;

use crate::calendar::{CalendarPolicy, InstantAdjuster, StandardCalendar};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkingHoursError {
    #[error("The end time {end} is before {start}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Working-time calculator over a [`CalendarPolicy`]
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkingHoursCalculator<P = StandardCalendar> {
    adjuster: InstantAdjuster<P>,
}

impl WorkingHoursCalculator<StandardCalendar> {
    pub const fn standard() -> Self {
        Self {
            adjuster: InstantAdjuster::standard(),
        }
    }
}

impl<P: CalendarPolicy> WorkingHoursCalculator<P> {
    pub fn new(policy: P) -> Self {
        Self {
            adjuster: InstantAdjuster::new(policy),
        }
    }

    pub fn adjuster(&self) -> &InstantAdjuster<P> {
        &self.adjuster
    }

    /// Working time between `start` and `end`, both read in `tz`.
    ///
    /// Fails when `end` is before `start`. The result is never negative and
    /// never exceeds `end - start`.
    pub fn diff(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        tz: Tz,
    ) -> Result<Duration, WorkingHoursError> {
        if end < start {
            return Err(WorkingHoursError::InvalidInterval { start, end });
        }

        let adj = &self.adjuster;
        let start_on_working_day = adj.is_on_working_day(start, tz);
        let end_on_working_day = adj.is_on_working_day(end, tz);

        if adj.is_same_day(start, end, tz) && start_on_working_day {
            return Ok(self.working_duration(start, end, tz));
        }

        // Friday afternoon -> Saturday: only Friday's remainder counts
        if start_on_working_day && !end_on_working_day && adj.is_next_day(start, end, tz) {
            return Ok(self.working_duration(start, adj.closing_of_day(start, tz), tz));
        }

        if !start_on_working_day && !end_on_working_day && end - start < Duration::days(2) {
            return Ok(Duration::zero());
        }

        let mut total = Duration::zero();
        let mut cursor = adj.next_working_hour_or_same(start, tz);
        let mut day_close = adj.next_non_working_hour_or_same(cursor, tz);

        while day_close < end && !adj.is_same_day(day_close, end, tz) {
            if adj.is_on_working_day(cursor, tz) {
                total = total + self.working_duration(cursor, day_close, tz);
            }
            let next_day = adj.start_of_day(adj.next_working_day(cursor, tz), tz);
            cursor = adj.next_working_hour_or_same(next_day, tz);
            day_close = adj.next_non_working_hour_or_same(cursor, tz);
        }

        if end_on_working_day {
            total = total + self.working_duration(adj.start_of_day(end, tz), end, tz);
        }

        Ok(total)
    }

    /// Overlap of `[a, b]` with the working window of their (shared) date.
    ///
    /// `a` is clipped up to opening, `b` down to closing; both outside on the
    /// same side gives zero, opening-to-closing gives a full working day.
    pub fn working_duration(&self, a: DateTime<Utc>, b: DateTime<Utc>, tz: Tz) -> Duration {
        let from = a.clamp(
            self.adjuster.opening_of_day(a, tz),
            self.adjuster.closing_of_day(a, tz),
        );
        let to = b.clamp(
            self.adjuster.opening_of_day(b, tz),
            self.adjuster.closing_of_day(b, tz),
        );
        (to - from).max(Duration::zero())
    }
}

/// Working time between two instants under the standard 09:00-17:00,
/// Monday-Friday calendar.
pub fn diff_working_hours(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz: Tz,
) -> Result<Duration, WorkingHoursError> {
    WorkingHoursCalculator::standard().diff(start, end, tz)
}
