//! Business calendar rules and wall-clock navigation
//!
//! All adjustments are computed on the zone-local wall clock and converted
//! back to UTC. Adjusted targets are exact (`09:00:00.000`, not "nine-ish").
//!
//! ```text
//!   +------+------+------+------+------+------+------+
//!   |  M   |  T   |  W   |  T   |  F   |  S   |  S   |
//!   +------+------+------+------+------+------+------+
//!      working days                 |    weekend
//!
//!   00:00 ........ 09:00 ============ 17:00 ........ 24:00
//!                   open    working    close
//! ```

use chrono::offset::LocalResult;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

/// Hour the working day starts, local time
pub const WORK_START_HOUR: u32 = 9;
/// Hour the working day ends, local time
pub const WORK_END_HOUR: u32 = 17;

/// Rules deciding which days and hours count as working time
pub trait CalendarPolicy {
    fn is_weekend(&self, day: Weekday) -> bool;

    fn work_start_hour(&self) -> u32;

    fn work_end_hour(&self) -> u32;

    /// Length of a full working day
    fn working_day_length(&self) -> Duration {
        Duration::hours(i64::from(self.work_end_hour()) - i64::from(self.work_start_hour()))
    }
}

/// 09:00-17:00, Monday to Friday
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardCalendar;

impl CalendarPolicy for StandardCalendar {
    fn is_weekend(&self, day: Weekday) -> bool {
        matches!(day, Weekday::Sat | Weekday::Sun)
    }

    fn work_start_hour(&self) -> u32 {
        WORK_START_HOUR
    }

    fn work_end_hour(&self) -> u32 {
        WORK_END_HOUR
    }
}

/// Calendar navigation primitives over a [`CalendarPolicy`]
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantAdjuster<P = StandardCalendar> {
    policy: P,
}

impl InstantAdjuster<StandardCalendar> {
    pub const fn standard() -> Self {
        Self {
            policy: StandardCalendar,
        }
    }
}

impl<P: CalendarPolicy> InstantAdjuster<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Same date, 00:00 local.
    ///
    /// - Saturday 11 AM --> Saturday 12 AM
    /// - Monday 2 PM    --> Monday 12 AM
    pub fn start_of_day(&self, instant: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
        at_hour(tz, local_date(instant, tz), 0)
    }

    /// Same time of day on the next working date.
    ///
    /// - Friday 11 AM   --> Monday 11 AM
    /// - Saturday 11 AM --> Monday 11 AM
    /// - Sunday 11 AM   --> Monday 11 AM
    /// - Monday 11 AM   --> Tuesday 11 AM
    pub fn next_working_day(&self, instant: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
        let local = instant.with_timezone(&tz);
        let date = self.working_date_after(local.date_naive());
        resolve_local(tz, date.and_time(local.time()))
    }

    /// Identity on a working date, otherwise same time of day on the next working date.
    ///
    /// - Saturday 11 AM --> Monday 11 AM
    /// - Monday 11 AM   --> Monday 11 AM
    pub fn next_working_day_or_same(&self, instant: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
        let local = instant.with_timezone(&tz);
        if !self.policy.is_weekend(local.weekday()) {
            return instant;
        }
        let date = self.working_date_after(local.date_naive());
        resolve_local(tz, date.and_time(local.time()))
    }

    /// Identity inside working hours; before opening moves to opening the same
    /// day, after closing moves to opening the next calendar day (weekends are
    /// not considered here).
    ///
    /// - Monday 11 AM  --> Monday 11 AM
    /// - Tuesday 6 AM  --> Tuesday 9 AM
    /// - Tuesday 8 PM  --> Wednesday 9 AM
    /// - Friday 8 PM   --> Saturday 9 AM
    pub fn next_working_hour_or_same(&self, instant: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
        let mut current = instant;
        // An opening hour on a skipped local date resolves past the gap,
        // which can land outside the window again
        for _ in 0..4 {
            let next = self.working_hour_step(current, tz);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn working_hour_step(&self, instant: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
        let local = instant.with_timezone(&tz);
        let date = local.date_naive();
        let hour = local.hour();
        if hour < self.policy.work_start_hour() {
            at_hour(tz, date, self.policy.work_start_hour())
        } else if hour >= self.policy.work_end_hour() {
            at_hour(tz, next_date(date), self.policy.work_start_hour())
        } else {
            instant
        }
    }

    /// Identity once closing hour is reached, otherwise closing hour the same day.
    pub fn next_non_working_hour_or_same(&self, instant: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
        let local = instant.with_timezone(&tz);
        if local.hour() >= self.policy.work_end_hour() {
            return instant;
        }
        at_hour(tz, local.date_naive(), self.policy.work_end_hour())
    }

    /// Previous working-hour boundary, irrespective of weekends.
    ///
    /// - Monday 11 AM  --> Monday 9 AM
    /// - Sunday 2 PM   --> Sunday 9 AM
    /// - Tuesday 8 PM  --> Tuesday 5 PM
    /// - Tuesday 6 AM  --> Monday 5 PM
    pub fn prev_working_hour(&self, instant: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
        let local = instant.with_timezone(&tz);
        let date = local.date_naive();
        let hour = local.hour();
        let (start, end) = (self.policy.work_start_hour(), self.policy.work_end_hour());
        if hour < start {
            at_hour(tz, date.pred_opt().unwrap_or(date), end)
        } else if hour <= end {
            at_hour(tz, date, start)
        } else {
            at_hour(tz, date, end)
        }
    }

    /// Opening hour on the instant's local date
    pub fn opening_of_day(&self, instant: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
        at_hour(tz, local_date(instant, tz), self.policy.work_start_hour())
    }

    /// Closing hour on the instant's local date
    pub fn closing_of_day(&self, instant: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
        at_hour(tz, local_date(instant, tz), self.policy.work_end_hour())
    }

    pub fn is_on_working_day(&self, instant: DateTime<Utc>, tz: Tz) -> bool {
        self.next_working_day_or_same(instant, tz) == instant
    }

    pub fn is_within_working_hour(&self, instant: DateTime<Utc>, tz: Tz) -> bool {
        self.next_working_hour_or_same(instant, tz) == instant
    }

    pub fn is_before_working_hour(&self, instant: DateTime<Utc>, tz: Tz) -> bool {
        !self.is_within_working_hour(instant, tz)
            && !self.is_same_day(self.prev_working_hour(instant, tz), instant, tz)
    }

    pub fn is_after_working_hour(&self, instant: DateTime<Utc>, tz: Tz) -> bool {
        !self.is_within_working_hour(instant, tz)
            && !self.is_same_day(self.next_working_hour_or_same(instant, tz), instant, tz)
    }

    /// Both instants fall on the same local calendar date
    pub fn is_same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>, tz: Tz) -> bool {
        local_date(a, tz) == local_date(b, tz)
    }

    /// `b` falls on the local calendar date right after `a`'s
    pub fn is_next_day(&self, a: DateTime<Utc>, b: DateTime<Utc>, tz: Tz) -> bool {
        local_date(a, tz).succ_opt() == Some(local_date(b, tz))
    }

    fn working_date_after(&self, date: NaiveDate) -> NaiveDate {
        let mut candidate = next_date(date);
        // A week always holds a working day unless the policy says otherwise
        for _ in 0..7 {
            if !self.policy.is_weekend(candidate.weekday()) {
                return candidate;
            }
            candidate = next_date(candidate);
        }
        next_date(date)
    }
}

fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

fn next_date(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

fn at_hour(tz: Tz, date: NaiveDate, hour: u32) -> DateTime<Utc> {
    resolve_local(tz, date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(hour)))
}

/// Map a local wall-clock time to an instant.
///
/// Ambiguous times (DST fall-back) take the earlier instant; times inside a
/// DST gap take the first valid instant after the gap.
fn resolve_local(tz: Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    let mut candidate = naive;
    // Real-world gaps are at most a couple of hours, in 15 minute multiples
    for _ in 0..=(4 * 24) {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(t) => return t.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => candidate += Duration::minutes(15),
        }
    }
    Utc.from_utc_datetime(&naive)
}
