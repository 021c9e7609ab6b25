//! Working-hours review statistics

pub mod aggregate;
pub mod analyzer;
pub mod calendar;
pub mod timezone;
pub mod working_hours;

#[cfg(test)]
mod tests;

pub use analyzer::{
    analyze, PrReviewTimelineAnalyzer, PrStatsEvaluator, StatsError, TimelineIndex,
};
pub use calendar::{CalendarPolicy, InstantAdjuster, StandardCalendar};
pub use timezone::{TimezoneResolver, UserCity, UserTimeZone};
pub use working_hours::{diff_working_hours, WorkingHoursCalculator, WorkingHoursError};
