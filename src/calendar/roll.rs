use chrono::{DateTime, Datelike, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::holiday::HolidayProvider;
use crate::types::PeriodType;

/// rule for shifting a candidate due date off a non-business day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollConvention {
    /// keep the calendar date as-is
    Unadjusted,
    /// shift forward to the next business day
    Following,
    /// shift backward to the previous business day
    Preceding,
    /// shift forward unless that crosses a month boundary, then backward
    ModifiedFollowing,
}

/// advance one nominal period without any roll adjustment
pub fn advance_period(from: DateTime<Utc>, period: PeriodType) -> DateTime<Utc> {
    match period {
        PeriodType::Day => from + Duration::days(1),
        PeriodType::BiWeek => from + Duration::days(14),
        PeriodType::Month => from + Months::new(1),
        PeriodType::Year => from + Months::new(12),
    }
}

/// next due date: advance one period, then apply the roll convention
pub fn next_period_date(
    last: DateTime<Utc>,
    period: PeriodType,
    roll: RollConvention,
    holidays: &dyn HolidayProvider,
) -> DateTime<Utc> {
    apply_roll(advance_period(last, period), roll, holidays)
}

pub fn apply_roll(
    candidate: DateTime<Utc>,
    roll: RollConvention,
    holidays: &dyn HolidayProvider,
) -> DateTime<Utc> {
    match roll {
        RollConvention::Unadjusted => candidate,
        RollConvention::Following => roll_forward(candidate, holidays),
        RollConvention::Preceding => roll_backward(candidate, holidays),
        RollConvention::ModifiedFollowing => {
            let forward = roll_forward(candidate, holidays);
            if forward.month() == candidate.month() {
                forward
            } else {
                roll_backward(candidate, holidays)
            }
        }
    }
}

fn roll_forward(mut t: DateTime<Utc>, holidays: &dyn HolidayProvider) -> DateTime<Utc> {
    while holidays.is_holiday(t.date_naive()) {
        t = t + Duration::days(1);
    }
    t
}

fn roll_backward(mut t: DateTime<Utc>, holidays: &dyn HolidayProvider) -> DateTime<Utc> {
    while holidays.is_holiday(t.date_naive()) {
        t = t - Duration::days(1);
    }
    t
}
