use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::LoanError;

/// day count convention for prorating interest over a date interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayCountConvention {
    /// 30/360 U.S. (bond basis)
    BondBasis,
    /// 30E/360
    Eurobond,
    /// actual / 360
    MoneyMarket,
    /// actual / 365
    Fixed,
    /// actual / actual, denominator from the year containing `start`
    Isda,
    /// actual / 365.25
    Afb,
}

impl DayCountConvention {
    /// day count and year basis for the interval
    pub fn day_count(&self, start: NaiveDate, end: NaiveDate) -> (i64, Decimal) {
        match self {
            DayCountConvention::BondBasis => (days_30_360_us(start, end), dec!(360)),
            DayCountConvention::Eurobond => (days_30_360_eu(start, end), dec!(360)),
            DayCountConvention::MoneyMarket => (actual_days(start, end), dec!(360)),
            DayCountConvention::Fixed => (actual_days(start, end), dec!(365)),
            // multi-year spans are the caller's responsibility to split
            DayCountConvention::Isda => {
                (actual_days(start, end), Decimal::from(year_days(start.year())))
            }
            DayCountConvention::Afb => (actual_days(start, end), dec!(365.25)),
        }
    }

    /// exact-decimal fraction of a year covered by [start, end)
    pub fn year_fraction(&self, start: NaiveDate, end: NaiveDate) -> Decimal {
        let (days, basis) = self.day_count(start, end);
        Decimal::from(days) / basis
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayCountConvention::BondBasis => "BONDBASIS",
            DayCountConvention::Eurobond => "EUROBOND",
            DayCountConvention::MoneyMarket => "MONEYMARKET",
            DayCountConvention::Fixed => "FIXED",
            DayCountConvention::Isda => "ISDA",
            DayCountConvention::Afb => "AFB",
        }
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayCountConvention {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BONDBASIS" => Ok(DayCountConvention::BondBasis),
            "EUROBOND" => Ok(DayCountConvention::Eurobond),
            "MONEYMARKET" => Ok(DayCountConvention::MoneyMarket),
            "FIXED" => Ok(DayCountConvention::Fixed),
            "ISDA" => Ok(DayCountConvention::Isda),
            "AFB" => Ok(DayCountConvention::Afb),
            other => Err(LoanError::UnsupportedDayCount {
                convention: other.to_string(),
            }),
        }
    }
}

/// 30/360 U.S.: d1=31 -> 30; d2=31 with d1>=30 -> 30
fn days_30_360_us(start: NaiveDate, end: NaiveDate) -> i64 {
    let (y1, m1, mut d1) = (start.year(), start.month() as i64, start.day() as i64);
    let (y2, m2, mut d2) = (end.year(), end.month() as i64, end.day() as i64);

    if d1 == 31 {
        d1 = 30;
    }
    if d2 == 31 && d1 >= 30 {
        d2 = 30;
    }
    360 * (y2 - y1) as i64 + 30 * (m2 - m1) + (d2 - d1)
}

/// 30E/360: both ends clamp 31 -> 30 unconditionally
fn days_30_360_eu(start: NaiveDate, end: NaiveDate) -> i64 {
    let (y1, m1, mut d1) = (start.year(), start.month() as i64, start.day() as i64);
    let (y2, m2, mut d2) = (end.year(), end.month() as i64, end.day() as i64);

    if d1 == 31 {
        d1 = 30;
    }
    if d2 == 31 {
        d2 = 30;
    }
    360 * (y2 - y1) as i64 + 30 * (m2 - m1) + (d2 - d1)
}

fn actual_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// 366 in leap years, else 365
pub fn year_days(year: i32) -> i64 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
