use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Deserialize;

use crate::errors::{LoanError, Result};

const HOLIDAY_URL: &str = "https://timor.tech/api/holiday/year/";

/// oracle deciding whether a calendar date is a non-business day
pub trait HolidayProvider: Send + Sync {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

/// Default provider: weekends plus the Chinese national holiday calendar.
///
/// The map carries `true` for a declared day off; weekends count regardless
/// of the map contents.
#[derive(Debug, Clone, Default)]
pub struct ChinaHolidays {
    days_off: HashMap<NaiveDate, bool>,
}

impl ChinaHolidays {
    pub fn new(days_off: HashMap<NaiveDate, bool>) -> Self {
        Self { days_off }
    }

    /// weekend-only calendar with no declared holidays
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fetch the current-year calendar, tolerating failure with an empty
    /// map so that schedule generation still works offline.
    pub fn bootstrap() -> Self {
        match fetch_china_holidays() {
            Ok(days_off) => Self::new(days_off),
            Err(err) => {
                tracing::warn!(error = %err, "holiday calendar unavailable, using weekends only");
                Self::empty()
            }
        }
    }
}

impl HolidayProvider for ChinaHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        if self.days_off.get(&date).copied().unwrap_or(false) {
            return true;
        }
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

#[derive(Debug, Deserialize)]
struct TimorResponse {
    #[serde(default)]
    holiday: HashMap<String, TimorDay>,
}

/// one calendar entry; `holiday` is false for compensatory working days
#[derive(Debug, Deserialize)]
struct TimorDay {
    date: String,
    holiday: bool,
}

/// Fetch the current-year Chinese holiday calendar from timor.tech.
///
/// Only the date and the day-off flag are consumed; entries with
/// unparseable dates are skipped.
pub fn fetch_china_holidays() -> Result<HashMap<NaiveDate, bool>> {
    let response: TimorResponse = ureq::get(HOLIDAY_URL)
        .call()
        .map_err(|e| LoanError::HolidayFetch {
            message: e.to_string(),
        })?
        .into_json()
        .map_err(|e| LoanError::HolidayFetch {
            message: e.to_string(),
        })?;
    Ok(holiday_map(response))
}

fn holiday_map(response: TimorResponse) -> HashMap<NaiveDate, bool> {
    response
        .holiday
        .into_values()
        .filter_map(|day| {
            let date = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d").ok()?;
            Some((date, day.holiday))
        })
        .collect()
}
