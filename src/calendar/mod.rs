pub mod daycount;
pub mod holiday;
pub mod roll;

pub use daycount::{year_days, DayCountConvention};
pub use holiday::{fetch_china_holidays, ChinaHolidays, HolidayProvider};
pub use roll::{advance_period, apply_roll, next_period_date, RollConvention};
