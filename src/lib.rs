pub mod calendar;
pub mod config;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod loan;
pub mod overdue;
pub mod product;
pub mod rates;
pub mod repayment;
pub mod schedule;
pub mod types;

// re-export key types
pub use calendar::{
    fetch_china_holidays, ChinaHolidays, DayCountConvention, HolidayProvider, RollConvention,
};
pub use config::{EngineConfig, IdGenerator, SequentialIds};
pub use decimal::{Money, Rate, Rounding};
pub use engine::{BuildFn, Engine, LoanContext, Plugin, RepayFn};
pub use errors::{LoanError, Result};
pub use loan::{Loan, LoanExtra};
pub use overdue::OverdueRecord;
pub use product::{Fee, Product};
pub use rates::annual_to_period_rate;
pub use repayment::{normal_repay, pre_repay, RepayInfo, Repayment};
pub use schedule::{annuity_payment, annuity_schedule, equal_principal_schedule, Schedule};
pub use types::{
    FeeStatus, LoanStatus, OverdueStatus, PeriodType, PrepayStrategy, RepayStatus, RepayStyle,
    ScheduleStatus,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
