use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use hourglass_rs::{SafeTimeProvider, TimeSource};

use crate::calendar::{ChinaHolidays, HolidayProvider};
use crate::decimal::Rounding;

/// source of unique identifiers for loans, schedules, fees and repayments
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> i64;
}

/// process-local monotonic id source
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicI64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: i64) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> i64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// Engine-wide collaborators, fixed at construction.
///
/// Immutable once the engine starts; every operation reads the clock,
/// rounding strategy, id source and holiday calendar from here rather than
/// from process globals.
pub struct EngineConfig {
    pub time: SafeTimeProvider,
    pub ids: Arc<dyn IdGenerator>,
    pub rounding: Rounding,
    pub holidays: Arc<dyn HolidayProvider>,
}

impl EngineConfig {
    /// Production defaults: system clock, sequential ids, banker's
    /// rounding, and the fetched holiday calendar (weekends only when the
    /// fetch fails).
    pub fn new() -> Self {
        Self {
            time: SafeTimeProvider::new(TimeSource::System),
            ids: Arc::new(SequentialIds::new()),
            rounding: Rounding::default(),
            holidays: Arc::new(ChinaHolidays::bootstrap()),
        }
    }

    /// defaults without the network fetch, for offline use and tests
    pub fn offline() -> Self {
        Self {
            time: SafeTimeProvider::new(TimeSource::System),
            ids: Arc::new(SequentialIds::new()),
            rounding: Rounding::default(),
            holidays: Arc::new(ChinaHolidays::empty()),
        }
    }

    pub fn with_time(mut self, time: SafeTimeProvider) -> Self {
        self.time = time;
        self
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_holidays(mut self, holidays: Arc<dyn HolidayProvider>) -> Self {
        self.holidays = holidays;
        self
    }
}
