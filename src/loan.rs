use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::overdue::OverdueRecord;
use crate::product::Product;
use crate::rates::annual_to_period_rate;
use crate::repayment::Repayment;
use crate::schedule::Schedule;
use crate::types::{LoanStatus, ScheduleStatus};

/// A drawn loan against a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: i64,
    pub user_id: i64,
    pub principal: Money,
    pub total_periods: u32,
    pub product: Arc<Product>,
    pub created_at: DateTime<Utc>,
    pub status: LoanStatus,
}

impl Loan {
    pub fn new(
        user_id: i64,
        principal: Money,
        total_periods: u32,
        product: Arc<Product>,
        config: &EngineConfig,
    ) -> Result<Self> {
        if !principal.is_positive() {
            return Err(LoanError::InvalidLoanParams {
                message: format!("principal must be positive, got {principal}"),
            });
        }
        if total_periods == 0 {
            return Err(LoanError::InvalidLoanParams {
                message: "total periods must be positive".to_string(),
            });
        }
        Ok(Self {
            id: config.ids.next_id(),
            user_id,
            principal,
            total_periods,
            product,
            created_at: config.time.now(),
            status: LoanStatus::Pending,
        })
    }

    pub fn into_extra(self) -> LoanExtra {
        LoanExtra {
            loan: self,
            schedules: Vec::new(),
            repayments: Vec::new(),
            overdue_records: Vec::new(),
        }
    }
}

/// Aggregate root: a loan with its schedule plan, repayment history and
/// overdue ledger. The unit of consistency for every core operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanExtra {
    pub loan: Loan,
    pub schedules: Vec<Schedule>,
    pub repayments: Vec<Repayment>,
    pub overdue_records: Vec<OverdueRecord>,
}

impl LoanExtra {
    pub fn id(&self) -> i64 {
        self.loan.id
    }

    pub fn product(&self) -> &Arc<Product> {
        &self.loan.product
    }

    pub fn set_schedules(&mut self, schedules: Vec<Schedule>) {
        self.schedules = schedules;
    }

    pub fn add_schedule(&mut self, schedule: Schedule) {
        self.schedules.push(schedule);
    }

    pub fn add_repayment(&mut self, repayment: Repayment) {
        self.repayments.push(repayment);
    }

    pub fn add_overdue_record(&mut self, record: OverdueRecord) {
        self.overdue_records.push(record);
    }

    pub fn has_overdue(&self) -> bool {
        !self.overdue_records.is_empty()
    }

    /// remaining contract principal: unpaid rows only
    pub fn outstanding_principal(&self) -> Money {
        self.schedules
            .iter()
            .filter(|s| s.status == ScheduleStatus::Unpaid)
            .map(|s| s.principal)
            .fold(Money::ZERO, |acc, p| acc + p)
    }

    /// number of fully unpaid periods
    pub fn outstanding_periods(&self) -> u32 {
        self.schedules
            .iter()
            .filter(|s| s.status == ScheduleStatus::Unpaid)
            .count() as u32
    }

    /// index of the first row that is neither paid nor removed
    pub fn next_unpaid_period(&self) -> Option<usize> {
        self.schedules.iter().position(|s| !s.status.is_settled())
    }

    pub fn is_fully_paid(&self) -> bool {
        self.next_unpaid_period().is_none()
    }

    /// the product's annual rate converted to one period, as of now
    pub fn period_rate(&self, config: &EngineConfig) -> Rate {
        let product = self.product();
        annual_to_period_rate(
            product.interest,
            product.period_type,
            product.day_count,
            config.time.now(),
        )
    }
}
