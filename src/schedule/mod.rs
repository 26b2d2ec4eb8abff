pub mod builder;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rounding};
use crate::product::Fee;
use crate::types::{FeeStatus, ScheduleStatus};

pub use builder::{annuity_payment, annuity_schedule, equal_principal_schedule};

/// One period of a loan's repayment plan.
///
/// Settlement walks a monotone state machine: interest first, then fees in
/// order, then principal. `Paid` and `Removed` are terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i64,
    pub loan_id: i64,
    /// 1-based period number
    pub period: u32,
    pub due_date: DateTime<Utc>,
    pub principal: Money,
    pub interest: Money,
    pub fees: Vec<Fee>,
    pub total_due: Money,
    pub total_paid: Money,
    pub status: ScheduleStatus,
    pub updated_at: DateTime<Utc>,
    pub overdue: bool,
}

impl Schedule {
    /// Build a row; the total due is principal + interest + every fee's
    /// charge against the row's principal. Fees are linked to the row and
    /// marked unpaid.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        loan_id: i64,
        period: u32,
        due_date: DateTime<Utc>,
        principal: Money,
        interest: Money,
        mut fees: Vec<Fee>,
        rounding: Rounding,
        now: DateTime<Utc>,
    ) -> Self {
        let mut total_due = principal + interest;
        for fee in fees.iter_mut() {
            fee.schedule_id = id;
            fee.status = FeeStatus::Unpaid;
            total_due += fee.charge(principal, rounding);
        }
        Self {
            id,
            loan_id,
            period,
            due_date,
            principal,
            interest,
            fees,
            total_due,
            total_paid: Money::ZERO,
            status: ScheduleStatus::Unpaid,
            updated_at: now,
            overdue: false,
        }
    }

    /// amount still owed on this row
    pub fn outstanding(&self) -> Money {
        self.total_due - self.total_paid
    }

    /// Apply funds to this row, returning whatever is left over.
    ///
    /// Funds pass through settled rows untouched. A row whose full
    /// outstanding amount is covered settles in one step; otherwise funds
    /// flow through the interest -> fees -> principal stages and the row
    /// keeps the partial amount.
    pub fn settle(&mut self, funds: Money, rounding: Rounding, now: DateTime<Utc>) -> Money {
        if self.status.is_settled() {
            return funds;
        }
        let outstanding = self.outstanding();
        if funds >= outstanding {
            self.total_paid = self.total_due;
            for fee in self.fees.iter_mut() {
                fee.status = FeeStatus::Paid;
            }
            self.status = ScheduleStatus::Paid;
            self.updated_at = now;
            return funds - outstanding;
        }
        self.apply_partial(funds, rounding, now)
    }

    fn apply_partial(&mut self, funds: Money, rounding: Rounding, now: DateTime<Utc>) -> Money {
        match self.status {
            ScheduleStatus::Unpaid => {
                let due = self.interest - self.total_paid;
                if funds >= due {
                    self.total_paid += due;
                    self.status = ScheduleStatus::InterestPaid;
                    self.updated_at = now;
                    self.apply_partial(funds - due, rounding, now)
                } else {
                    self.total_paid += funds;
                    self.updated_at = now;
                    Money::ZERO
                }
            }
            ScheduleStatus::InterestPaid => {
                let mut funds = funds;
                // the slice of total_paid beyond interest and fully paid
                // fees is a partial payment toward the next unpaid fee
                let mut settled = self.interest;
                for fee in self.fees.iter().filter(|f| f.status == FeeStatus::Paid) {
                    settled += fee.charge(self.principal, rounding);
                }
                let mut partial = self.total_paid - settled;

                let principal = self.principal;
                for fee in self.fees.iter_mut() {
                    if fee.status == FeeStatus::Paid {
                        continue;
                    }
                    let due = fee.charge(principal, rounding) - partial;
                    partial = Money::ZERO;
                    if funds >= due {
                        fee.status = FeeStatus::Paid;
                        self.total_paid += due;
                        funds -= due;
                    } else {
                        self.total_paid += funds;
                        self.updated_at = now;
                        return Money::ZERO;
                    }
                }
                self.status = ScheduleStatus::FeePaid;
                self.updated_at = now;
                self.apply_partial(funds, rounding, now)
            }
            ScheduleStatus::FeePaid => {
                let due = self.outstanding();
                if funds >= due {
                    self.total_paid = self.total_due;
                    self.status = ScheduleStatus::Paid;
                    self.updated_at = now;
                    funds - due
                } else {
                    self.total_paid += funds;
                    self.updated_at = now;
                    Money::ZERO
                }
            }
            // settled rows and pending rows do not absorb funds
            _ => funds,
        }
    }
}
