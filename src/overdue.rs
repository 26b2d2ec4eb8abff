use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::OverdueStatus;

/// Penalty accrual for one missed period.
///
/// Accrual itself (bumping `days_over` and `penalty_accrued` at the penalty
/// rate on outstanding principal) is driven by an external daily batch; the
/// core only models the record and its settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverdueRecord {
    pub id: i64,
    pub loan_id: i64,
    /// 1-based period number of the missed schedule row
    pub period: u32,
    pub start_date: DateTime<Utc>,
    pub days_over: u32,
    pub penalty_accrued: Money,
    pub penalty_paid: Money,
    /// annual penalty rate the batch accrues at
    pub rate: Rate,
    pub updated_at: DateTime<Utc>,
    pub status: OverdueStatus,
}

impl OverdueRecord {
    pub fn new(
        id: i64,
        loan_id: i64,
        period: u32,
        rate: Rate,
        penalty_accrued: Money,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            loan_id,
            period,
            start_date: now,
            days_over: 0,
            penalty_accrued,
            penalty_paid: Money::ZERO,
            rate,
            updated_at: now,
            status: OverdueStatus::Accruing,
        }
    }

    pub fn unpaid_penalty(&self) -> Money {
        self.penalty_accrued - self.penalty_paid
    }

    /// nothing left to collect
    pub fn is_cleared(&self) -> bool {
        matches!(self.status, OverdueStatus::Cleared | OverdueStatus::Waived)
    }

    /// Apply funds against the unpaid penalty; returns the surplus.
    ///
    /// A covering amount clears the record; anything less is absorbed in
    /// full and leaves the record partially settled.
    pub fn try_to_pay(&mut self, amount: Money, now: DateTime<Utc>) -> Money {
        if self.is_cleared() {
            return amount;
        }
        let unpaid = self.unpaid_penalty();
        if amount >= unpaid {
            self.penalty_paid = self.penalty_accrued;
            self.status = OverdueStatus::Cleared;
            self.updated_at = now;
            amount - unpaid
        } else {
            self.penalty_paid += amount;
            self.status = OverdueStatus::Partial;
            self.updated_at = now;
            Money::ZERO
        }
    }
}
