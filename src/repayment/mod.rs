pub mod prepayment;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::loan::LoanExtra;
use crate::schedule::Schedule;
use crate::types::{PrepayStrategy, RepayStatus};

/// An incoming repayment request: the paid amount plus how any surplus
/// beyond due periods should rewrite the plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RepayInfo {
    pub amount: Money,
    pub strategy: PrepayStrategy,
}

/// One settled repayment event against a loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repayment {
    pub id: i64,
    pub loan_id: i64,
    /// when the funds arrived, not when the user initiated
    pub repaid_at: DateTime<Utc>,
    /// amount actually applied across penalty, fees, interest and principal
    pub total_amount: Money,
    pub refund_amount: Money,
    pub status: RepayStatus,
}

impl Repayment {
    pub fn new(id: i64, loan_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            loan_id,
            repaid_at: now,
            total_amount: Money::ZERO,
            refund_amount: Money::ZERO,
            status: RepayStatus::Processing,
        }
    }

    pub fn add_amount(&mut self, amount: Money) {
        self.total_amount += amount;
    }
}

/// Settle due periods with an incoming amount; no prepayment.
///
/// Waterfall order: penalty interest across the overdue ledger, then
/// overdue schedule rows in ascending period order, then the current row.
/// Returns the surplus. On error the aggregate keeps every mutation made
/// up to the failure point.
pub fn normal_repay(loan: &mut LoanExtra, amount: Money, config: &EngineConfig) -> Result<Money> {
    if loan.schedules.is_empty() {
        return Err(LoanError::NoScheduleFound);
    }
    let now = config.time.now();
    let mut repayment = Repayment::new(config.ids.next_id(), loan.id(), now);
    let (first_overdue, current) = locate_window(&loan.schedules);

    let mut remaining = amount;
    remaining = settle_penalties(loan, remaining, now)?;

    let start = first_overdue.unwrap_or(current);
    for i in start..=current {
        let row = &mut loan.schedules[i];
        remaining = row.settle(remaining, config.rounding, now);
        if remaining.is_zero() && !row.status.is_settled() {
            return Err(LoanError::InsufficientForSchedule { period: row.period });
        }
    }

    tracing::debug!(
        loan_id = loan.id(),
        amount = %amount,
        remaining = %remaining,
        "repayment applied"
    );
    repayment.add_amount(amount - remaining);
    loan.add_repayment(repayment);
    Ok(remaining)
}

/// Settle everything due, then spend the surplus as a prepayment.
///
/// Like [`normal_repay`] but the current period is excluded from the due
/// window; whatever remains flows into the prepayment core under the
/// requested strategy.
pub fn pre_repay(
    loan: &mut LoanExtra,
    amount: Money,
    strategy: PrepayStrategy,
    config: &EngineConfig,
) -> Result<Money> {
    if loan.schedules.is_empty() {
        return Err(LoanError::NoScheduleFound);
    }
    let now = config.time.now();
    let mut repayment = Repayment::new(config.ids.next_id(), loan.id(), now);

    let mut remaining = amount;
    remaining = settle_penalties(loan, remaining, now)?;

    let (first_overdue, current) = locate_window(&loan.schedules);
    let start = first_overdue.unwrap_or(current);
    for i in start..current {
        let row = &mut loan.schedules[i];
        remaining = row.settle(remaining, config.rounding, now);
        if remaining.is_zero() && !row.status.is_settled() {
            return Err(LoanError::InsufficientForSchedule { period: row.period });
        }
    }

    if remaining.is_positive() {
        remaining = prepayment::prepay_core(loan, remaining, strategy, config)?;
    }

    tracing::debug!(
        loan_id = loan.id(),
        amount = %amount,
        remaining = %remaining,
        ?strategy,
        "prepayment applied"
    );
    repayment.add_amount(amount - remaining);
    loan.add_repayment(repayment);
    Ok(remaining)
}

/// First overdue row and the current row, both skipping settled rows.
/// The current index defaults to the head when every open row is overdue.
fn locate_window(schedules: &[Schedule]) -> (Option<usize>, usize) {
    let mut first_overdue = None;
    let mut current = 0;
    for (i, s) in schedules.iter().enumerate() {
        if s.status.is_settled() {
            continue;
        }
        if s.overdue && first_overdue.is_none() {
            first_overdue = Some(i);
        }
        if !s.overdue {
            current = i;
            break;
        }
    }
    (first_overdue, current)
}

/// Pay down the overdue ledger in order; funds must outlast the penalty.
fn settle_penalties(loan: &mut LoanExtra, amount: Money, now: DateTime<Utc>) -> Result<Money> {
    let mut remaining = amount;
    if loan.has_overdue() {
        for record in loan.overdue_records.iter_mut() {
            remaining = record.try_to_pay(remaining, now);
            if remaining.is_zero() && !record.is_cleared() {
                return Err(LoanError::InsufficientForPenalty);
            }
        }
    }
    Ok(remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::decimal::{Rate, Rounding};
    use crate::loan::Loan;
    use crate::overdue::OverdueRecord;
    use crate::product::Product;
    use crate::types::{OverdueStatus, RepayStyle, ScheduleStatus};
    use crate::calendar::{DayCountConvention, RollConvention};
    use crate::types::PeriodType;
    use chrono::TimeZone;
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use std::sync::Arc;

    fn test_config() -> EngineConfig {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        EngineConfig::offline().with_time(SafeTimeProvider::new(TimeSource::Test(start)))
    }

    fn test_product() -> Arc<Product> {
        Arc::new(Product::new(
            1,
            "test",
            Rate::from_percentage(12),
            Money::from_major(100),
            Money::from_major(100_000),
            1,
            60,
            RepayStyle::EqualInstallment,
            RollConvention::Unadjusted,
            DayCountConvention::Fixed,
            PeriodType::Month,
            0,
            3,
            Rate::from_percentage(18),
            Rate::from_percentage(2),
            vec![],
            "",
        ))
    }

    fn row(config: &EngineConfig, id: i64, period: u32, principal: &str, interest: &str) -> Schedule {
        Schedule::new(
            id,
            1,
            period,
            config.time.now(),
            Money::from_str_exact(principal).unwrap(),
            Money::from_str_exact(interest).unwrap(),
            vec![],
            Rounding::default(),
            config.time.now(),
        )
    }

    fn loan_with_overdue(config: &EngineConfig) -> LoanExtra {
        let loan = Loan::new(7, Money::from_major(1_000), 2, test_product(), config).unwrap();
        let mut extra = loan.into_extra();
        let mut overdue_row = row(config, 101, 1, "500.00", "22.30");
        overdue_row.overdue = true;
        let current_row = row(config, 102, 2, "500.00", "22.30");
        extra.set_schedules(vec![overdue_row, current_row]);
        extra.add_overdue_record(OverdueRecord::new(
            201,
            extra.id(),
            1,
            Rate::from_percentage(18),
            Money::from_major(15),
            config.time.now(),
        ));
        extra
    }

    #[test]
    fn test_no_schedule_found() {
        let config = test_config();
        let loan = Loan::new(7, Money::from_major(1_000), 2, test_product(), &config).unwrap();
        let mut extra = loan.into_extra();

        assert!(matches!(
            normal_repay(&mut extra, Money::from_major(100), &config),
            Err(LoanError::NoScheduleFound)
        ));
    }

    #[test]
    fn test_penalty_cleared_before_schedules() {
        let config = test_config();
        let mut extra = loan_with_overdue(&config);

        // 15 penalty + 522.30 overdue row + 522.30 current row = 1059.60
        let remaining = normal_repay(&mut extra, Money::from_major(1_100), &config).unwrap();

        assert_eq!(remaining, Money::from_str_exact("40.40").unwrap());
        assert_eq!(extra.overdue_records[0].status, OverdueStatus::Cleared);
        assert_eq!(extra.schedules[0].status, ScheduleStatus::Paid);
        assert_eq!(extra.schedules[1].status, ScheduleStatus::Paid);

        // applied amount accounting: incoming minus returned surplus
        let repayment = &extra.repayments[0];
        assert_eq!(repayment.total_amount, Money::from_str_exact("1059.60").unwrap());
        assert_eq!(repayment.status, RepayStatus::Processing);
    }

    #[test]
    fn test_insufficient_for_penalty() {
        let config = test_config();
        let mut extra = loan_with_overdue(&config);

        let err = normal_repay(&mut extra, Money::from_major(10), &config).unwrap_err();
        assert!(matches!(err, LoanError::InsufficientForPenalty));

        // partial settlement is observable on the ledger
        assert_eq!(extra.overdue_records[0].status, OverdueStatus::Partial);
        assert_eq!(extra.overdue_records[0].penalty_paid, Money::from_major(10));
        // no repayment event recorded for the failed attempt
        assert!(extra.repayments.is_empty());
    }

    #[test]
    fn test_insufficient_for_schedule_keeps_partial() {
        let config = test_config();
        let mut extra = loan_with_overdue(&config);

        // 500 covers the 15 penalty, leaves 485 against the 522.30 overdue row
        let err = normal_repay(&mut extra, Money::from_major(500), &config).unwrap_err();
        assert!(matches!(
            err,
            LoanError::InsufficientForSchedule { period: 1 }
        ));

        assert_eq!(extra.overdue_records[0].status, OverdueStatus::Cleared);
        let overdue_row = &extra.schedules[0];
        assert_eq!(overdue_row.total_paid, Money::from_major(485));
        // interest covered, principal still open
        assert_eq!(overdue_row.status, ScheduleStatus::FeePaid);
        // current row untouched
        assert_eq!(extra.schedules[1].total_paid, Money::ZERO);
    }

    #[test]
    fn test_repay_without_overdue_targets_current() {
        let config = test_config();
        let loan = Loan::new(7, Money::from_major(1_000), 2, test_product(), &config).unwrap();
        let mut extra = loan.into_extra();
        extra.set_schedules(vec![
            {
                let mut r = row(&config, 101, 1, "500.00", "22.30");
                r.status = ScheduleStatus::Paid;
                r
            },
            row(&config, 102, 2, "500.00", "22.30"),
        ]);

        let remaining = normal_repay(&mut extra, Money::from_str_exact("522.30").unwrap(), &config).unwrap();
        assert_eq!(remaining, Money::ZERO);
        assert_eq!(extra.schedules[1].status, ScheduleStatus::Paid);
        assert_eq!(
            extra.repayments[0].total_amount,
            Money::from_str_exact("522.30").unwrap()
        );
    }

    #[test]
    fn test_window_skips_settled_rows() {
        let config = test_config();
        let mut first = row(&config, 1, 1, "100.00", "1.00");
        first.status = ScheduleStatus::Removed;
        first.overdue = true;
        let mut second = row(&config, 2, 2, "100.00", "1.00");
        second.overdue = true;
        let third = row(&config, 3, 3, "100.00", "1.00");

        let schedules = vec![first, second, third];
        let (first_overdue, current) = locate_window(&schedules);
        assert_eq!(first_overdue, Some(1));
        assert_eq!(current, 2);
    }

    #[test]
    fn test_exact_penalty_then_zero_for_schedule() {
        let config = test_config();
        let mut extra = loan_with_overdue(&config);

        // exactly the penalty: cleared, but nothing left for the overdue row
        let err = normal_repay(&mut extra, Money::from_major(15), &config).unwrap_err();
        assert!(matches!(err, LoanError::InsufficientForSchedule { .. }));
        assert_eq!(extra.overdue_records[0].status, OverdueStatus::Cleared);
    }
}
