use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::loan::LoanExtra;
use crate::schedule::builder::{annuity_schedule, equal_principal_schedule, instantiate_fees};
use crate::schedule::Schedule;
use crate::types::{PrepayStrategy, RepayStyle, ScheduleStatus};

/// Spend prepayment funds against the remaining plan.
///
/// A payment covering `outstanding * (1 + default_rate)` retires the loan
/// outright; otherwise the requested strategy rewrites the schedule. The
/// default-rate premium is charged on the way through but the payoff change
/// returned to the payer is `funds - outstanding`.
pub fn prepay_core(
    loan: &mut LoanExtra,
    funds: Money,
    strategy: PrepayStrategy,
    config: &EngineConfig,
) -> Result<Money> {
    let outstanding = loan.outstanding_principal();
    let payoff_factor = Decimal::ONE + loan.product().default_rate.as_decimal();

    if funds.as_decimal() >= outstanding.as_decimal() * payoff_factor {
        let now = config.time.now();
        for row in loan.schedules.iter_mut() {
            if row.status != ScheduleStatus::Removed {
                row.status = ScheduleStatus::Paid;
                row.updated_at = now;
            }
        }
        return Ok(funds - outstanding);
    }

    match strategy {
        PrepayStrategy::TermReduction => term_reduction(loan, funds, config),
        _ => payment_reduction(loan, funds, config),
    }
}

/// Shorten the tail: clear whole rows from the last period backwards at
/// `principal * (1 + default_rate)` apiece; a row the funds cannot fully
/// cover is replaced by a reduced-principal row and the walk stops.
fn term_reduction(loan: &mut LoanExtra, funds: Money, config: &EngineConfig) -> Result<Money> {
    let now = config.time.now();
    let factor = Decimal::ONE + loan.product().default_rate.as_decimal();
    let period_rate = loan.period_rate(config);

    let mut remaining = funds;
    for i in (0..loan.schedules.len()).rev() {
        if loan.schedules[i].status.is_settled() {
            continue;
        }
        let cost = loan.schedules[i].principal.as_decimal() * factor;
        if remaining.as_decimal() >= cost {
            remaining = Money::with_rounding(remaining.as_decimal() - cost, config.rounding);
            let row = &mut loan.schedules[i];
            row.status = ScheduleStatus::Paid;
            row.updated_at = now;
        } else {
            // the whole remainder buys back remaining/factor of principal
            let bought_back = remaining.as_decimal() / factor;
            let row = &loan.schedules[i];
            let new_principal = Money::with_rounding(
                row.principal.as_decimal() - bought_back,
                config.rounding,
            );
            let new_interest = Money::with_rounding(
                new_principal.as_decimal() * period_rate.as_decimal(),
                config.rounding,
            );
            let replacement = Schedule::new(
                config.ids.next_id(),
                row.loan_id,
                row.period,
                row.due_date,
                new_principal,
                new_interest,
                instantiate_fees(&row.fees, config.ids.as_ref()),
                config.rounding,
                now,
            );
            let row = &mut loan.schedules[i];
            row.status = ScheduleStatus::Removed;
            row.updated_at = now;
            loan.add_schedule(replacement);
            remaining = Money::ZERO;
            break;
        }
    }
    Ok(remaining)
}

/// Keep the period count: regenerate the plan over the bought-down
/// principal, retire every open row, append the new ones.
fn payment_reduction(loan: &mut LoanExtra, funds: Money, config: &EngineConfig) -> Result<Money> {
    let now = config.time.now();
    let new_principal = Money::with_rounding(
        loan.outstanding_principal().as_decimal() - funds.as_decimal(),
        config.rounding,
    );
    let periods = loan.outstanding_periods();
    let product = loan.product().clone();

    let replacements = match product.repay_style {
        RepayStyle::EqualInstallment => {
            annuity_schedule(loan.id(), new_principal, periods, &product, config)?
        }
        RepayStyle::EqualPrincipal => {
            equal_principal_schedule(loan.id(), new_principal, periods, &product, config)?
        }
    };

    for row in loan.schedules.iter_mut() {
        if row.status != ScheduleStatus::Paid {
            row.status = ScheduleStatus::Removed;
            row.updated_at = now;
        }
    }
    for row in replacements {
        loan.add_schedule(row);
    }
    Ok(Money::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{DayCountConvention, RollConvention};
    use crate::config::EngineConfig;
    use crate::decimal::{Rate, Rounding};
    use crate::loan::Loan;
    use crate::product::Product;
    use crate::repayment::pre_repay;
    use crate::types::{PeriodType, PrepayStrategy};
    use chrono::{TimeZone, Utc};
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use std::sync::Arc;

    fn test_config() -> EngineConfig {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        EngineConfig::offline().with_time(SafeTimeProvider::new(TimeSource::Test(start)))
    }

    fn test_product(style: RepayStyle) -> Arc<Product> {
        Arc::new(Product::new(
            1,
            "test",
            Rate::from_percentage(12),
            Money::from_major(100),
            Money::from_major(100_000),
            1,
            60,
            style,
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

    fn flat_loan(config: &EngineConfig, style: RepayStyle, rows: u32) -> LoanExtra {
        let principal = Money::from_major(1_000 * rows as i64);
        let loan = Loan::new(7, principal, rows, test_product(style), config).unwrap();
        let mut extra = loan.into_extra();
        let schedules = (1..=rows)
            .map(|period| {
                Schedule::new(
                    100 + period as i64,
                    extra.id(),
                    period,
                    config.time.now(),
                    Money::from_major(1_000),
                    Money::from_major(10),
                    vec![],
                    Rounding::default(),
                    config.time.now(),
                )
            })
            .collect();
        extra.set_schedules(schedules);
        extra
    }

    #[test]
    fn test_full_payoff_marks_everything_paid() {
        let config = test_config();
        let mut extra = flat_loan(&config, RepayStyle::EqualInstallment, 10);
        extra.schedules[0].status = ScheduleStatus::Removed;

        // outstanding 9000, payoff threshold 9000 * 1.02 = 9180
        let remaining = pre_repay(
            &mut extra,
            Money::from_major(9_200),
            PrepayStrategy::TermReduction,
            &config,
        )
        .unwrap();

        // change is funds minus outstanding, premium retained
        assert_eq!(remaining, Money::from_major(200));
        for row in &extra.schedules[1..] {
            assert_eq!(row.status, ScheduleStatus::Paid);
        }
        // removed rows stay removed
        assert_eq!(extra.schedules[0].status, ScheduleStatus::Removed);
        assert!(extra.is_fully_paid());
    }

    #[test]
    fn test_term_reduction_clears_tail_rows() {
        let config = test_config();
        let mut extra = flat_loan(&config, RepayStyle::EqualInstallment, 10);

        // each row costs 1000 * 1.02 = 1020: 5000 clears rows 10..7 and
        // leaves 920 to buy back part of row 6
        let remaining = pre_repay(
            &mut extra,
            Money::from_major(5_000),
            PrepayStrategy::TermReduction,
            &config,
        )
        .unwrap();
        assert_eq!(remaining, Money::ZERO);

        for row in &extra.schedules[6..10] {
            assert_eq!(row.status, ScheduleStatus::Paid);
        }
        assert_eq!(extra.schedules[5].status, ScheduleStatus::Removed);

        // replacement row appended after the original ten
        let replacement = &extra.schedules[10];
        assert_eq!(replacement.period, 6);
        assert_eq!(replacement.due_date, extra.schedules[5].due_date);
        // 920 / 1.02 = 901.96 of principal bought back
        assert_eq!(replacement.principal, Money::from_str_exact("98.04").unwrap());
        assert_eq!(replacement.status, ScheduleStatus::Unpaid);

        // interest recomputed at the period rate, not the annual rate
        let period_rate = extra.period_rate(&config);
        assert_eq!(
            replacement.interest,
            Money::with_rounding(
                replacement.principal.as_decimal() * period_rate.as_decimal(),
                Rounding::default(),
            )
        );

        // untouched head of the plan
        for row in &extra.schedules[..5] {
            assert_eq!(row.status, ScheduleStatus::Unpaid);
        }
    }

    #[test]
    fn test_term_reduction_exact_rows() {
        let config = test_config();
        let mut extra = flat_loan(&config, RepayStyle::EqualInstallment, 5);

        // exactly two rows at 1020 each
        let remaining = pre_repay(
            &mut extra,
            Money::from_major(2_040),
            PrepayStrategy::TermReduction,
            &config,
        )
        .unwrap();

        assert_eq!(remaining, Money::ZERO);
        assert_eq!(extra.schedules.len(), 5);
        assert_eq!(extra.schedules[4].status, ScheduleStatus::Paid);
        assert_eq!(extra.schedules[3].status, ScheduleStatus::Paid);
        assert_eq!(extra.schedules[2].status, ScheduleStatus::Unpaid);
    }

    #[test]
    fn test_payment_reduction_regenerates_plan() {
        let config = test_config();
        let mut extra = flat_loan(&config, RepayStyle::EqualInstallment, 8);

        let remaining = pre_repay(
            &mut extra,
            Money::from_major(2_000),
            PrepayStrategy::PaymentReduction,
            &config,
        )
        .unwrap();
        assert_eq!(remaining, Money::ZERO);

        // old rows removed, eight fresh rows appended
        assert_eq!(extra.schedules.len(), 16);
        for row in &extra.schedules[..8] {
            assert_eq!(row.status, ScheduleStatus::Removed);
        }
        let new_rows = &extra.schedules[8..];
        assert_eq!(new_rows.len(), 8);

        // regenerated principal sums to outstanding minus the prepayment
        let total: Money = new_rows
            .iter()
            .map(|s| s.principal)
            .fold(Money::ZERO, |acc, p| acc + p);
        assert_eq!(total, Money::from_major(6_000));

        // annuity shape: equal totals across the new plan
        let first = new_rows[0].total_due;
        for row in new_rows {
            assert!((row.total_due - first).abs() <= Money::from_str_exact("0.02").unwrap());
        }
    }

    #[test]
    fn test_payment_reduction_equal_principal() {
        let config = test_config();
        let mut extra = flat_loan(&config, RepayStyle::EqualPrincipal, 4);

        pre_repay(
            &mut extra,
            Money::from_major(1_000),
            PrepayStrategy::PaymentReduction,
            &config,
        )
        .unwrap();

        let new_rows = &extra.schedules[4..];
        assert_eq!(new_rows.len(), 4);
        for row in new_rows {
            assert_eq!(row.principal, Money::from_major(750));
        }
    }

    #[test]
    fn test_paid_rows_survive_payment_reduction() {
        let config = test_config();
        let mut extra = flat_loan(&config, RepayStyle::EqualInstallment, 4);
        extra.schedules[0].status = ScheduleStatus::Paid;

        pre_repay(
            &mut extra,
            Money::from_major(500),
            PrepayStrategy::PaymentReduction,
            &config,
        )
        .unwrap();

        assert_eq!(extra.schedules[0].status, ScheduleStatus::Paid);
        for row in &extra.schedules[1..4] {
            assert_eq!(row.status, ScheduleStatus::Removed);
        }
        // three open periods regenerated over 3000 - 500
        let new_rows = &extra.schedules[4..];
        assert_eq!(new_rows.len(), 3);
        let total: Money = new_rows
            .iter()
            .map(|s| s.principal)
            .fold(Money::ZERO, |acc, p| acc + p);
        assert_eq!(total, Money::from_major(2_500));
    }
}
