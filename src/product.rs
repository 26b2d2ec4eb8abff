use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calendar::{DayCountConvention, RollConvention};
use crate::decimal::{Money, Rate, Rounding};
use crate::types::{FeeStatus, PeriodType, RepayStyle};

/// Per-period charge attached to a product as a template and to schedule
/// rows as live instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub id: i64,
    pub schedule_id: i64,
    pub name: String,
    /// proportion of the row's principal (may be zero)
    pub rate: Rate,
    /// fixed amount (may be zero)
    pub fix: Money,
    pub status: FeeStatus,
}

impl Fee {
    /// product-level template, instantiated per schedule row at build time
    pub fn template(name: impl Into<String>, rate: Rate, fix: Money) -> Self {
        Self {
            id: 0,
            schedule_id: 0,
            name: name.into(),
            rate,
            fix,
            status: FeeStatus::Template,
        }
    }

    /// effective charge against the row's principal
    pub fn charge(&self, principal: Money, rounding: Rounding) -> Money {
        Money::with_rounding(
            self.fix.as_decimal() + principal.as_decimal() * self.rate.as_decimal(),
            rounding,
        )
    }
}

/// Loan product definition. Immutable input to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// annual interest rate
    pub interest: Rate,
    pub min_principal: Money,
    pub max_principal: Money,
    pub min_periods: u32,
    pub max_periods: u32,
    pub repay_style: RepayStyle,
    pub roll_convention: RollConvention,
    pub day_count: DayCountConvention,
    pub period_type: PeriodType,
    /// leading interest-only periods
    pub grace_term: u32,
    /// days past due still considered on-time
    pub grace_day: u32,
    /// annual penalty rate on overdue principal
    pub penalty: Rate,
    /// prepayment cost multiplier: payoff charges principal * (1 + default_rate)
    pub default_rate: Rate,
    pub fees: Vec<Fee>,
    pub info: String,
}

impl Product {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        name: impl Into<String>,
        interest: Rate,
        min_principal: Money,
        max_principal: Money,
        min_periods: u32,
        max_periods: u32,
        repay_style: RepayStyle,
        roll_convention: RollConvention,
        day_count: DayCountConvention,
        period_type: PeriodType,
        grace_term: u32,
        grace_day: u32,
        penalty: Rate,
        default_rate: Rate,
        fees: Vec<Fee>,
        info: impl Into<String>,
    ) -> Self {
        let fees = fees
            .into_iter()
            .map(|mut fee| {
                fee.status = FeeStatus::Template;
                fee
            })
            .collect();
        Self {
            id,
            name: name.into(),
            interest,
            min_principal,
            max_principal,
            min_periods,
            max_periods,
            repay_style,
            roll_convention,
            day_count,
            period_type,
            grace_term,
            grace_day,
            penalty,
            default_rate,
            fees,
            info: info.into(),
        }
    }

    /// monthly consumer installment loan with typical terms
    pub fn personal_loan(id: i64, name: impl Into<String>, interest: Rate) -> Self {
        Self::new(
            id,
            name,
            interest,
            Money::from_major(1_000),
            Money::from_major(200_000),
            3,
            60,
            RepayStyle::EqualInstallment,
            RollConvention::Following,
            DayCountConvention::Fixed,
            PeriodType::Month,
            0,
            3,
            Rate::from_decimal(interest.as_decimal() * dec!(1.5)),
            Rate::from_percentage(2),
            Vec::new(),
            "",
        )
    }
}
