use rust_decimal::Decimal;

use crate::calendar::next_period_date;
use crate::config::{EngineConfig, IdGenerator};
use crate::decimal::Money;
use crate::errors::Result;
use crate::product::{Fee, Product};
use crate::rates::annual_to_period_rate;
use crate::schedule::Schedule;

/// Annuity payment A = P * r * (1+r)^n / ((1+r)^n - 1).
///
/// Zero periods return the principal, zero rate degrades to straight-line.
pub fn annuity_payment(principal: Decimal, periods: u32, rate: Decimal) -> Decimal {
    if periods == 0 {
        return principal;
    }
    if rate.is_zero() {
        return principal / Decimal::from(periods);
    }
    let base = Decimal::ONE + rate;
    let mut compound = Decimal::ONE;
    for _ in 0..periods {
        compound *= base;
    }
    principal * rate * compound / (compound - Decimal::ONE)
}

/// Equal-installment plan: constant total payment over the amortizing tail,
/// interest-only rows through the grace term.
///
/// Interest accrues on the balance carried into each period. The final
/// amortizing row absorbs the remaining balance so that row principals sum
/// to the loan principal exactly.
pub fn annuity_schedule(
    loan_id: i64,
    principal: Money,
    periods: u32,
    product: &Product,
    config: &EngineConfig,
) -> Result<Vec<Schedule>> {
    let now = config.time.now();
    let rate = annual_to_period_rate(product.interest, product.period_type, product.day_count, now);
    let grace = product.grace_term.min(periods);
    let payment = annuity_payment(principal.as_decimal(), periods - grace, rate.as_decimal());

    let mut schedules = Vec::with_capacity(periods as usize);
    let mut due = now;
    let mut balance = principal;
    for period in 1..=periods {
        due = next_period_date(due, product.period_type, product.roll_convention, config.holidays.as_ref());
        let id = config.ids.next_id();
        let fees = instantiate_fees(&product.fees, config.ids.as_ref());

        let raw_interest = balance.as_decimal() * rate.as_decimal();
        let interest = Money::with_rounding(raw_interest, config.rounding);
        if period <= grace {
            schedules.push(Schedule::new(
                id, loan_id, period, due, Money::ZERO, interest, fees, config.rounding, now,
            ));
            continue;
        }
        let portion = if period == periods {
            balance
        } else {
            Money::with_rounding(payment - raw_interest, config.rounding)
        };
        balance -= portion;
        schedules.push(Schedule::new(
            id, loan_id, period, due, portion, interest, fees, config.rounding, now,
        ));
    }
    Ok(schedules)
}

/// Equal-principal plan: constant principal over the amortizing tail,
/// interest on the declining balance after each period's repayment.
pub fn equal_principal_schedule(
    loan_id: i64,
    principal: Money,
    periods: u32,
    product: &Product,
    config: &EngineConfig,
) -> Result<Vec<Schedule>> {
    let now = config.time.now();
    let rate = annual_to_period_rate(product.interest, product.period_type, product.day_count, now);
    let grace = product.grace_term.min(periods);
    let amortizing = periods - grace;
    let per_period = if amortizing == 0 {
        Money::ZERO
    } else {
        Money::with_rounding(
            principal.as_decimal() / Decimal::from(amortizing),
            config.rounding,
        )
    };

    let mut schedules = Vec::with_capacity(periods as usize);
    let mut due = now;
    let mut balance = principal;
    for period in 1..=periods {
        due = next_period_date(due, product.period_type, product.roll_convention, config.holidays.as_ref());
        let id = config.ids.next_id();
        let fees = instantiate_fees(&product.fees, config.ids.as_ref());

        if period <= grace {
            let interest = Money::with_rounding(
                balance.as_decimal() * rate.as_decimal(),
                config.rounding,
            );
            schedules.push(Schedule::new(
                id, loan_id, period, due, Money::ZERO, interest, fees, config.rounding, now,
            ));
            continue;
        }
        let portion = if period == periods { balance } else { per_period };
        balance -= portion;
        let interest = Money::with_rounding(
            balance.as_decimal() * rate.as_decimal(),
            config.rounding,
        );
        schedules.push(Schedule::new(
            id, loan_id, period, due, portion, interest, fees, config.rounding, now,
        ));
    }
    Ok(schedules)
}

/// deep-copy product fee templates into live, unpaid instances
pub(crate) fn instantiate_fees(templates: &[Fee], ids: &dyn IdGenerator) -> Vec<Fee> {
    templates
        .iter()
        .map(|template| {
            let mut fee = template.clone();
            fee.id = ids.next_id();
            fee
        })
        .collect()
}
