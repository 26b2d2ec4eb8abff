use chrono::{DateTime, Utc};

use crate::calendar::{advance_period, DayCountConvention};
use crate::decimal::Rate;
use crate::types::PeriodType;

/// Convert an annual rate to the rate accrued over one nominal period.
///
/// The candidate period runs from `now` to the unadjusted next period date;
/// its day-count fraction scales the annual rate, so the result is the
/// interest accrued on unit principal over one period.
pub fn annual_to_period_rate(
    annual: Rate,
    period: PeriodType,
    convention: DayCountConvention,
    now: DateTime<Utc>,
) -> Rate {
    let next = advance_period(now, period);
    let fraction = convention.year_fraction(now.date_naive(), next.date_naive());
    Rate::from_decimal(fraction * annual.as_decimal())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_monthly_rate_is_fraction_times_annual() {
        // january has 31 days
        let now = at(2024, 1, 1);
        let r = annual_to_period_rate(
            Rate::from_percentage(12),
            PeriodType::Month,
            DayCountConvention::Fixed,
            now,
        );
        assert_eq!(r.as_decimal(), Decimal::from(31) / dec!(365) * dec!(0.12));
    }

    #[test]
    fn test_linearity_across_conventions() {
        let now = at(2024, 3, 15);
        let annual = Rate::from_percentage(10);
        for period in [
            PeriodType::Day,
            PeriodType::BiWeek,
            PeriodType::Month,
            PeriodType::Year,
        ] {
            for convention in [
                DayCountConvention::BondBasis,
                DayCountConvention::Eurobond,
                DayCountConvention::MoneyMarket,
                DayCountConvention::Fixed,
                DayCountConvention::Isda,
                DayCountConvention::Afb,
            ] {
                let next = advance_period(now, period);
                let fraction = convention.year_fraction(now.date_naive(), next.date_naive());
                let r = annual_to_period_rate(annual, period, convention, now);
                assert_eq!(r.as_decimal(), fraction * annual.as_decimal());
            }
        }
    }

    #[test]
    fn test_daily_rate_money_market() {
        let now = at(2024, 6, 1);
        let r = annual_to_period_rate(
            Rate::from_percentage(18),
            PeriodType::Day,
            DayCountConvention::MoneyMarket,
            now,
        );
        assert_eq!(r.as_decimal(), dec!(0.18) / dec!(360));
    }
}
