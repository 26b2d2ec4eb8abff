use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::LoanError;

/// how a loan amortizes its principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepayStyle {
    /// equal total payment each period (annuity)
    EqualInstallment,
    /// equal principal each period, declining interest
    EqualPrincipal,
}

impl RepayStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepayStyle::EqualInstallment => "EQUAL_INSTALLMENT",
            RepayStyle::EqualPrincipal => "EQUAL_PRINCIPAL",
        }
    }
}

impl fmt::Display for RepayStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepayStyle {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EQUAL_INSTALLMENT" => Ok(RepayStyle::EqualInstallment),
            "EQUAL_PRINCIPAL" => Ok(RepayStyle::EqualPrincipal),
            other => Err(LoanError::UnsupportedRepayType {
                style: other.to_string(),
            }),
        }
    }
}

/// nominal length of one schedule period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodType {
    Day,
    BiWeek,
    Month,
    Year,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Day => "DAY",
            PeriodType::BiWeek => "BI_WEEK",
            PeriodType::Month => "MONTH",
            PeriodType::Year => "YEAR",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodType {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DAY" => Ok(PeriodType::Day),
            "BI_WEEK" => Ok(PeriodType::BiWeek),
            "MONTH" => Ok(PeriodType::Month),
            "YEAR" => Ok(PeriodType::Year),
            other => Err(LoanError::UnknownPeriod {
                period: other.to_string(),
            }),
        }
    }
}

/// how a prepayment rewrites the remaining schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrepayStrategy {
    /// keep the per-period payment, shorten the tail
    TermReduction,
    /// keep the period count, lower each payment
    PaymentReduction,
    /// not a prepayment, settle due periods only
    NotPrepay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    Pending,
    Unpaid,
    Paid,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleStatus {
    Unpaid,
    /// overdue but current-period interest settled
    InterestPaid,
    /// overdue with only principal outstanding
    FeePaid,
    Paid,
    Removed,
    Pending,
}

impl ScheduleStatus {
    /// terminal states that no longer accept funds
    pub fn is_settled(&self) -> bool {
        matches!(self, ScheduleStatus::Paid | ScheduleStatus::Removed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeStatus {
    Unpaid,
    Paid,
    /// lives on a product as a template for schedule instances
    Template,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverdueStatus {
    /// still accruing penalty interest
    Accruing,
    Partial,
    Cleared,
    Waived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepayStatus {
    Processing,
    Success,
    Failed,
    Canceled,
    Refunding,
}
