use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("no schedule found for loan")]
    NoScheduleFound,

    #[error("insufficient funds to cover penalty interest")]
    InsufficientForPenalty,

    #[error("insufficient funds to settle schedule period {period}")]
    InsufficientForSchedule { period: u32 },

    #[error("unsupported repay style: {style}")]
    UnsupportedRepayType { style: String },

    #[error("unsupported day count convention: {convention}")]
    UnsupportedDayCount { convention: String },

    #[error("unknown period type: {period}")]
    UnknownPeriod { period: String },

    #[error("product {product_id} not registered")]
    ProductNotRegistered { product_id: i64 },

    #[error("invalid loan params: {message}")]
    InvalidLoanParams { message: String },

    #[error("holiday fetch failed: {message}")]
    HolidayFetch { message: String },

    #[error("plugin {name}: {message}")]
    Plugin { name: String, message: String },
}

pub type Result<T> = std::result::Result<T, LoanError>;
