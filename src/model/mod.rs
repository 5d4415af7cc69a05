//! Types that represent the core data model, such as `Transaction` and `Amount`.
mod amount;
mod transaction;
mod year_month;

pub use amount::{Amount, AmountError};
pub use transaction::{Transaction, TransactionType};
pub use year_month::YearMonth;
