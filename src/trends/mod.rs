//! Spending-trend calculations over a list of transactions.
//!
//! Everything here is pure and synchronous: the same input always produces the same output, and
//! nothing in this module fails. Transactions that cannot be used are skipped.

mod compare;
mod filters;
mod monthly;

pub use compare::{
    category_changes, diff_mom, top_categories, CategoryChange, CategoryShare,
    MonthOverMonthComparison,
};
pub use filters::TrendFilters;
pub use monthly::{aggregate_monthly_spend, CategoryTotals, MonthlySpending, UNCATEGORIZED};

use crate::model::{Transaction, YearMonth};
use serde::Serialize;

/// How many categories the report ranks when the caller does not say.
pub const DEFAULT_TOP_CATEGORIES: usize = 5;

/// The monthly buckets for a set of transactions along with the comparison of the two most
/// recent months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpendingTrends {
    /// Every month with spending, most recent first.
    pub months: Vec<MonthlySpending>,
    pub current_month: Option<YearMonth>,
    pub previous_month: Option<YearMonth>,
    /// `None` when there is no data at all. With a single month, the previous amount is zero and
    /// the percentage is `None`.
    pub comparison: Option<MonthOverMonthComparison>,
    pub top_categories: Vec<CategoryShare>,
    pub category_changes: Vec<CategoryChange>,
}

impl SpendingTrends {
    pub fn compute<'a, I, T>(transactions: I, filters: &TrendFilters, top_n: usize) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<&'a Transaction>>,
    {
        let months = aggregate_monthly_spend(transactions, filters);
        let Some(current) = months.first() else {
            return Self {
                months,
                current_month: None,
                previous_month: None,
                comparison: None,
                top_categories: Vec::new(),
                category_changes: Vec::new(),
            };
        };

        let previous = months.get(1);
        let empty_previous;
        let previous_bucket = match previous {
            Some(p) => p,
            None => {
                empty_previous = MonthlySpending::empty(current.year_month().previous());
                &empty_previous
            }
        };

        Self {
            current_month: Some(current.year_month()),
            previous_month: previous.map(MonthlySpending::year_month),
            comparison: Some(diff_mom(
                current.total_spend(),
                previous_bucket.total_spend(),
            )),
            top_categories: top_categories(current, top_n),
            category_changes: category_changes(current, previous_bucket),
            months,
        }
    }

    pub fn current(&self) -> Option<&MonthlySpending> {
        self.months.first()
    }

    pub fn previous(&self) -> Option<&MonthlySpending> {
        self.months.get(1)
    }
}
