//! Month-over-month comparisons between spending buckets.

use crate::trends::MonthlySpending;
use rust_decimal::Decimal;
use serde::Serialize;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// The change in total spend between two months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthOverMonthComparison {
    pub current_amount: Decimal,
    pub previous_amount: Decimal,
    pub absolute_change: Decimal,
    /// `None` when `previous_amount` is zero. This means "not computable", not zero.
    pub percentage_change: Option<Decimal>,
}

/// A category's share of one month's spend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub amount: Decimal,
    /// `None` only when the month's total is zero.
    pub percentage: Option<Decimal>,
}

/// The change in one category's spend between two months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryChange {
    pub category: String,
    pub current_amount: Decimal,
    pub previous_amount: Decimal,
    pub absolute_change: Decimal,
    /// `None` when `previous_amount` is zero.
    pub percentage_change: Option<Decimal>,
}

/// `(current - previous) / previous * 100`, or `None` when `previous` is zero or the result does
/// not fit in a `Decimal`.
pub(crate) fn percentage_change(current: Decimal, previous: Decimal) -> Option<Decimal> {
    if previous.is_zero() {
        return None;
    }
    current
        .checked_sub(previous)?
        .checked_div(previous)?
        .checked_mul(HUNDRED)
}

/// `part / whole * 100`, or `None` when `whole` is zero.
fn share(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return None;
    }
    part.checked_div(whole)?.checked_mul(HUNDRED)
}

/// Compares two amounts. The percentage is only defined when `previous` is non-zero.
pub fn diff_mom(current: Decimal, previous: Decimal) -> MonthOverMonthComparison {
    MonthOverMonthComparison {
        current_amount: current,
        previous_amount: previous,
        absolute_change: current - previous,
        percentage_change: percentage_change(current, previous),
    }
}

/// The `n` largest categories of `month`, largest first. Ties keep the order in which the
/// categories were first seen. Returns every category when there are fewer than `n`.
pub fn top_categories(month: &MonthlySpending, n: usize) -> Vec<CategoryShare> {
    let total = month.total_spend();
    let mut shares: Vec<CategoryShare> = month
        .categories()
        .iter()
        .map(|(category, amount)| CategoryShare {
            category: category.to_string(),
            amount,
            percentage: share(amount, total),
        })
        .collect();
    // sort_by is stable
    shares.sort_by(|a, b| b.amount.cmp(&a.amount));
    shares.truncate(n);
    shares
}

/// Per-category changes from `previous` to `current`, over the union of both months'
/// categories. A category missing from a month counts as zero in that month.
///
/// Categories of `current` come first in their original order, followed by categories that only
/// appear in `previous`. Entries that are zero in both months are left out.
pub fn category_changes(
    current: &MonthlySpending,
    previous: &MonthlySpending,
) -> Vec<CategoryChange> {
    let current_names = current.categories().iter().map(|(name, _)| name);
    let previous_only = previous
        .categories()
        .iter()
        .map(|(name, _)| name)
        .filter(|name| current.categories().get(name).is_none());

    current_names
        .chain(previous_only)
        .filter_map(|name| {
            let current_amount = current.categories().get(name).unwrap_or_default();
            let previous_amount = previous.categories().get(name).unwrap_or_default();
            if current_amount.is_zero() && previous_amount.is_zero() {
                return None;
            }
            Some(CategoryChange {
                category: name.to_string(),
                current_amount,
                previous_amount,
                absolute_change: current_amount - previous_amount,
                percentage_change: percentage_change(current_amount, previous_amount),
            })
        })
        .collect()
}
