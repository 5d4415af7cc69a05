//! Groups transactions into calendar-month spending buckets.

use crate::model::{Transaction, YearMonth};
use crate::trends::TrendFilters;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::{trace, warn};

/// The category name used for transactions that have none.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Per-category spend for one month, in the order categories were first seen.
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTotals {
    entries: Vec<(String, Decimal)>,
}

impl CategoryTotals {
    /// Adds `spend` to `category`. Returns false, leaving the totals unchanged, on overflow.
    fn add(&mut self, category: &str, spend: Decimal) -> bool {
        match self.entries.iter_mut().find(|(name, _)| name == category) {
            Some((_, total)) => match total.checked_add(spend) {
                Some(sum) => *total = sum,
                None => return false,
            },
            None => self.entries.push((category.to_string(), spend)),
        }
        true
    }

    pub fn get(&self, category: &str) -> Option<Decimal> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, total)| *total)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.entries.iter().map(|(name, total)| (name.as_str(), *total))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Decimal)> for CategoryTotals {
    fn from_iter<I: IntoIterator<Item = (S, Decimal)>>(iter: I) -> Self {
        let mut totals = CategoryTotals::default();
        for (name, amount) in iter {
            let name = name.into();
            if !totals.add(&name, amount) {
                warn!("Dropping {amount} from {name}, the category total overflowed");
            }
        }
        totals
    }
}

impl Serialize for CategoryTotals {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, total) in &self.entries {
            map.serialize_entry(name, total)?;
        }
        map.end()
    }
}

/// Spending for one calendar month. `total_spend` always equals the sum of `categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySpending {
    year_month: YearMonth,
    total_spend: Decimal,
    transaction_count: usize,
    categories: CategoryTotals,
}

impl MonthlySpending {
    /// A month with no spending.
    pub fn empty(year_month: YearMonth) -> Self {
        Self {
            year_month,
            total_spend: Decimal::ZERO,
            transaction_count: 0,
            categories: CategoryTotals::default(),
        }
    }

    /// Builds a bucket directly from category totals, e.g. from a previous report. A category
    /// that would overflow the month's total is left out.
    pub fn from_categories(
        year_month: YearMonth,
        transaction_count: usize,
        categories: CategoryTotals,
    ) -> Self {
        let mut month = Self::empty(year_month);
        for (name, total) in categories.iter() {
            if !month.add(name, total) {
                warn!("Dropping category {name} from {year_month}, the month total overflowed");
            }
        }
        month.transaction_count = transaction_count;
        month
    }

    /// Adds `spend` to the month total and to `category`. Returns false, leaving the bucket
    /// unchanged, when either sum would overflow.
    fn add(&mut self, category: &str, spend: Decimal) -> bool {
        let Some(total_spend) = self.total_spend.checked_add(spend) else {
            return false;
        };
        if !self.categories.add(category, spend) {
            return false;
        }
        self.total_spend = total_spend;
        true
    }

    fn record(&mut self, category: &str, spend: Decimal) -> bool {
        let recorded = self.add(category, spend);
        if recorded {
            self.transaction_count += 1;
        }
        recorded
    }

    pub fn year_month(&self) -> YearMonth {
        self.year_month
    }

    pub fn total_spend(&self) -> Decimal {
        self.total_spend
    }

    pub fn transaction_count(&self) -> usize {
        self.transaction_count
    }

    pub fn categories(&self) -> &CategoryTotals {
        &self.categories
    }
}

/// Sums the absolute spend of `transactions` per calendar month and per category.
///
/// Entries that are `None`, or that have no amount or no date, are skipped. So is anything the
/// `filters` reject. The result is ordered most recent month first and is empty when nothing
/// survives.
pub fn aggregate_monthly_spend<'a, I, T>(
    transactions: I,
    filters: &TrendFilters,
) -> Vec<MonthlySpending>
where
    I: IntoIterator<Item = T>,
    T: Into<Option<&'a Transaction>>,
{
    let mut months: BTreeMap<YearMonth, MonthlySpending> = BTreeMap::new();

    for entry in transactions {
        let Some(transaction): Option<&Transaction> = entry.into() else {
            continue;
        };
        let (Some(amount), Some(year_month)) = (transaction.amount(), transaction.year_month())
        else {
            trace!("Skipping unusable transaction {:?}", transaction.id());
            continue;
        };
        let category = transaction.category().unwrap_or(UNCATEGORIZED);
        if !filters.accepts(transaction, category) {
            continue;
        }
        let spend = amount.abs().value();
        let recorded = months
            .entry(year_month)
            .or_insert_with(|| MonthlySpending::empty(year_month))
            .record(category, spend);
        if !recorded {
            warn!(
                "Skipping transaction {:?}, adding {spend} overflows the {year_month} total",
                transaction.id()
            );
        }
    }

    months.into_values().rev().collect()
}
