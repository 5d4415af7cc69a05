use crate::model::Transaction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Inclusion and exclusion rules applied to transactions before they are aggregated.
///
/// Empty sets place no restriction. Transfers are dropped unless `include_transfers` is set,
/// refunds are kept unless `include_refunds` is cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendFilters {
    /// When non-empty, only transactions from these accounts are counted.
    pub account_filter: BTreeSet<String>,
    /// When non-empty, only transactions in these categories are counted.
    pub category_filter: BTreeSet<String>,
    /// Transactions in these categories are never counted.
    pub exclude_categories: BTreeSet<String>,
    pub include_transfers: bool,
    pub include_refunds: bool,
}

impl Default for TrendFilters {
    fn default() -> Self {
        Self {
            account_filter: BTreeSet::new(),
            category_filter: BTreeSet::new(),
            exclude_categories: BTreeSet::new(),
            include_transfers: false,
            include_refunds: true,
        }
    }
}

impl TrendFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accounts<S>(mut self, accounts: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<String>,
    {
        self.account_filter = accounts.into_iter().map(Into::into).collect();
        self
    }

    pub fn categories<S>(mut self, categories: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<String>,
    {
        self.category_filter = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude_categories<S>(mut self, categories: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<String>,
    {
        self.exclude_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn include_transfers(mut self, include: bool) -> Self {
        self.include_transfers = include;
        self
    }

    pub fn include_refunds(mut self, include: bool) -> Self {
        self.include_refunds = include;
        self
    }

    /// Whether `transaction`, filed under `category`, passes every active rule.
    pub(crate) fn accepts(&self, transaction: &Transaction, category: &str) -> bool {
        if !self.include_transfers && transaction.is_transfer() {
            return false;
        }
        if !self.include_refunds && transaction.is_refund() {
            return false;
        }
        if !self.account_filter.is_empty() {
            match transaction.account_name() {
                Some(account) if self.account_filter.contains(account) => {}
                _ => return false,
            }
        }
        if !self.category_filter.is_empty() && !self.category_filter.contains(category) {
            return false;
        }
        !self.exclude_categories.contains(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, TransactionType};
    use chrono::NaiveDate;

    fn tx(account: &str, category: &str, kind: TransactionType) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            account,
            category,
            Amount::ZERO,
            kind,
        )
    }

    #[test]
    fn test_default_drops_transfers_keeps_refunds() {
        let filters = TrendFilters::default();
        assert!(!filters.accepts(&tx("A", "Moves", TransactionType::Transfer), "Moves"));
        assert!(filters.accepts(&tx("A", "Food", TransactionType::Refund), "Food"));
        assert!(filters.accepts(&tx("A", "Food", TransactionType::Expense), "Food"));
    }

    #[test]
    fn test_include_transfers() {
        let filters = TrendFilters::new().include_transfers(true);
        assert!(filters.accepts(&tx("A", "Moves", TransactionType::Transfer), "Moves"));
    }

    #[test]
    fn test_exclude_refunds() {
        let filters = TrendFilters::new().include_refunds(false);
        assert!(!filters.accepts(&tx("A", "Food", TransactionType::Refund), "Food"));
    }

    #[test]
    fn test_account_filter() {
        let filters = TrendFilters::new().accounts(["A"]);
        assert!(filters.accepts(&tx("A", "Food", TransactionType::Expense), "Food"));
        assert!(!filters.accepts(&tx("B", "Food", TransactionType::Expense), "Food"));
        assert!(!filters.accepts(&Transaction::default(), "Food"));
    }

    #[test]
    fn test_category_allow_and_deny() {
        let filters = TrendFilters::new()
            .categories(["Food", "Rent"])
            .exclude_categories(["Rent"]);
        let t = tx("A", "ignored", TransactionType::Expense);
        assert!(filters.accepts(&t, "Food"));
        assert!(!filters.accepts(&t, "Rent"));
        assert!(!filters.accepts(&t, "Travel"));
    }
}
