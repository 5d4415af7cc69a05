use crate::model::Amount;
use crate::model::YearMonth;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A single transaction as returned by the `/api/transaction/date-range` endpoint.
///
/// Every field is optional. A value that is missing, `null`, blank, or of the wrong shape decodes
/// to `None` instead of failing the whole page, so that one bad row cannot hide a month of data.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, deserialize_with = "lenient_id")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<String>,

    #[serde(default, deserialize_with = "lenient_date")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "lenient")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) account_name: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) category: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) amount: Option<Amount>,

    #[serde(rename = "type", default, deserialize_with = "lenient")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) transaction_type: Option<TransactionType>,

    #[serde(default, deserialize_with = "lenient")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) state: Option<String>,
}

impl Transaction {
    /// Creates a transaction with the fields that matter for spending trends.
    pub fn new(
        date: NaiveDate,
        account_name: impl Into<String>,
        category: impl Into<String>,
        amount: Amount,
        transaction_type: TransactionType,
    ) -> Self {
        Self {
            id: None,
            date: Some(date),
            account_name: Some(account_name.into()),
            category: Some(category.into()),
            amount: Some(amount),
            transaction_type: Some(transaction_type),
            state: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Decodes one element of a page's `content` array. Returns `None` for `null` and for values
    /// that are not transaction objects.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn year_month(&self) -> Option<YearMonth> {
        self.date.map(YearMonth::from)
    }

    pub fn account_name(&self) -> Option<&str> {
        self.account_name.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    pub fn transaction_type(&self) -> Option<&TransactionType> {
        self.transaction_type.as_ref()
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self.transaction_type, Some(TransactionType::Transfer))
    }

    pub fn is_refund(&self) -> bool {
        matches!(self.transaction_type, Some(TransactionType::Refund))
    }
}

/// The kind of a transaction. Unknown kinds are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Expense,
    Income,
    Transfer,
    Refund,
    Other(String),
}

impl FromStr for TransactionType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.to_ascii_lowercase().as_str() {
            "expense" => TransactionType::Expense,
            "income" => TransactionType::Income,
            "transfer" => TransactionType::Transfer,
            "refund" => TransactionType::Refund,
            _ => TransactionType::Other(s.to_string()),
        })
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Expense => f.write_str("expense"),
            TransactionType::Income => f.write_str("income"),
            TransactionType::Transfer => f.write_str("transfer"),
            TransactionType::Refund => f.write_str("refund"),
            TransactionType::Other(s) => f.write_str(s),
        }
    }
}

impl Serialize for TransactionType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TransactionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(TransactionType::from_str(&s).unwrap_or_else(|never| match never {}))
    }
}

/// Treats `null`, blank strings and values of the wrong shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::String(ref s) if s.trim().is_empty() => None,
        other => serde_json::from_value(other).ok(),
    })
}

/// IDs are numeric in some backends and strings in others.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

/// Accepts `YYYY-MM-DD` as well as timestamps that start with it, e.g. `2025-10-20T09:15:30Z`.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s
            .trim()
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn test_deserialize_full_transaction() {
        let t: Transaction = serde_json::from_value(json!({
            "id": 42,
            "date": "2025-10-20",
            "accountName": "Credit Card 1",
            "category": "Groceries",
            "amount": -87.43,
            "type": "EXPENSE",
            "state": "POSTED"
        }))
        .unwrap();
        assert_eq!(t.id(), Some("42"));
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2025, 10, 20));
        assert_eq!(t.account_name(), Some("Credit Card 1"));
        assert_eq!(t.category(), Some("Groceries"));
        assert_eq!(
            t.amount().unwrap().value(),
            Decimal::from_str("-87.43").unwrap()
        );
        assert_eq!(t.transaction_type(), Some(&TransactionType::Expense));
        assert_eq!(t.state(), Some("POSTED"));
    }

    #[test]
    fn test_bad_fields_become_none() {
        let t: Transaction = serde_json::from_value(json!({
            "date": "not a date",
            "category": "",
            "amount": "lots",
            "accountName": null
        }))
        .unwrap();
        assert!(t.date().is_none());
        assert!(t.category().is_none());
        assert!(t.amount().is_none());
        assert!(t.account_name().is_none());
    }

    #[test]
    fn test_timestamp_date() {
        let t: Transaction =
            serde_json::from_value(json!({ "date": "2025-01-31T23:59:59.000Z" })).unwrap();
        assert_eq!(t.year_month().unwrap().to_string(), "2025-01");
    }

    #[test]
    fn test_from_value_skips_non_objects() {
        assert!(Transaction::from_value(Value::Null).is_none());
        assert!(Transaction::from_value(json!(17)).is_none());
        assert!(Transaction::from_value(json!({ "amount": 5 })).is_some());
    }

    #[test]
    fn test_transaction_type_parse() {
        assert_eq!(
            TransactionType::from_str("Transfer").unwrap(),
            TransactionType::Transfer
        );
        assert_eq!(
            TransactionType::from_str("PAYMENT").unwrap(),
            TransactionType::Other("PAYMENT".to_string())
        );
    }

    #[test]
    fn test_serialize_skips_missing_fields() {
        let t = Transaction::default().with_id("abc");
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"{"id":"abc"}"#);
    }
}
