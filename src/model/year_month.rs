use anyhow::{bail, Context};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A calendar month, written as `YYYY-MM`.
///
/// The derived ordering (year, then month) is the same as the ordering of the `YYYY-MM` string
/// for all four-digit years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> crate::Result<Self> {
        if !(1..=12).contains(&month) {
            bail!("Invalid month {month}, expected 1 through 12");
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month immediately before this one.
    pub fn previous(&self) -> YearMonth {
        match self.month {
            1 => YearMonth {
                year: self.year - 1,
                month: 12,
            },
            m => YearMonth {
                year: self.year,
                month: m - 1,
            },
        }
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .with_context(|| format!("Expected a YYYY-MM month but got '{s}'"))?;
        let year = year
            .parse()
            .with_context(|| format!("Invalid year in '{s}'"))?;
        let month = month
            .parse()
            .with_context(|| format!("Invalid month in '{s}'"))?;
        YearMonth::new(year, month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        YearMonth::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(YearMonth::from(date).to_string(), "2025-03");
    }

    #[test]
    fn test_ordering_matches_key() {
        let mut months = vec![
            YearMonth::new(2025, 1).unwrap(),
            YearMonth::new(2024, 12).unwrap(),
            YearMonth::new(2025, 10).unwrap(),
        ];
        months.sort();
        let keys: Vec<String> = months.iter().map(|m| m.to_string()).collect();
        let mut sorted_keys = keys.clone();
        sorted_keys.sort();
        assert_eq!(keys, sorted_keys);
    }

    #[test]
    fn test_previous_wraps_year() {
        let jan = YearMonth::new(2025, 1).unwrap();
        assert_eq!(jan.previous(), YearMonth::new(2024, 12).unwrap());
        let jun = YearMonth::new(2025, 6).unwrap();
        assert_eq!(jun.previous().to_string(), "2025-05");
    }

    #[test]
    fn test_parse() {
        let ym: YearMonth = "2024-07".parse().unwrap();
        assert_eq!((ym.year(), ym.month()), (2024, 7));
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("July".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_serde_as_key_string() {
        let ym = YearMonth::new(2025, 9).unwrap();
        let json = serde_json::to_string(&ym).unwrap();
        assert_eq!(json, "\"2025-09\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ym);
    }
}
