//! Command handlers for the trends CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod cache;
mod fetch;
mod init;
mod report;

use crate::api::DateRange;
use crate::args::RangeArgs;
use crate::error::{ErrorType, IntoResult};
use crate::Result;
use anyhow::Context;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use cache::cache_clear;
pub use fetch::fetch;
pub use init::init;
pub use report::report;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to stdout so
    /// that it can be piped into other tools.
    pub fn print_json(&self) -> Result<()> {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            let json = serde_json::to_string_pretty(structure)
                .context("Unable to serialize the command output")?;
            println!("{json}");
        }
        Ok(())
    }
}

/// Validates the dates given on the command line.
fn date_range(args: &RangeArgs) -> Result<DateRange> {
    DateRange::new(args.start(), args.end()).pub_result(ErrorType::Input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_out() {
        let out: Out<()> = "done".into();
        assert_eq!(out.message(), "done");
        assert!(out.structure().is_none());

        let out = Out::new("two", vec![1, 2]);
        assert_eq!(out.structure(), Some(&vec![1, 2]));
        out.print_json().unwrap();
    }

    #[test]
    fn test_date_range_rejects_reversed_dates() {
        let args = RangeArgs::new(
            NaiveDate::from_ymd_opt(2025, 10, 31).unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            false,
        );
        let err = date_range(&args).unwrap_err();
        assert_eq!(err.to_string(), "input error");
    }
}
