//! Error types used throughout the crate.
//!
//! Internally everything is an `anyhow::Error`. At the command boundary, errors are tagged with
//! an `ErrorType` so that the user can tell which part of the program failed.

use serde::{Deserialize, Serialize};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The broad category of a failure that is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The trends home directory or its config file is missing or invalid.
    Config,
    /// The transaction API could not be reached or returned an error.
    Request,
    /// The local response cache could not be read or written.
    Cache,
    /// The user supplied invalid arguments.
    Input,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// Tags an error with an `ErrorType` before it leaves a command handler.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| e.into().context(format!("{error_type} error")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_pub_result_adds_error_type() {
        let result: std::result::Result<(), Error> = Err(anyhow!("connection refused"));
        let err = result.pub_result(ErrorType::Request).unwrap_err();
        assert_eq!(err.to_string(), "request error");
        assert!(format!("{err:#}").contains("connection refused"));
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::Cache.to_string(), "cache");
        assert_eq!("config".parse::<ErrorType>().unwrap(), ErrorType::Config);
    }
}
