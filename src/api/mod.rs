//! Access to the transaction API.
//!
//! The `Api` trait is the seam between the network and the rest of the program. `HttpApi` talks
//! to a real backend, `TestApi` serves canned data from memory. `Fetcher` sits on top of either
//! one and turns pages into a complete list of transactions.

mod cache;
mod fetch;
mod http;
mod test_api;

pub use cache::Cache;
pub use fetch::{Fetcher, DEFAULT_PAGE_SIZE};
pub use http::HttpApi;
pub use test_api::TestApi;

use crate::{Config, Result};
use anyhow::ensure;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use tracing::debug;

/// The path of the date-range endpoint, relative to the configured API URL.
pub(crate) const DATE_RANGE_PATH: &str = "api/transaction/date-range";

/// Set this environment variable to anything non-empty to use `TestApi` instead of the network.
pub const TEST_MODE_ENV: &str = "TRENDS_IN_TEST_MODE";

/// Whether the program talks to a real backend or to in-memory test data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Http,
    Test,
}

impl Mode {
    /// `Mode::Test` when `TRENDS_IN_TEST_MODE` is set and non-empty, otherwise `Mode::Http`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// An inclusive range of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        ensure!(
            start <= end,
            "The start date {start} is after the end date {end}"
        );
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// The body of a successful date-range response.
///
/// Paged backends return an envelope. Older backends return every transaction as a bare array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PageBody {
    Page {
        content: Vec<Value>,
        #[serde(default)]
        last: Option<bool>,
    },
    Bare(Vec<Value>),
}

/// The outcome of requesting one page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageResponse {
    /// The backend answered 404, which means there is no data in the range.
    NotFound,
    Body(PageBody),
}

/// Requests one page of transactions for a date range.
///
/// Implementations map a 404 to `PageResponse::NotFound` and every other failure to an error.
/// Pages are numbered from zero.
#[async_trait::async_trait]
pub trait Api {
    async fn get_page(&mut self, range: DateRange, page: u32, size: u32) -> Result<PageResponse>;
}

/// Creates the `Api` implementation for `mode`.
pub fn api(config: &Config, mode: Mode) -> Result<Box<dyn Api + Send>> {
    Ok(match mode {
        Mode::Http => Box::new(HttpApi::new(config.api_url().clone())?),
        Mode::Test => {
            debug!("Using in-memory test data instead of {}", config.api_url());
            Box::new(TestApi::default())
        }
    })
}

/// Creates a `Fetcher` for `mode` with the cache described by `config`.
pub fn fetcher(config: &Config, mode: Mode) -> Result<Fetcher> {
    Ok(Fetcher::new(
        api(config, mode)?,
        config.cache(),
        config.page_size(),
    ))
}
