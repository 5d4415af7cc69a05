//! A cache of downloaded transactions, stored as JSON files in the cache directory.
//!
//! The cache is an explicit value: it is created from the `Config` when the program starts and
//! handed to the `Fetcher`. Nothing is cached in globals. It is off unless the home directory was
//! initialized with `--cache`, and entries never expire, so `--refresh` or `cache clear` is
//! needed to pick up new transactions in a cached range.

use crate::api::DateRange;
use crate::model::Transaction;
use crate::{utils, Result};
use anyhow::Context;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PREFIX: &str = "transactions.";
const EXTENSION: &str = ".json";
const SOURCE_KEY_LEN: usize = 12;

/// Stores the complete transaction list of a date range under
/// `{dir}/transactions.{source}.{start}.{end}.json`, where `source` is a short hash of the API URL
/// the transactions came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cache {
    dir: Option<PathBuf>,
    source: String,
}

impl Cache {
    /// A cache that stores files in `dir` for transactions fetched from `source`, usually the API
    /// URL. The directory must exist.
    pub fn new(dir: impl Into<PathBuf>, source: &str) -> Self {
        Self {
            dir: Some(dir.into()),
            source: source_key(source),
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self {
            dir: None,
            source: String::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    fn path(&self, range: DateRange) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| {
            dir.join(format!(
                "{PREFIX}{}.{}.{}{EXTENSION}",
                self.source,
                range.start(),
                range.end()
            ))
        })
    }

    /// Returns the cached transactions for `range`, or `None` on a miss. An unreadable cache file
    /// is treated as a miss.
    pub async fn get(&self, range: DateRange) -> Option<Vec<Transaction>> {
        let path = self.path(range)?;
        if !path.is_file() {
            return None;
        }
        match utils::deserialize::<Vec<Transaction>>(&path).await {
            Ok(transactions) => {
                debug!("Cache hit for {range} at {}", path.display());
                Some(transactions)
            }
            Err(e) => {
                warn!("Ignoring unreadable cache file: {e:#}");
                None
            }
        }
    }

    /// Stores `transactions` as the complete contents of `range`.
    pub async fn put(&self, range: DateRange, transactions: &[Transaction]) -> Result<()> {
        let Some(path) = self.path(range) else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(transactions)
            .context("Failed to serialize transactions for the cache")?;
        utils::write(&path, json).await?;
        debug!("Cached {} transactions at {}", transactions.len(), path.display());
        Ok(())
    }

    /// Deletes every cache file, whatever its source. Returns how many were removed.
    pub async fn clear(&self) -> Result<usize> {
        let Some(dir) = &self.dir else {
            return Ok(0);
        };
        if !dir.is_dir() {
            return Ok(0);
        }

        let mut removed = 0;
        let mut entries = utils::read_dir(dir).await?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(PREFIX) && name.ends_with(EXTENSION) {
                utils::remove(entry.path()).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// The first characters of the hex SHA-256 of `source`.
fn source_key(source: &str) -> String {
    let mut key = hex::encode(Sha256::digest(source.as_bytes()));
    key.truncate(SOURCE_KEY_LEN);
    key
}
