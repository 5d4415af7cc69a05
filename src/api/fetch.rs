//! Turns the paged date-range endpoint into a complete list of transactions.

use crate::api::{Api, Cache, DateRange, PageBody, PageResponse};
use crate::model::Transaction;
use crate::Result;
use anyhow::Context;
use serde_json::Value;
use tracing::{debug, info, warn};

/// The page size used when the config does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Fetches every transaction in a date range, one page at a time.
///
/// Pages are requested sequentially, page `n + 1` only after page `n` has arrived. There are no
/// retries. A 404 means there is no (more) data. Complete results are written to the injected
/// `Cache` and served from it on the next request for the same range unless `refresh` is set.
pub struct Fetcher {
    api: Box<dyn Api + Send>,
    cache: Cache,
    page_size: u32,
    refresh: bool,
}

impl Fetcher {
    pub fn new(api: Box<dyn Api + Send>, cache: Cache, page_size: u32) -> Self {
        Self {
            api,
            cache,
            page_size: page_size.max(1),
            refresh: false,
        }
    }

    /// When `refresh` is true, cached results are ignored (but still replaced).
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Returns every transaction between the start and end of `range`, inclusive.
    ///
    /// `null` and malformed entries are dropped. A 404 on the first page produces an empty list;
    /// a 404 on a later page ends paging with what has been received so far. Any other failure is
    /// returned as an error.
    pub async fn transactions(&mut self, range: DateRange) -> Result<Vec<Transaction>> {
        if !self.refresh {
            if let Some(cached) = self.cache.get(range).await {
                info!("Using {} cached transactions for {range}", cached.len());
                return Ok(cached);
            }
        }

        let mut transactions = Vec::new();
        let mut page = 0;
        loop {
            let response = self
                .api
                .get_page(range, page, self.page_size)
                .await
                .with_context(|| format!("Failed to fetch transactions for {range}"))?;

            let (content, last) = match response {
                PageResponse::NotFound => {
                    debug!("Page {page} for {range} was not found");
                    break;
                }
                PageResponse::Body(PageBody::Bare(content)) => (content, true),
                PageResponse::Body(PageBody::Page { content, last }) => {
                    let short = content.len() < self.page_size as usize;
                    (content, last.unwrap_or(short))
                }
            };

            let received = content.len();
            transactions.extend(parse_entries(content));
            // An empty page that claims to not be the last would otherwise loop forever.
            if last || received == 0 {
                break;
            }
            page += 1;
        }

        info!(
            "Fetched {} transactions for {range} in {} page(s)",
            transactions.len(),
            page + 1
        );

        if let Err(e) = self.cache.put(range, &transactions).await {
            warn!("Unable to cache transactions: {e:#}");
        }
        Ok(transactions)
    }
}

/// Decodes the entries of one page, dropping the ones that are not transactions.
fn parse_entries(content: Vec<Value>) -> impl Iterator<Item = Transaction> {
    content.into_iter().enumerate().filter_map(|(ix, value)| {
        let transaction = Transaction::from_value(value);
        if transaction.is_none() {
            debug!("Dropping entry {ix} of the page, it is not a transaction");
        }
        transaction
    })
}
