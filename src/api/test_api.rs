//! Implements the `Api` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a backend. See `TRENDS_IN_TEST_MODE`.

use crate::api::{Api, DateRange, PageBody, PageResponse};
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::io::Cursor;

/// An implementation of the `Api` trait that does not use the network. It holds raw transaction
/// JSON in memory and serves it in pages the way the real date-range endpoint does, including a
/// 404 when nothing falls in the requested range.
#[derive(Debug, Clone)]
pub struct TestApi {
    rows: Vec<Value>,
    requests: Vec<(DateRange, u32, u32)>,
}

impl TestApi {
    /// Create a new `TestApi` serving `rows`. Rows may be `null` or malformed; they are served
    /// as-is, and rows without a parseable date are never in range.
    pub fn new(rows: Vec<Value>) -> Self {
        Self {
            rows,
            requests: Vec::new(),
        }
    }

    /// Every `(range, page, size)` requested so far.
    pub fn requests(&self) -> &[(DateRange, u32, u32)] {
        &self.requests
    }
}

#[async_trait::async_trait]
impl Api for TestApi {
    async fn get_page(&mut self, range: DateRange, page: u32, size: u32) -> Result<PageResponse> {
        self.requests.push((range, page, size));
        let matching: Vec<&Value> = self
            .rows
            .iter()
            .filter(|row| row_date(row).is_some_and(|date| range.contains(date)))
            .collect();
        if matching.is_empty() {
            return Ok(PageResponse::NotFound);
        }

        let size = size.max(1) as usize;
        let start = (page as usize).saturating_mul(size);
        let content: Vec<Value> = matching
            .iter()
            .skip(start)
            .take(size)
            .map(|row| (*row).clone())
            .collect();
        let last = start.saturating_add(size) >= matching.len();
        Ok(PageResponse::Body(PageBody::Page {
            content,
            last: Some(last),
        }))
    }
}

fn row_date(row: &Value) -> Option<NaiveDate> {
    let date = row.get("date")?.as_str()?;
    NaiveDate::parse_from_str(date.get(..10)?, "%Y-%m-%d").ok()
}

impl Default for TestApi {
    /// Loads seed data from this module.
    fn default() -> Self {
        // The seed data is a constant in this file, a parse failure is a programming error.
        Self::new(load_csv(TRANSACTION_DATA).expect("seed transaction data is valid CSV"))
    }
}

/// Loads transaction rows from a CSV-formatted string into the JSON shape the API returns.
fn load_csv(csv_data: &str) -> Result<Vec<Value>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.context("Invalid seed transaction row")?;
        let field = |ix: usize| record.get(ix).unwrap_or_default();
        rows.push(json!({
            "id": field(0),
            "date": field(1),
            "accountName": field(2),
            "category": field(3),
            "amount": field(4),
            "type": field(5),
            "state": field(6),
        }));
    }
    Ok(rows)
}

/// Seed transaction data.
const TRANSACTION_DATA: &str = r##"id,date,accountName,category,amount,type,state
1001,2025-08-02,Credit Card 1,Groceries,-$92.14,EXPENSE,POSTED
1002,2025-08-05,Credit Card 1,Restaurants,-$38.20,EXPENSE,POSTED
1003,2025-08-09,Checking 1,Utilities,-$131.02,EXPENSE,POSTED
1004,2025-08-15,Checking 1,Rent,"-$1,450.00",EXPENSE,POSTED
1005,2025-08-21,Credit Card 1,Gas & Fuel,-$47.80,EXPENSE,POSTED
1006,2025-08-28,Checking 1,Credit Card Payment,-$500.00,TRANSFER,POSTED
1007,2025-09-03,Credit Card 1,Groceries,-$110.45,EXPENSE,POSTED
1008,2025-09-06,Credit Card 1,Restaurants,-$64.90,EXPENSE,POSTED
1009,2025-09-10,Checking 1,Utilities,-$128.77,EXPENSE,POSTED
1010,2025-09-15,Checking 1,Rent,"-$1,450.00",EXPENSE,POSTED
1011,2025-09-18,Credit Card 1,Shopping,-$215.00,EXPENSE,POSTED
1012,2025-09-22,Credit Card 1,Shopping,$40.00,REFUND,POSTED
1013,2025-09-27,Checking 1,Credit Card Payment,-$650.00,TRANSFER,POSTED
1014,2025-10-01,Credit Card 1,Groceries,-$87.43,EXPENSE,POSTED
1015,2025-10-04,Credit Card 1,Coffee Shops,-$6.75,EXPENSE,POSTED
1016,2025-10-07,Credit Card 1,Gas & Fuel,-$52.30,EXPENSE,POSTED
1017,2025-10-09,Checking 1,Utilities,-$142.67,EXPENSE,POSTED
1018,2025-10-12,Credit Card 1,Restaurants,-$14.85,EXPENSE,POSTED
1019,2025-10-15,Checking 1,Rent,"-$1,450.00",EXPENSE,POSTED
1020,2025-10-17,Credit Card 1,Groceries,-$63.21,EXPENSE,PENDING
1021,2025-10-20,Credit Card 1,Entertainment,-$45.00,EXPENSE,PENDING
1022,2025-10-24,Checking 1,Credit Card Payment,-$400.00,TRANSFER,POSTED
"##;
