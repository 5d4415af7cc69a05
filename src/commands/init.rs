use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and an initial `config.json` file pointing at `api_url`.
///
/// # Arguments
/// - `trends_home` - The directory that will be the root of data directory, e.g. `$HOME/trends`
/// - `api_url` - The base URL of the transaction API, e.g. `https://money.example.com`
/// - `page_size` - How many transactions to request per page, `None` for the default.
/// - `cache` - Whether to keep fetched transactions on disk between runs.
///
/// # Errors
/// - Returns an error if the URL is invalid or any file operations fail.
pub async fn init(
    trends_home: &Path,
    api_url: &str,
    page_size: Option<u32>,
    cache: bool,
) -> Result<Out<()>> {
    let config = Config::create(trends_home, api_url, page_size, cache)
        .await
        .context("Unable to create the data directory and config")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the trends directory at {}",
        config.root().display()
    )
    .into())
}
