//! Configuration file handling for spend-trends.
//!
//! The configuration file is stored at `$TRENDS_HOME/config.json` and holds the URL of the
//! transaction API, the page size used when fetching and whether responses are cached.

use crate::api::{Cache, DEFAULT_PAGE_SIZE};
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "spend-trends";
const CONFIG_VERSION: u8 = 1;
const CACHE_DIR: &str = ".cache";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$TRENDS_HOME` and from there it loads `$TRENDS_HOME/config.json`. It provides
/// paths to other items that are expected in a certain location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    cache_dir: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    api_url: Url,
}

impl Config {
    /// Creates the home directory, its cache directory when `cache_enabled` is set, and an
    /// initial `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the home directory, e.g. `$HOME/trends`
    /// - `api_url` - The base URL of the transaction API, e.g. `https://money.example.com`
    /// - `page_size` - How many transactions to request per page. Defaults to 100.
    /// - `cache_enabled` - Whether fetched transactions are kept on disk between runs.
    ///
    /// # Errors
    /// - Returns an error if the URL is invalid or any file operations fail.
    pub async fn create(
        dir: impl Into<PathBuf>,
        api_url: &str,
        page_size: Option<u32>,
        cache_enabled: bool,
    ) -> Result<Self> {
        let url = parse_api_url(api_url)?;
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        ensure!(page_size > 0, "The page size must be greater than zero");

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the trends home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let cache_dir = root.join(CACHE_DIR);
        if cache_enabled {
            utils::make_dir(&cache_dir).await?;
        }

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            api_url: url.to_string(),
            page_size,
            cache_enabled,
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            cache_dir,
            config_path,
            config_file,
            api_url: url,
        })
    }

    /// This will
    /// - validate that `trends_home` exists and that the config file exists
    /// - load and validate the config file
    /// - create the cache directory if it has gone missing
    /// - return the loaded configuration object
    pub async fn load(trends_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = trends_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Trends Home is missing, run `trends init` first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let api_url = parse_api_url(&config_file.api_url)
            .with_context(|| format!("Invalid api_url in {}", config_path.display()))?;

        let cache_dir = root.join(CACHE_DIR);
        if config_file.cache_enabled && !cache_dir.is_dir() {
            utils::make_dir(&cache_dir).await?;
        }

        Ok(Self {
            root,
            cache_dir,
            config_path,
            config_file,
            api_url,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn page_size(&self) -> u32 {
        self.config_file.page_size
    }

    pub fn cache_enabled(&self) -> bool {
        self.config_file.cache_enabled
    }

    /// The response cache described by this config, keyed by the API URL. It is disabled when
    /// `cache_enabled` is false.
    pub fn cache(&self) -> Cache {
        if self.cache_enabled() {
            Cache::new(&self.cache_dir, self.api_url.as_str())
        } else {
            Cache::disabled()
        }
    }
}

/// Parses `s` and requires an `http` or `https` scheme.
fn parse_api_url(s: &str) -> Result<Url> {
    let url = Url::parse(s).with_context(|| format!("Unable to parse the API URL '{s}'"))?;
    ensure!(
        matches!(url.scheme(), "http" | "https"),
        "The API URL must use http or https, got '{}'",
        url.scheme()
    );
    Ok(url)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "spend-trends",
///   "config_version": 1,
///   "api_url": "https://money.example.com/",
///   "page_size": 100,
///   "cache_enabled": false
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "spend-trends"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the transaction API
    api_url: String,

    /// Number of transactions requested per page
    #[serde(default = "default_page_size")]
    page_size: u32,

    /// Whether fetched transactions are cached in `$TRENDS_HOME/.cache`. Cached ranges are not
    /// refreshed until `--refresh` or `cache clear`.
    #[serde(default)]
    cache_enabled: bool,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            cache_enabled: false,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            config.page_size > 0,
            "Invalid page_size in config file: it must be greater than zero"
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }
}
