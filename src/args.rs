//! These structs provide the CLI interface for the trends CLI.

use crate::trends::{TrendFilters, DEFAULT_TOP_CATEGORIES};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing::level_filters::LevelFilter;

/// trends: month-over-month spending trends for your personal finance data.
///
/// The purpose of this program is to download your transactions from a personal finance backend
/// (the `/api/transaction/date-range` endpoint) and summarize them: spending per calendar month,
/// the change from the previous month, your biggest categories and how each category moved.
///
/// Start with `trends init --api-url <URL>`, then run `trends report --start <DATE> --end <DATE>`.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. Decide what directory you want to store data in
    /// and pass this as --trends-home. By default, it will be $HOME/trends.
    Init(InitArgs),
    /// Download the transactions in a date range and print them as JSON.
    Fetch(FetchArgs),
    /// Print month-over-month spending trends for a date range.
    Report(ReportArgs),
    /// Manage the local cache of downloaded transactions.
    Cache(CacheArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where trends data and configuration is held. Defaults to ~/trends
    #[arg(long, env = "TRENDS_HOME", default_value_t = default_trends_home())]
    trends_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, trends_home: PathBuf) -> Self {
        Self {
            log_level,
            trends_home: trends_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn trends_home(&self) -> &DisplayPath {
        &self.trends_home
    }
}

/// Args for the `trends init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of your transaction API, e.g. https://money.example.com
    #[arg(long)]
    api_url: String,

    /// How many transactions to request per page. Defaults to 100.
    #[arg(long)]
    page_size: Option<u32>,

    /// Keep downloaded transactions in $TRENDS_HOME/.cache and reuse them for the same date range.
    /// Cached ranges are not refreshed until you pass --refresh or run `trends cache clear`.
    #[arg(long)]
    cache: bool,
}

impl InitArgs {
    pub fn new(api_url: impl Into<String>, page_size: Option<u32>, cache: bool) -> Self {
        Self {
            api_url: api_url.into(),
            page_size,
            cache,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    pub fn cache(&self) -> bool {
        self.cache
    }
}

/// The date range shared by `fetch` and `report`.
#[derive(Debug, Parser, Clone)]
pub struct RangeArgs {
    /// The first day to include, as YYYY-MM-DD.
    #[arg(long)]
    start: NaiveDate,

    /// The last day to include, as YYYY-MM-DD.
    #[arg(long)]
    end: NaiveDate,

    /// Ignore cached transactions and download them again.
    #[arg(long)]
    refresh: bool,
}

impl RangeArgs {
    pub fn new(start: NaiveDate, end: NaiveDate, refresh: bool) -> Self {
        Self {
            start,
            end,
            refresh,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn refresh(&self) -> bool {
        self.refresh
    }
}

/// Args for the `trends fetch` command.
#[derive(Debug, Parser, Clone)]
pub struct FetchArgs {
    #[clap(flatten)]
    range: RangeArgs,
}

impl FetchArgs {
    pub fn new(range: RangeArgs) -> Self {
        Self { range }
    }

    pub fn range(&self) -> &RangeArgs {
        &self.range
    }
}

/// Args for the `trends report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    #[clap(flatten)]
    range: RangeArgs,

    /// Only count transactions from this account. May be repeated.
    #[arg(long = "account")]
    accounts: Vec<String>,

    /// Only count transactions in this category. May be repeated.
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Do not count transactions in this category. May be repeated.
    #[arg(long = "exclude-category")]
    exclude_categories: Vec<String>,

    /// Count transfers between accounts as spending.
    #[arg(long)]
    include_transfers: bool,

    /// Do not count refunds.
    #[arg(long)]
    exclude_refunds: bool,

    /// How many categories to rank.
    #[arg(long, default_value_t = DEFAULT_TOP_CATEGORIES)]
    top: usize,
}

impl ReportArgs {
    pub fn new(range: RangeArgs) -> Self {
        Self {
            range,
            accounts: Vec::new(),
            categories: Vec::new(),
            exclude_categories: Vec::new(),
            include_transfers: false,
            exclude_refunds: false,
            top: DEFAULT_TOP_CATEGORIES,
        }
    }

    pub fn range(&self) -> &RangeArgs {
        &self.range
    }

    pub fn top(&self) -> usize {
        self.top
    }

    /// The `TrendFilters` described by these arguments.
    pub fn filters(&self) -> TrendFilters {
        TrendFilters::new()
            .accounts(&self.accounts)
            .categories(&self.categories)
            .exclude_categories(&self.exclude_categories)
            .include_transfers(self.include_transfers)
            .include_refunds(!self.exclude_refunds)
    }
}

/// Args for the `trends cache` command.
#[derive(Debug, Parser, Clone)]
pub struct CacheArgs {
    #[command(subcommand)]
    action: CacheSubcommand,
}

impl CacheArgs {
    pub fn new(action: CacheSubcommand) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &CacheSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSubcommand {
    /// Delete every cached response.
    Clear,
}

fn default_trends_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("trends"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --trends-home or TRENDS_HOME instead of relying on the default \
                trends home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("trends")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Transaction, TransactionType};

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("trends").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_init() {
        let args = parse(&[
            "--trends-home",
            "/tmp/x",
            "init",
            "--api-url",
            "http://localhost:8080",
        ]);
        assert_eq!(args.common().trends_home().path(), Path::new("/tmp/x"));
        assert_eq!(args.common().log_level(), LevelFilter::INFO);
        let Command::Init(init) = args.command() else {
            panic!("expected init");
        };
        assert_eq!(init.api_url(), "http://localhost:8080");
        assert_eq!(init.page_size(), None);
        assert!(!init.cache());
    }

    #[test]
    fn test_report() {
        let args = parse(&[
            "--log-level",
            "debug",
            "report",
            "--start",
            "2025-09-01",
            "--end",
            "2025-10-31",
            "--account",
            "Checking 1",
            "--exclude-category",
            "Rent",
            "--top",
            "3",
            "--refresh",
        ]);
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        let Command::Report(report) = args.command() else {
            panic!("expected report");
        };
        assert_eq!(report.range().start().to_string(), "2025-09-01");
        assert!(report.range().refresh());
        assert_eq!(report.top(), 3);

        let filters = report.filters();
        assert!(filters.account_filter.contains("Checking 1"));
        assert!(filters.exclude_categories.contains("Rent"));
        assert!(!filters.include_transfers);
        assert!(filters.include_refunds);

        let groceries = Transaction::new(
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            "Credit Card 1",
            "Groceries",
            Amount::from_str("-10").unwrap(),
            TransactionType::Expense,
        );
        assert!(!filters.accepts(&groceries, "Groceries"));
    }

    #[test]
    fn test_bad_date() {
        let result = Args::try_parse_from([
            "trends", "fetch", "--start", "2025-13-01", "--end", "2025-10-31",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cache_clear() {
        let args = parse(&["cache", "clear"]);
        let Command::Cache(cache) = args.command() else {
            panic!("expected cache");
        };
        assert_eq!(*cache.action(), CacheSubcommand::Clear);
    }
}
