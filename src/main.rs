use clap::Parser;
use spend_trends::args::{Args, CacheSubcommand, Command};
use spend_trends::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().trends_home().path();

    // This allows for running the program without a backend. When TRENDS_IN_TEST_MODE is set and
    // non-zero in length, then the mode will be Mode::Test, otherwise it will be Mode::Http.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(
                home,
                init_args.api_url(),
                init_args.page_size(),
                init_args.cache(),
            )
            .await?
            .print()
        }

        Command::Fetch(fetch_args) => {
            let config = Config::load(home).await?;
            commands::fetch(&config, mode, fetch_args.range())
                .await?
                .print_json()?
        }

        Command::Report(report_args) => {
            let config = Config::load(home).await?;
            commands::report(&config, mode, report_args)
                .await?
                .print_json()?
        }

        Command::Cache(cache_args) => {
            let config = Config::load(home).await?;
            match cache_args.action() {
                CacheSubcommand::Clear => commands::cache_clear(&config).await?.print(),
            }
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                "spend_trends",
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
