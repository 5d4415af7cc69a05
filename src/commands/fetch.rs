use crate::api::{self, Mode};
use crate::args::RangeArgs;
use crate::commands::{date_range, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Transaction;
use crate::{Config, Result};

/// Downloads every transaction in the date range, using the cache unless `--refresh` was given.
pub async fn fetch(config: &Config, mode: Mode, args: &RangeArgs) -> Result<Out<Vec<Transaction>>> {
    let range = date_range(args)?;
    let transactions = load_transactions(config, mode, args).await?;
    Ok(Out::new(
        format!("Fetched {} transactions for {range}", transactions.len()),
        transactions,
    ))
}

/// Creates a `Fetcher` from `config` and downloads the transactions for `args`.
pub(super) async fn load_transactions(
    config: &Config,
    mode: Mode,
    args: &RangeArgs,
) -> Result<Vec<Transaction>> {
    let range = date_range(args)?;
    let mut fetcher = api::fetcher(config, mode)
        .pub_result(ErrorType::Request)?
        .refresh(args.refresh());
    fetcher
        .transactions(range)
        .await
        .pub_result(ErrorType::Request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_fetch() {
        let env = TestEnv::new().await;
        let out = fetch(&env.config(), Mode::Test, &env.range_args())
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().len(), 22);
        assert!(out.message().contains("22 transactions"));
    }

    #[tokio::test]
    async fn test_fetch_outside_data_is_empty() {
        let env = TestEnv::new().await;
        let args = RangeArgs::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 31).unwrap(),
            false,
        );
        let out = fetch(&env.config(), Mode::Test, &args).await.unwrap();
        assert!(out.structure().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_backend() {
        let env = TestEnv::with_api_url("http://127.0.0.1:1").await;
        let err = fetch(&env.config(), Mode::Http, &env.range_args())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "request error");
    }
}
