use crate::api::Mode;
use crate::args::ReportArgs;
use crate::commands::fetch::load_transactions;
use crate::commands::{date_range, Out};
use crate::model::Amount;
use crate::trends::SpendingTrends;
use crate::{Config, Result};
use rust_decimal::Decimal;
use std::fmt::Write;
use tracing::debug;

/// Downloads the transactions in the date range and computes their spending trends. The message
/// is a human-readable summary, the structure is the full `SpendingTrends`.
pub async fn report(config: &Config, mode: Mode, args: &ReportArgs) -> Result<Out<SpendingTrends>> {
    let range = date_range(args.range())?;
    let transactions = load_transactions(config, mode, args.range()).await?;
    let filters = args.filters();
    debug!("Computing trends for {} transactions with {filters:?}", transactions.len());

    let trends = SpendingTrends::compute(&transactions, &filters, args.top());
    let mut message = format!("Spending trends for {range}");
    summarize(&mut message, &trends)?;
    Ok(Out::new(message, trends))
}

fn summarize(out: &mut String, trends: &SpendingTrends) -> std::fmt::Result {
    let Some(current) = trends.current() else {
        out.push_str("\nNo spending found");
        return Ok(());
    };

    for month in &trends.months {
        write!(
            out,
            "\n  {}: {} across {} transaction(s)",
            month.year_month(),
            money(month.total_spend()),
            month.transaction_count()
        )?;
    }

    if let Some(comparison) = &trends.comparison {
        let previous = trends
            .previous_month
            .unwrap_or_else(|| current.year_month().previous());
        write!(
            out,
            "\nChange from {previous} to {}: {} ({})",
            current.year_month(),
            signed_money(comparison.absolute_change),
            percent(comparison.percentage_change)
        )?;
    }

    if !trends.top_categories.is_empty() {
        write!(out, "\nTop categories in {}:", current.year_month())?;
        for share in &trends.top_categories {
            write!(
                out,
                "\n  {}: {} ({} of spending)",
                share.category,
                money(share.amount),
                share
                    .percentage
                    .map(|p| format!("{}%", p.round_dp(1).normalize()))
                    .unwrap_or_else(|| "n/a".to_string())
            )?;
        }
    }

    if !trends.category_changes.is_empty() {
        out.push_str("\nCategory changes:");
        for change in &trends.category_changes {
            write!(
                out,
                "\n  {}: {} -> {}, {} ({})",
                change.category,
                money(change.previous_amount),
                money(change.current_amount),
                signed_money(change.absolute_change),
                percent(change.percentage_change)
            )?;
        }
    }
    Ok(())
}

fn money(value: Decimal) -> String {
    Amount::new(value).to_string()
}

fn signed_money(value: Decimal) -> String {
    if value.is_sign_positive() && !value.is_zero() {
        format!("+{}", money(value))
    } else {
        money(value)
    }
}

/// A percentage change rounded to one decimal place, or `n/a` when it is not defined.
fn percent(value: Option<Decimal>) -> String {
    match value {
        None => "n/a".to_string(),
        Some(p) => {
            let p = p.round_dp(1).normalize();
            if p.is_sign_positive() && !p.is_zero() {
                format!("+{p}%")
            } else {
                format!("{p}%")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::RangeArgs;
    use crate::test::TestEnv;
    use crate::trends::{diff_mom, MonthlySpending};
    use chrono::NaiveDate;
    use clap::Parser;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn report_args(extra: &[&str]) -> ReportArgs {
        #[derive(Parser)]
        struct Wrapper {
            #[clap(flatten)]
            args: ReportArgs,
        }
        let base = ["report", "--start", "2025-08-01", "--end", "2025-10-31"];
        Wrapper::try_parse_from(base.iter().chain(extra.iter()))
            .unwrap()
            .args
    }

    #[tokio::test]
    async fn test_report() {
        let env = TestEnv::new().await;
        let out = report(&env.config(), Mode::Test, &report_args(&[]))
            .await
            .unwrap();
        let trends = out.structure().unwrap();

        assert_eq!(trends.months.len(), 3);
        assert_eq!(trends.current_month.unwrap().to_string(), "2025-10");
        assert_eq!(trends.previous_month.unwrap().to_string(), "2025-09");

        let comparison = trends.comparison.as_ref().unwrap();
        assert_eq!(comparison.current_amount, dec("1862.21"));
        assert_eq!(comparison.previous_amount, dec("2009.12"));
        assert_eq!(comparison.absolute_change, dec("-146.91"));

        assert_eq!(trends.top_categories.len(), 5);
        assert_eq!(trends.top_categories[0].category, "Rent");

        let message = out.message();
        assert!(message.contains("2025-10: $1,862.21 across 8 transaction(s)"), "{message}");
        assert!(message.contains("Change from 2025-09 to 2025-10: -$146.91 (-7.3%)"), "{message}");
    }

    #[tokio::test]
    async fn test_report_filters() {
        let env = TestEnv::new().await;
        let args = report_args(&[
            "--exclude-category",
            "Rent",
            "--include-transfers",
            "--exclude-refunds",
            "--top",
            "1",
        ]);
        let out = report(&env.config(), Mode::Test, &args).await.unwrap();
        let trends = out.structure().unwrap();
        let current = trends.current().unwrap();
        // October without rent, plus a $400 credit card payment
        assert_eq!(current.total_spend(), dec("812.21"));
        assert_eq!(trends.top_categories.len(), 1);
        assert_eq!(trends.top_categories[0].category, "Credit Card Payment");
        let previous = trends.previous().unwrap();
        assert_eq!(previous.categories().get("Shopping"), Some(dec("215")));
    }

    #[tokio::test]
    async fn test_report_without_data() {
        let env = TestEnv::new().await;
        let range = RangeArgs::new(
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 3, 31).unwrap(),
            false,
        );
        let out = report(&env.config(), Mode::Test, &ReportArgs::new(range))
            .await
            .unwrap();
        assert!(out.structure().unwrap().comparison.is_none());
        assert!(out.message().ends_with("No spending found"));
    }

    #[test]
    fn test_summary_single_month() {
        let month = MonthlySpending::from_categories(
            "2025-10".parse().unwrap(),
            2,
            [("Food", dec("40")), ("Fuel", dec("60"))].into_iter().collect(),
        );
        let trends = SpendingTrends {
            current_month: Some(month.year_month()),
            previous_month: None,
            comparison: Some(diff_mom(month.total_spend(), Decimal::ZERO)),
            top_categories: crate::trends::top_categories(&month, 5),
            category_changes: Vec::new(),
            months: vec![month],
        };
        let mut message = String::new();
        summarize(&mut message, &trends).unwrap();
        assert!(message.contains("Change from 2025-09 to 2025-10: +$100.00 (n/a)"), "{message}");
        assert!(message.contains("Fuel: $60.00 (60% of spending)"), "{message}");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(None), "n/a");
        assert_eq!(percent(Some(dec("50"))), "+50%");
        assert_eq!(percent(Some(dec("-7.3125"))), "-7.3%");
        assert_eq!(percent(Some(Decimal::ZERO)), "0%");
    }
}
