use anyhow::bail;
use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::calendar;
use crate::market_data::{DailyBar, MarketData};
use crate::providers::util::{RetryPolicy, with_retry};
use crate::symbol;

#[derive(Debug, Clone, Copy)]
enum PriceField {
    Open,
    Close,
}

impl PriceField {
    fn as_str(self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::Close => "close",
        }
    }
}

/// Year-to-date performance report for a user-supplied symbol. Every failure
/// path renders as a reply string; nothing propagates.
pub async fn run(
    client: &dyn MarketData,
    today: NaiveDate,
    raw_symbol: &str,
    retry: RetryPolicy,
) -> String {
    let symbol = match symbol::validate(client, raw_symbol).await {
        Ok(symbol) => symbol,
        Err(reply) => return reply,
    };
    info!(%symbol, "Calculating YTD performance");

    let (first, last) = tokio::join!(
        calendar::first_trading_date(client, today),
        calendar::last_trading_date(client, today),
    );
    let Some(first) = first else {
        return format!(
            "\nCould not determine the first trading date of the year for {}.\n",
            symbol.to_uppercase()
        );
    };
    let Some(last) = last else {
        return format!(
            "\nCould not determine the most recent trading date for {}.\n",
            symbol.to_uppercase()
        );
    };
    info!(%first, %last, "Resolved trading date boundaries");

    let (open, close) = tokio::join!(
        fetch_price(client, &symbol, first, PriceField::Open, retry),
        fetch_price(client, &symbol, last, PriceField::Close, retry),
    );
    let (Some(open), Some(close)) = (open, close) else {
        error!(%symbol, %first, %last, "Pricing data unavailable after retries");
        return format!(
            "\nCould not retrieve pricing data for {} after multiple attempts.\n",
            symbol.to_uppercase()
        );
    };

    if open == 0.0 {
        error!(%symbol, %first, "Opening price is zero, YTD change undefined");
        return format!(
            "\nCannot calculate YTD for {} as opening price on {} was zero.\n",
            symbol.to_uppercase(),
            first
        );
    }

    let percent_change = (close / open - 1.0) * 100.0;
    // Zero change reports as down.
    let indicator = if percent_change > 0.0 { "🔼" } else { "🔽" };
    format!(
        "\n<a href=\"https://robinhood.com/stocks/{0}\">{0}</a> is {1} {2:.2} % this year\n",
        symbol.to_uppercase(),
        indicator,
        percent_change
    )
}

/// One price point with bounded retries. Transport errors, malformed bodies,
/// and responses without a usable price all consume an attempt.
async fn fetch_price(
    client: &dyn MarketData,
    symbol: &str,
    date: NaiveDate,
    field: PriceField,
    retry: RetryPolicy,
) -> Option<f64> {
    let result = with_retry(
        || async move {
            let bar = client.open_close(symbol, date).await?;
            extract_price(&bar, field)
        },
        retry.max_attempts,
        retry.backoff,
    )
    .await;

    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!(%symbol, %date, field = field.as_str(), error = %e, "All price fetch attempts failed");
            None
        }
    }
}

/// Lenient extraction: a non-"OK" status still yields the price when the
/// field is present and the status is not an explicit NOT_FOUND.
fn extract_price(bar: &DailyBar, field: PriceField) -> anyhow::Result<f64> {
    let value = match field {
        PriceField::Open => bar.open,
        PriceField::Close => bar.close,
    };
    let status = bar.status.as_deref();

    match (status, value) {
        (Some("OK"), Some(price)) => Ok(price),
        (status, Some(price)) if status != Some("NOT_FOUND") => {
            warn!(?status, field = field.as_str(), "Accepting price despite non-OK status");
            Ok(price)
        }
        (status, _) => bail!(
            "status {:?} without a usable '{}' price",
            status,
            field.as_str()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::{MarketDataError, MarketStatus, TickerRecord};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    const RETRY: RetryPolicy = RetryPolicy {
        max_attempts: 3,
        backoff: Duration::ZERO,
    };

    /// Fake market where every weekday is open, the symbol always validates,
    /// and open-close responses come from a per-date script. Each scripted
    /// entry is a queue so transient failures can precede a success.
    struct FakeMarket {
        bars: Mutex<HashMap<NaiveDate, Vec<Result<DailyBar, ()>>>>,
        fetch_calls: Mutex<usize>,
    }

    impl FakeMarket {
        fn new(bars: impl IntoIterator<Item = (&'static str, Vec<Result<DailyBar, ()>>)>) -> Self {
            FakeMarket {
                bars: Mutex::new(
                    bars.into_iter()
                        .map(|(date, queue)| (date.parse().unwrap(), queue))
                        .collect(),
                ),
                fetch_calls: Mutex::new(0),
            }
        }
    }

    fn ok_bar(open: Option<f64>, close: Option<f64>) -> Result<DailyBar, ()> {
        Ok(DailyBar {
            status: Some("OK".to_string()),
            open,
            close,
        })
    }

    #[async_trait]
    impl MarketData for FakeMarket {
        async fn lookup_ticker(
            &self,
            symbol: &str,
        ) -> Result<Option<TickerRecord>, MarketDataError> {
            Ok(Some(TickerRecord {
                ticker: symbol.to_string(),
                name: None,
                description: None,
            }))
        }

        async fn market_status(&self, date: NaiveDate) -> Result<MarketStatus, MarketDataError> {
            // Scripted dates are open trading days; everything else closed.
            if self.bars.lock().unwrap().contains_key(&date) {
                Ok(MarketStatus::Open)
            } else {
                Ok(MarketStatus::Closed)
            }
        }

        async fn open_close(
            &self,
            _symbol: &str,
            date: NaiveDate,
        ) -> Result<DailyBar, MarketDataError> {
            *self.fetch_calls.lock().unwrap() += 1;
            let mut bars = self.bars.lock().unwrap();
            let queue = bars
                .get_mut(&date)
                .expect("open_close called for unscripted date");
            let next = if queue.len() > 1 {
                queue.remove(0)
            } else {
                queue[0].clone()
            };
            next.map_err(|()| MarketDataError::Network("transient failure".into()))
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    // 2025-01-02 is the first scripted weekday of 2025; 2025-03-14 is a
    // Friday, used as "today" so the backward walk resolves immediately.
    const TODAY: &str = "2025-03-14";

    #[tokio::test]
    async fn reports_gain_with_up_indicator() {
        let market = FakeMarket::new([
            ("2025-01-02", vec![ok_bar(Some(150.0), Some(155.0))]),
            ("2025-03-14", vec![ok_bar(Some(175.0), Some(180.0))]),
        ]);

        let reply = run(&market, date(TODAY), "AAPL", RETRY).await;
        assert!(reply.contains("AAPL"), "reply was: {reply}");
        assert!(reply.contains("🔼"), "reply was: {reply}");
        assert!(reply.contains("20.00"), "reply was: {reply}");
        assert!(reply.contains("https://robinhood.com/stocks/AAPL"));
    }

    #[tokio::test]
    async fn zero_change_reports_down() {
        let market = FakeMarket::new([
            ("2025-01-02", vec![ok_bar(Some(150.0), Some(150.0))]),
            ("2025-03-14", vec![ok_bar(Some(150.0), Some(150.0))]),
        ]);

        let reply = run(&market, date(TODAY), "AAPL", RETRY).await;
        assert!(reply.contains("🔽"), "reply was: {reply}");
        assert!(reply.contains("0.00"), "reply was: {reply}");
    }

    #[tokio::test]
    async fn zero_opening_price_is_rejected() {
        let market = FakeMarket::new([
            ("2025-01-02", vec![ok_bar(Some(0.0), Some(1.0))]),
            ("2025-03-14", vec![ok_bar(Some(170.0), Some(180.0))]),
        ]);

        let reply = run(&market, date(TODAY), "AAPL", RETRY).await;
        assert!(reply.contains("zero"), "reply was: {reply}");
        assert!(reply.contains("AAPL"), "reply was: {reply}");
        assert!(!reply.contains('%'), "no percentage should be computed: {reply}");
    }

    #[tokio::test]
    async fn lowercase_and_dollar_input_reports_uppercase() {
        let market = FakeMarket::new([
            ("2025-01-02", vec![ok_bar(Some(100.0), Some(101.0))]),
            ("2025-03-14", vec![ok_bar(Some(109.0), Some(110.0))]),
        ]);

        let reply = run(&market, date(TODAY), "$aapl", RETRY).await;
        assert!(reply.contains("AAPL"), "reply was: {reply}");
        assert!(reply.contains("10.00"), "reply was: {reply}");
    }

    #[tokio::test]
    async fn price_fetch_recovers_after_two_transient_failures() {
        let market = FakeMarket::new([
            (
                "2025-01-02",
                vec![Err(()), Err(()), ok_bar(Some(150.0), Some(155.0))],
            ),
            ("2025-03-14", vec![ok_bar(Some(175.0), Some(180.0))]),
        ]);

        let reply = run(&market, date(TODAY), "AAPL", RETRY).await;
        assert!(reply.contains("20.00"), "reply was: {reply}");
    }

    #[tokio::test]
    async fn price_fetch_fails_after_three_failures() {
        let market = FakeMarket::new([
            ("2025-01-02", vec![Err(())]),
            ("2025-03-14", vec![ok_bar(Some(175.0), Some(180.0))]),
        ]);

        let reply = run(&market, date(TODAY), "AAPL", RETRY).await;
        assert!(
            reply.contains("Could not retrieve pricing data for AAPL"),
            "reply was: {reply}"
        );
    }

    #[test]
    fn lenient_extraction_accepts_delayed_status() {
        let bar = DailyBar {
            status: Some("DELAYED".to_string()),
            open: Some(150.0),
            close: None,
        };
        assert_eq!(extract_price(&bar, PriceField::Open).unwrap(), 150.0);
    }

    #[test]
    fn extraction_rejects_not_found_even_with_price() {
        let bar = DailyBar {
            status: Some("NOT_FOUND".to_string()),
            open: Some(150.0),
            close: None,
        };
        assert!(extract_price(&bar, PriceField::Open).is_err());
    }

    #[test]
    fn extraction_rejects_missing_field() {
        let bar = DailyBar {
            status: Some("OK".to_string()),
            open: None,
            close: Some(180.0),
        };
        assert!(extract_price(&bar, PriceField::Open).is_err());
    }
}
