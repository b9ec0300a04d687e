use tracing::{info, warn};

use crate::market_data::{MarketData, MarketDataError};
use crate::symbol;

/// Company description report for a user-supplied symbol. An absent
/// description is a normal outcome, not an error; network and format
/// failures get their own distinguishable reply text.
pub async fn run(client: &dyn MarketData, raw_symbol: &str) -> String {
    let symbol = match symbol::validate(client, raw_symbol).await {
        Ok(symbol) => symbol,
        Err(reply) => return reply,
    };
    info!(%symbol, "Fetching company description");

    match client.lookup_ticker(&symbol).await {
        Ok(Some(record)) => match record.description {
            Some(description) if !description.is_empty() => {
                format!("\n<b>{}</b>\n{}\n", symbol.to_uppercase(), description)
            }
            _ => {
                warn!(%symbol, "Reference record has no description");
                format!("\nNo description found for {}.\n", symbol.to_uppercase())
            }
        },
        Ok(None) => format!("\nNo description found for {}.\n", symbol.to_uppercase()),
        Err(MarketDataError::Network(e)) => {
            warn!(%symbol, error = %e, "Description fetch failed on transport");
            format!(
                "\nCould not fetch description for {} due to a network issue.\n",
                symbol.to_uppercase()
            )
        }
        Err(MarketDataError::Format(e)) => {
            warn!(%symbol, error = %e, "Description fetch returned malformed data");
            format!(
                "\nError processing company description data for {}.\n",
                symbol.to_uppercase()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::{DailyBar, MarketStatus, TickerRecord};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    /// Fake where the first lookup (validation) succeeds and subsequent
    /// lookups follow a script, mirroring the double-lookup flow.
    struct FakeReference {
        responses: Mutex<Vec<Result<Option<TickerRecord>, MarketDataError>>>,
    }

    impl FakeReference {
        fn new(responses: Vec<Result<Option<TickerRecord>, MarketDataError>>) -> Self {
            FakeReference {
                responses: Mutex::new(responses),
            }
        }
    }

    fn record(description: Option<&str>) -> TickerRecord {
        TickerRecord {
            ticker: "AAPL".to_string(),
            name: Some("Apple Inc.".to_string()),
            description: description.map(str::to_string),
        }
    }

    #[async_trait]
    impl MarketData for FakeReference {
        async fn lookup_ticker(
            &self,
            _symbol: &str,
        ) -> Result<Option<TickerRecord>, MarketDataError> {
            let mut responses = self.responses.lock().unwrap();
            responses.remove(0)
        }

        async fn market_status(
            &self,
            _date: NaiveDate,
        ) -> Result<MarketStatus, MarketDataError> {
            unimplemented!("not used by describe")
        }

        async fn open_close(
            &self,
            _symbol: &str,
            _date: NaiveDate,
        ) -> Result<DailyBar, MarketDataError> {
            unimplemented!("not used by describe")
        }
    }

    #[tokio::test]
    async fn pairs_symbol_with_description() {
        let market = FakeReference::new(vec![
            Ok(Some(record(None))),
            Ok(Some(record(Some("Apple designs consumer electronics.")))),
        ]);

        let reply = run(&market, "$aapl").await;
        assert_eq!(
            reply,
            "\n<b>AAPL</b>\nApple designs consumer electronics.\n"
        );
    }

    #[tokio::test]
    async fn missing_description_is_a_normal_outcome() {
        let market = FakeReference::new(vec![Ok(Some(record(None))), Ok(Some(record(None)))]);

        let reply = run(&market, "AAPL").await;
        assert_eq!(reply, "\nNo description found for AAPL.\n");
    }

    #[tokio::test]
    async fn unknown_symbol_echoes_original_input() {
        let market = FakeReference::new(vec![Ok(None)]);

        let reply = run(&market, "$NOPE").await;
        assert!(reply.contains("'$NOPE' not found"), "reply was: {reply}");
    }

    #[tokio::test]
    async fn network_failure_gets_its_own_reply() {
        let market = FakeReference::new(vec![
            Ok(Some(record(None))),
            Err(MarketDataError::Network("timeout".into())),
        ]);

        let reply = run(&market, "AAPL").await;
        assert!(reply.contains("network issue"), "reply was: {reply}");
    }

    #[tokio::test]
    async fn format_failure_gets_its_own_reply() {
        let market = FakeReference::new(vec![
            Ok(Some(record(None))),
            Err(MarketDataError::Format("bad json".into())),
        ]);

        let reply = run(&market, "AAPL").await;
        assert!(
            reply.contains("Error processing company description data"),
            "reply was: {reply}"
        );
    }
}
