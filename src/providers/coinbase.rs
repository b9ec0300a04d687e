use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, instrument};

use crate::spot_price::{SpotError, SpotPrice, SpotQuote};

/// Client for the Coinbase spot-price endpoint. Unauthenticated.
pub struct CoinbaseClient {
    client: reqwest::Client,
    base_url: String,
}

impl CoinbaseClient {
    pub fn new(base_url: &str) -> Self {
        CoinbaseClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SpotResponse {
    data: Option<SpotData>,
}

#[derive(Debug, Deserialize)]
struct SpotData {
    currency: Option<String>,
    // Coinbase returns the amount as a decimal string.
    amount: Option<String>,
}

#[async_trait]
impl SpotPrice for CoinbaseClient {
    #[instrument(name = "CoinbaseSpotFetch", skip(self), fields(base = %base, quote = %quote))]
    async fn spot(&self, base: &str, quote: &str) -> Result<SpotQuote, SpotError> {
        let url = format!("{}/v2/prices/{}-{}/spot", self.base_url, base, quote);
        debug!("Requesting spot price from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SpotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SpotError::Network(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| SpotError::Network(e.to_string()))?;

        let parsed: SpotResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = ?e, response = %text, "Failed to parse spot price response");
            SpotError::Format(e.to_string())
        })?;

        let data = parsed.data.ok_or(SpotError::Incomplete)?;
        let (Some(currency), Some(amount)) = (data.currency, data.amount) else {
            return Err(SpotError::Incomplete);
        };

        let value: f64 = amount
            .parse()
            .map_err(|_| SpotError::InvalidAmount(amount.clone()))?;

        Ok(SpotQuote {
            currency,
            amount: value,
        })
    }
}
