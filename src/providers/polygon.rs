use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};

use crate::market_data::{DailyBar, MarketData, MarketDataError, MarketStatus, TickerRecord};

/// Proxy ticker used for market-status probes. Liquid enough that a missing
/// daily bar means the market was closed, not that the symbol lacked data.
const STATUS_PROXY_TICKER: &str = "AAPL";

/// Client for the Polygon reference and daily open-close endpoints.
pub struct PolygonClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PolygonClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        PolygonClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn get_text(&self, url: &str) -> Result<String, MarketDataError> {
        debug!("Requesting {}", url);
        let response = self
            .client
            .get(url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| MarketDataError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MarketDataError::Network(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::Network(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ReferenceResponse {
    status: Option<String>,
    results: Option<ReferenceResults>,
}

#[derive(Debug, Deserialize)]
struct ReferenceResults {
    ticker: Option<String>,
    name: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenCloseResponse {
    status: Option<String>,
    open: Option<f64>,
    close: Option<f64>,
}

#[async_trait]
impl MarketData for PolygonClient {
    #[instrument(name = "PolygonTickerLookup", skip(self), fields(symbol = %symbol))]
    async fn lookup_ticker(&self, symbol: &str) -> Result<Option<TickerRecord>, MarketDataError> {
        let url = format!("{}/v3/reference/tickers/{}", self.base_url, symbol);
        let text = self.get_text(&url).await?;

        let parsed: ReferenceResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = ?e, response = %text, "Failed to parse ticker reference response");
            MarketDataError::Format(e.to_string())
        })?;

        if parsed.status.as_deref() == Some("NOT_FOUND") {
            return Ok(None);
        }

        Ok(parsed.results.map(|r| TickerRecord {
            ticker: r.ticker.unwrap_or_else(|| symbol.to_string()),
            name: r.name,
            description: r.description,
        }))
    }

    #[instrument(name = "PolygonMarketStatus", skip(self), fields(date = %date))]
    async fn market_status(&self, date: NaiveDate) -> Result<MarketStatus, MarketDataError> {
        let bar = self.open_close(STATUS_PROXY_TICKER, date).await?;

        // "OK" with a real open price means the market traded that day. A
        // null or absent open is not evidence of an open market.
        Ok(match (bar.status.as_deref(), bar.open) {
            (Some("OK"), Some(_)) => MarketStatus::Open,
            (Some("NOT_FOUND"), _) => MarketStatus::Closed,
            (status, _) => {
                warn!(?status, %date, "Ambiguous market status, treating as not open");
                MarketStatus::Unknown
            }
        })
    }

    #[instrument(name = "PolygonOpenClose", skip(self), fields(symbol = %symbol, date = %date))]
    async fn open_close(&self, symbol: &str, date: NaiveDate) -> Result<DailyBar, MarketDataError> {
        let url = format!(
            "{}/v1/open-close/{}/{}?adjusted=true",
            self.base_url,
            symbol,
            date.format("%Y-%m-%d")
        );
        let text = self.get_text(&url).await?;

        let parsed: OpenCloseResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = ?e, response = %text, "Failed to parse open-close response");
            MarketDataError::Format(e.to_string())
        })?;

        Ok(DailyBar {
            status: parsed.status,
            open: parsed.open,
            close: parsed.close,
        })
    }
}
