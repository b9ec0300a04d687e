use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

/// Reference record returned for a valid ticker symbol.
#[derive(Debug, Clone)]
pub struct TickerRecord {
    pub ticker: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Market state for a single calendar date, resolved at the client boundary.
///
/// Ambiguous upstream statuses ("DELAYED" and friends) map to `Unknown`.
/// Callers must treat `Unknown` as not open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketStatus {
    Open,
    Closed,
    Unknown,
}

/// Daily open/close prices for a (symbol, date) pair.
///
/// The upstream status string is preserved so callers can apply lenient
/// extraction: accepting a present price even when the status is not the
/// canonical "OK".
#[derive(Debug, Clone)]
pub struct DailyBar {
    pub status: Option<String>,
    pub open: Option<f64>,
    pub close: Option<f64>,
}

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response format: {0}")]
    Format(String),
}

#[async_trait]
pub trait MarketData: Send + Sync {
    /// `Ok(None)` when the symbol does not exist upstream. `Err` is reserved
    /// for transport and response-format failures.
    async fn lookup_ticker(&self, symbol: &str) -> Result<Option<TickerRecord>, MarketDataError>;

    /// Whether the market traded on `date`.
    async fn market_status(&self, date: NaiveDate) -> Result<MarketStatus, MarketDataError>;

    /// Daily prices for `symbol` on `date`.
    async fn open_close(&self, symbol: &str, date: NaiveDate) -> Result<DailyBar, MarketDataError>;
}
