use async_trait::async_trait;
use thiserror::Error;

/// A spot price for one (base asset, quote currency) pairing.
#[derive(Debug, Clone)]
pub struct SpotQuote {
    pub currency: String,
    pub amount: f64,
}

/// Failure categories for a spot fetch. The aggregator renders each kind as
/// a distinct per-pairing line, so the variants stay coarse.
#[derive(Debug, Error)]
pub enum SpotError {
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response format: {0}")]
    Format(String),
    #[error("incomplete price data")]
    Incomplete,
    #[error("invalid price amount: {0}")]
    InvalidAmount(String),
}

#[async_trait]
pub trait SpotPrice: Send + Sync {
    async fn spot(&self, base: &str, quote: &str) -> Result<SpotQuote, SpotError>;
}
