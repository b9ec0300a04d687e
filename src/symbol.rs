use crate::market_data::{MarketData, MarketDataError};

/// Strips the optional leading `$` from user-supplied ticker input.
pub fn normalize(raw: &str) -> &str {
    raw.strip_prefix('$').unwrap_or(raw)
}

/// Normalizes the symbol and confirms it exists upstream.
///
/// The error side is the user-facing reply, echoing the input exactly as it
/// was typed (including any `$` prefix).
pub async fn validate(client: &dyn MarketData, raw: &str) -> Result<String, String> {
    let symbol = normalize(raw);
    match client.lookup_ticker(symbol).await {
        Ok(Some(_)) => Ok(symbol.to_string()),
        Ok(None) => Err(format!(
            "\nTicker symbol '{raw}' not found or invalid.\n"
        )),
        Err(MarketDataError::Network(_)) => {
            Err(format!("\nNetwork error while validating ticker {raw}.\n"))
        }
        Err(MarketDataError::Format(_)) => Err(format!(
            "\nInvalid response format while validating ticker {raw}.\n"
        )),
    }
}
