use futures::future::join_all;
use tracing::error;

use crate::spot_price::{SpotError, SpotPrice};

/// Fixed fetch order: USD quotes first, then CAD, as the report reads
/// top-to-bottom. Output order always follows this list.
const PAIRINGS: [(&str, &str, &str); 10] = [
    ("BTC", "USD", "Bitcoin"),
    ("ETH", "USD", "Ethereum"),
    ("ADA", "USD", "Cardano"),
    ("MATIC", "USD", "Polygon"),
    ("SOL", "USD", "Solana"),
    ("BTC", "CAD", "Bitcoin"),
    ("ETH", "CAD", "Ethereum"),
    ("ADA", "CAD", "Cardano"),
    ("MATIC", "CAD", "Polygon"),
    ("SOL", "CAD", "Solana"),
];

fn currency_flag(currency: &str) -> &'static str {
    if currency == "CAD" { "🇨🇦" } else { "🇺🇸" }
}

/// Spot-price report across all pairings. Pairings fail independently; a
/// single failure becomes one annotated line while the other nine still
/// report. Only a full wipeout collapses to a generic message.
pub async fn run(client: &dyn SpotPrice) -> String {
    let fetches = PAIRINGS.iter().map(|&(base, quote, name)| async move {
        match client.spot(base, quote).await {
            Ok(spot) => Ok(format!(
                "1 {} is ${:.2} in {} ({})",
                name,
                spot.amount,
                currency_flag(&spot.currency),
                spot.currency
            )),
            Err(e) => {
                error!(base, quote, error = %e, "Spot price fetch failed");
                Err(failure_line(name, quote, &e))
            }
        }
    });

    // join_all preserves input order regardless of completion order.
    let results: Vec<Result<String, String>> = join_all(fetches).await;

    if results.iter().all(|line| line.is_err()) {
        return "Could not retrieve any cryptocurrency prices at this time. Please try again later."
            .to_string();
    }

    results
        .into_iter()
        .map(|line| line.unwrap_or_else(|failure| failure))
        .collect::<Vec<_>>()
        .join("\n")
}

fn failure_line(name: &str, quote: &str, err: &SpotError) -> String {
    let reason = match err {
        SpotError::Network(_) => "Data unavailable (network)",
        SpotError::Format(_) => "Data unavailable (format)",
        SpotError::Incomplete => "Data incomplete",
        SpotError::InvalidAmount(_) => "Invalid price data",
    };
    format!("1 {name} ({quote}): {reason}")
}
