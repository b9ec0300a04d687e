use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::market_data::MarketData;
use crate::providers::util::RetryPolicy;
use crate::spot_price::SpotPrice;
use crate::{coin, describe, ytd};

const MISSING_KEY_REPLY: &str =
    "\nAPI key for market data is not configured. Please contact bot admin.\n";

const GUIDE_REPLY: &str = "You can use the following commands:\n\
    /hello - Start talking to the bot\n\
    /ytd <TICKER> - Stock YTD performance (e.g., /ytd AAPL)\n\
    /coin - Latest crypto prices\n\
    /desc <TICKER> - Company summary (e.g., /desc TSLA)\n\
    /guide - Displays this help message";

/// Splits an inbound message into a lowercased command and its arguments,
/// stripping an optional `@botname` mention from the command token.
pub fn parse_message<'a>(text: &'a str, bot_name: &str) -> Option<(String, Vec<&'a str>)> {
    let mut parts = text.split_whitespace();
    let first = parts.next()?;

    let mut command = first.to_lowercase();
    let mention = format!("@{}", bot_name.to_lowercase());
    if let Some(stripped) = command.strip_suffix(&mention) {
        command = stripped.to_string();
    }

    Some((command, parts.collect()))
}

/// Dispatches inbound messages to command handlers. Holds the injected
/// clients; no global state.
pub struct Router {
    /// `None` when the market-data credential is not configured; stock
    /// commands then degrade to a fixed configuration-error reply.
    pub market: Option<Arc<dyn MarketData>>,
    pub spot: Arc<dyn SpotPrice>,
    pub bot_name: String,
    pub retry: RetryPolicy,
}

impl Router {
    /// Answers one message. `None` means no reply should be sent:
    /// unrecognized commands and plain text stay silent.
    pub async fn handle(&self, text: &str, sender: &str, today: NaiveDate) -> Option<String> {
        let (command, args) = parse_message(text, &self.bot_name)?;

        match command.as_str() {
            "/hello" | "/start" => Some(format!(
                "Hello {sender}, \nI am TickerBot, your assistant for stock and crypto info!"
            )),
            "/ytd" => Some(
                match single_ticker(&args, "/ytd", "Please provide a ticker symbol, e.g., /ytd AMZN") {
                    Ok(raw_symbol) => match &self.market {
                        Some(market) => {
                            ytd::run(market.as_ref(), today, raw_symbol, self.retry).await
                        }
                        None => MISSING_KEY_REPLY.to_string(),
                    },
                    Err(reply) => reply,
                },
            ),
            "/desc" => Some(
                match single_ticker(&args, "/desc", "Please provide a ticker symbol, e.g., /desc AMZN") {
                    Ok(raw_symbol) => match &self.market {
                        Some(market) => describe::run(market.as_ref(), raw_symbol).await,
                        None => MISSING_KEY_REPLY.to_string(),
                    },
                    Err(reply) => reply,
                },
            ),
            "/coin" => Some(coin::run(self.spot.as_ref()).await),
            "/guide" => Some(GUIDE_REPLY.to_string()),
            other => {
                if other.starts_with('/') {
                    info!(command = other, "Unrecognized command");
                }
                None
            }
        }
    }
}

/// Arity rule shared by `/ytd` and `/desc`: exactly one symbol.
fn single_ticker<'a>(args: &[&'a str], command: &str, prompt: &str) -> Result<&'a str, String> {
    match args {
        [] => Err(prompt.to_string()),
        [symbol] => Ok(symbol),
        _ => Err(format!("{command} only supports 1 ticker symbol at a time.")),
    }
}
