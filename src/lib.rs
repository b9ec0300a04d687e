pub mod calendar;
pub mod coin;
pub mod command;
pub mod config;
pub mod describe;
pub mod log;
pub mod market_data;
pub mod providers;
pub mod spot_price;
pub mod symbol;
pub mod ytd;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::command::Router;
use crate::market_data::MarketData;
use crate::providers::coinbase::CoinbaseClient;
use crate::providers::polygon::PolygonClient;
use crate::providers::util::RetryPolicy;
use crate::spot_price::SpotPrice;

/// Builds a router with clients wired from configuration. A missing
/// POLYGON_API_KEY leaves the stock commands degraded to a fixed
/// configuration-error reply; crypto and static commands stay functional.
pub fn build_router(config: &config::AppConfig) -> Router {
    let market: Option<Arc<dyn MarketData>> = match config::AppConfig::polygon_api_key() {
        Some(key) => Some(Arc::new(PolygonClient::new(config.polygon_base_url(), &key))),
        None => {
            warn!("POLYGON_API_KEY is not set; stock commands will be unavailable");
            None
        }
    };
    let spot: Arc<dyn SpotPrice> = Arc::new(CoinbaseClient::new(config.coinbase_base_url()));

    Router {
        market,
        spot,
        bot_name: config.bot_name.clone(),
        retry: RetryPolicy::default(),
    }
}

/// Answers a single inbound message. `Ok(None)` means no reply should be
/// sent back to the channel.
pub async fn run(config_path: Option<&str>, text: &str, sender: &str) -> Result<Option<String>> {
    info!("TickerBot handling message");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let router = build_router(&config);
    let today = chrono::Local::now().date_naive();
    Ok(router.handle(text, sender, today).await)
}
