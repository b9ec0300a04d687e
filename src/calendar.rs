use chrono::{Datelike, Duration, NaiveDate, Weekday};
use tracing::{debug, warn};

use crate::market_data::{MarketData, MarketStatus};

/// Upper bound on the forward walk from January 1. A full year of probes
/// means the upstream never reported an open day; give up rather than guess.
const FORWARD_PROBE_LIMIT: usize = 366;

/// Upper bound on the backward walk from today. The most recent trading day
/// is at most a long holiday weekend away; a larger bound would mask a
/// systemic API outage as a legitimate multi-week closure.
const BACKWARD_PROBE_LIMIT: usize = 14;

/// First trading date of `today`'s calendar year, or `None` when it cannot
/// be determined within the probe budget.
pub async fn first_trading_date(client: &dyn MarketData, today: NaiveDate) -> Option<NaiveDate> {
    let mut current = NaiveDate::from_ymd_opt(today.year(), 1, 1)?;

    for _ in 0..FORWARD_PROBE_LIMIT {
        match current.weekday() {
            Weekday::Sat => current = current + Duration::days(2),
            Weekday::Sun => current = current + Duration::days(1),
            _ => {
                if market_open(client, current).await {
                    debug!(%current, "Found first trading date of the year");
                    return Some(current);
                }
                current = current + Duration::days(1);
            }
        }

        if current.year() > today.year() {
            warn!(%current, "First trading day search crossed into the next year");
            return None;
        }
    }

    warn!(year = today.year(), "First trading day search exhausted its probe budget");
    None
}

/// Most recent trading date at or before `today`, or `None` when no open
/// day is found within the probe budget.
pub async fn last_trading_date(client: &dyn MarketData, today: NaiveDate) -> Option<NaiveDate> {
    let mut current = today;

    for _ in 0..BACKWARD_PROBE_LIMIT {
        match current.weekday() {
            Weekday::Sat => current = current - Duration::days(1),
            Weekday::Sun => current = current - Duration::days(2),
            _ => {
                if market_open(client, current).await {
                    debug!(%current, "Found most recent trading date");
                    return Some(current);
                }
                current = current - Duration::days(1);
            }
        }
    }

    warn!(%today, "No trading day found within {} probes", BACKWARD_PROBE_LIMIT);
    None
}

/// A probe failure is indistinguishable from a closed market for the walk;
/// the iteration bound caps the damage of a persistent outage.
async fn market_open(client: &dyn MarketData, date: NaiveDate) -> bool {
    match client.market_status(date).await {
        Ok(MarketStatus::Open) => true,
        Ok(_) => false,
        Err(e) => {
            warn!(%date, error = %e, "Market status probe failed, treating as closed");
            false
        }
    }
}
