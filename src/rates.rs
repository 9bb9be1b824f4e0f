//! Exchange Rate Gateway: a stateless proxy to the upstream currency feed.
//!
//! One best-effort upstream call per request. No retry, no caching, no
//! timeout.

use std::collections::BTreeMap;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RatesError {
    #[error("upstream feed returned status {0}")]
    Upstream(u16),
    #[error("no exchange rates data found")]
    NoData,
    #[error("exchange rate not found for the specified currency code")]
    UnknownCurrency,
    #[error("{0}")]
    Transport(String),
}

/// Upstream feed document. Only the `rates` field matters; its absence is
/// the `NoData` outcome.
#[derive(Debug, Deserialize)]
struct FeedDocument {
    rates: Option<BTreeMap<String, f64>>,
}

/// Client for the third-party exchange-rate feed.
#[derive(Debug, Clone)]
pub struct RateGateway {
    client: Client,
    feed_url: String,
    api_key: Option<String>,
}

impl RateGateway {
    #[must_use]
    pub fn new(feed_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            feed_url,
            api_key,
        }
    }

    /// Fetch the full rate table, keyed and sorted by currency code.
    ///
    /// # Errors
    ///
    /// `Upstream` with the feed's status code on a non-200 response,
    /// `NoData` when the document has no `rates` field, `Transport` on a
    /// network or decode failure.
    pub async fn fetch_rates(&self) -> Result<BTreeMap<String, f64>, RatesError> {
        debug!(url = %self.feed_url, "Fetching exchange rates");

        let mut request = self.client.get(&self.feed_url);
        if let Some(key) = &self.api_key {
            request = request.query(&[("access_key", key)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RatesError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RatesError::Upstream(status.as_u16()));
        }

        let document: FeedDocument = response
            .json()
            .await
            .map_err(|e| RatesError::Transport(e.to_string()))?;

        document.rates.ok_or(RatesError::NoData)
    }

    /// Look up a single rate. The code is uppercased before lookup, so
    /// `eur` and `EUR` are the same query.
    ///
    /// # Errors
    ///
    /// `UnknownCurrency` when the feed has no entry for the code; otherwise
    /// the same taxonomy as [`fetch_rates`](Self::fetch_rates).
    pub async fn search_rate(&self, currency_code: &str) -> Result<(String, f64), RatesError> {
        let code = currency_code.to_uppercase();
        let rates = self.fetch_rates().await?;

        match rates.get(&code) {
            Some(rate) => Ok((code, *rate)),
            None => Err(RatesError::UnknownCurrency),
        }
    }
}
