use std::collections::{BTreeMap, HashMap};

use rand::Rng;
use reqwest::Client;
use serde::Deserialize;

use crate::error::AlertError;

/// USD price per quantity id.
pub type Prices = BTreeMap<String, f64>;

#[derive(Clone)]
pub enum PriceFeed {
    Online(CryptoCompareClient),
    Simulated { min: f64, max: f64 },
}

impl PriceFeed {
    pub async fn prices(&self, quantities: &[String]) -> Result<Prices, AlertError> {
        match self {
            PriceFeed::Online(client) => client.prices(quantities).await,
            PriceFeed::Simulated { min, max } => Ok(simulated_prices(quantities, *min, *max)),
        }
    }
}

fn simulated_prices(quantities: &[String], min: f64, max: f64) -> Prices {
    let mut rng = rand::rng();
    quantities
        .iter()
        .map(|q| {
            let price = if max > min { rng.random_range(min..max) } else { min };
            (q.clone(), (price * 100.0).round() / 100.0)
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct UsdQuote {
    #[serde(rename = "USD")]
    usd: f64,
}

#[derive(Clone)]
pub struct CryptoCompareClient {
    http: Client,
    url: String,
}

impl CryptoCompareClient {
    pub fn new(url: String) -> Self {
        Self {
            http: Client::new(),
            url,
        }
    }

    pub async fn prices(&self, quantities: &[String]) -> Result<Prices, AlertError> {
        let symbols = quantities
            .iter()
            .map(|q| q.to_uppercase())
            .collect::<Vec<_>>()
            .join(",");
        let ts = chrono::Utc::now().timestamp().to_string();

        let res = self
            .http
            .get(&self.url)
            .query(&[("fsyms", symbols.as_str()), ("tsyms", "USD"), ("ts", ts.as_str())])
            .send()
            .await
            .map_err(|e| AlertError::PriceFeed(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AlertError::PriceFeed(format!("{status} {body}")));
        }

        let quotes = res
            .json::<HashMap<String, UsdQuote>>()
            .await
            .map_err(|e| AlertError::PriceFeed(e.to_string()))?;

        Ok(quotes
            .into_iter()
            .map(|(sym, q)| (sym.to_lowercase(), q.usd))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn simulated_prices_stay_in_range() {
        let feed = PriceFeed::Simulated { min: 1000.0, max: 15000.0 };
        let qs = vec!["btc".to_string(), "eth".to_string()];

        for _ in 0..50 {
            let prices = feed.prices(&qs).await.unwrap();
            assert_eq!(prices.len(), 2);
            for v in prices.values() {
                assert!((1000.0..=15000.0).contains(v));
            }
        }
    }

    #[tokio::test]
    async fn degenerate_range_returns_min() {
        let feed = PriceFeed::Simulated { min: 5.0, max: 5.0 };
        let prices = feed.prices(&["btc".to_string()]).await.unwrap();
        assert_eq!(prices["btc"], 5.0);
    }
}
