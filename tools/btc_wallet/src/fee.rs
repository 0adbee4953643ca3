//! Fee-rate estimation with a primary oracle and a mainnet-only fallback.

use std::fmt;

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{BtcNetwork, ExplorerConfig};
use crate::rpc::request_json;
use crate::types::Result;

/// Multiplier from earn.com's sat/byte to sat/kilobyte.
pub const EARN_COM_UNIT_SCALE: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Speed {
    Fast,
    #[default]
    Normal,
    Slow,
}

impl From<&str> for Speed {
    /// Unrecognised tiers fall back to `Normal`.
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "fast" => Speed::Fast,
            "slow" => Speed::Slow,
            _ => Speed::Normal,
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Speed::Fast => "fast",
            Speed::Normal => "normal",
            Speed::Slow => "slow",
        };
        f.write_str(label)
    }
}

/// Satoshis per kilobyte at a given speed tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeRate {
    pub value: u64,
    pub speed: Speed,
}

#[async_trait]
pub trait FeeProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Satoshis per kilobyte for `speed`.
    async fn fee_rate(&self, speed: Speed) -> Result<u64>;
}

pub struct BlockcypherFees {
    client: Client,
    url: String,
    token: Option<String>,
}

impl BlockcypherFees {
    pub fn new(client: Client, config: &ExplorerConfig) -> Self {
        Self {
            client,
            url: config.blockcypher_url.clone(),
            token: config.blockcypher_token.clone(),
        }
    }
}

#[async_trait]
impl FeeProvider for BlockcypherFees {
    fn name(&self) -> &'static str {
        "blockcypher"
    }

    async fn fee_rate(&self, speed: Speed) -> Result<u64> {
        let mut request = self.client.get(&self.url);
        if let Some(token) = &self.token {
            request = request.query(&[("token", token)]);
        }
        let body = request_json("GET", &self.url, request).await?;
        blockcypher_fee(&body, speed)
    }
}

pub struct EarnComFees {
    client: Client,
    url: String,
}

impl EarnComFees {
    pub fn new(client: Client, config: &ExplorerConfig) -> Self {
        Self {
            client,
            url: config.earn_com_url.clone(),
        }
    }
}

#[async_trait]
impl FeeProvider for EarnComFees {
    fn name(&self) -> &'static str {
        "earn.com"
    }

    async fn fee_rate(&self, speed: Speed) -> Result<u64> {
        let body = request_json("GET", &self.url, self.client.get(&self.url)).await?;
        earn_com_fee(&body, speed)
    }
}

pub fn blockcypher_fee(body: &Value, speed: Speed) -> Result<u64> {
    let key = match speed {
        Speed::Fast => "high_fee_per_kb",
        Speed::Normal => "medium_fee_per_kb",
        Speed::Slow => "low_fee_per_kb",
    };
    numeric_field(body, key)
}

pub fn earn_com_fee(body: &Value, speed: Speed) -> Result<u64> {
    let key = match speed {
        Speed::Fast => "fastestFee",
        Speed::Normal => "halfHourFee",
        Speed::Slow => "hourFee",
    };
    let per_byte = numeric_field(body, key)?;
    per_byte
        .checked_mul(EARN_COM_UNIT_SCALE)
        .ok_or_else(|| anyhow!("{key} overflows sat/kb").into())
}

fn numeric_field(body: &Value, key: &str) -> Result<u64> {
    let value = body
        .get(key)
        .ok_or_else(|| anyhow!("fee response has no {key}"))?;
    if let Some(whole) = value.as_u64() {
        return Ok(whole);
    }
    match value.as_f64().or_else(|| value.as_str().and_then(|s| s.trim().parse().ok())) {
        Some(number) if number.is_finite() && number >= 0.0 => Ok(number.round() as u64),
        _ => Err(anyhow!("fee response has non-numeric {key}: {value}").into()),
    }
}

pub struct FeeEstimator<P, S> {
    network: BtcNetwork,
    primary: P,
    secondary: S,
}

impl FeeEstimator<BlockcypherFees, EarnComFees> {
    pub fn from_config(config: &ExplorerConfig) -> Result<Self> {
        let client = config.http_client()?;
        Ok(Self::new(
            config.network,
            BlockcypherFees::new(client.clone(), config),
            EarnComFees::new(client, config),
        ))
    }
}

impl<P: FeeProvider, S: FeeProvider> FeeEstimator<P, S> {
    pub fn new(network: BtcNetwork, primary: P, secondary: S) -> Self {
        Self {
            network,
            primary,
            secondary,
        }
    }

    /// Testnet asks only the primary; mainnet falls back to the secondary.
    pub async fn estimate_fee_rate(&self, speed: Speed) -> Result<FeeRate> {
        let value = match self.primary.fee_rate(speed).await {
            Ok(value) => value,
            Err(err) if self.network.is_mainnet() => {
                warn!(
                    provider = self.primary.name(),
                    fallback = self.secondary.name(),
                    error = %err,
                    "Fee provider failed; trying fallback"
                );
                self.secondary.fee_rate(speed).await?
            }
            Err(err) => return Err(err),
        };
        debug!(%speed, value, "Fee rate estimated");
        Ok(FeeRate { value, speed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_speed_is_normal() {
        assert_eq!(Speed::from("fast"), Speed::Fast);
        assert_eq!(Speed::from("SLOW"), Speed::Slow);
        assert_eq!(Speed::from("ludicrous"), Speed::Normal);
    }

    #[test]
    fn blockcypher_tiers() {
        let body = json!({
            "high_fee_per_kb": 50000,
            "medium_fee_per_kb": 25000,
            "low_fee_per_kb": 10000
        });
        assert_eq!(blockcypher_fee(&body, Speed::Fast).unwrap(), 50_000);
        assert_eq!(blockcypher_fee(&body, Speed::Normal).unwrap(), 25_000);
        assert_eq!(blockcypher_fee(&body, Speed::Slow).unwrap(), 10_000);
    }

    #[test]
    fn earn_com_is_scaled_to_kilobytes() {
        let body = json!({ "fastestFee": 40, "halfHourFee": 20, "hourFee": 10 });
        assert_eq!(earn_com_fee(&body, Speed::Fast).unwrap(), 40_960);
        assert_eq!(earn_com_fee(&body, Speed::Normal).unwrap(), 20_480);
        assert_eq!(earn_com_fee(&body, Speed::Slow).unwrap(), 10_240);
    }

    #[test]
    fn missing_tier_is_an_error() {
        assert!(blockcypher_fee(&json!({}), Speed::Normal).is_err());
        assert!(earn_com_fee(&json!({ "fastestFee": "n/a" }), Speed::Fast).is_err());
    }
}
