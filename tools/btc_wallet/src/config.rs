use std::time::Duration;

use swap_sdk::{read_env_string, read_env_u64, validate_http_url, validate_nonzero, ConfigError};

pub const INSIGHT_MAINNET_URL: &str = "https://insight.bitpay.com/api";
pub const INSIGHT_TESTNET_URL: &str = "https://test-insight.swap.online/insight-api";
pub const BLOCKCYPHER_MAINNET_URL: &str = "https://api.blockcypher.com/v1/btc/main";
pub const BLOCKCYPHER_TESTNET_URL: &str = "https://api.blockcypher.com/v1/btc/test3";
pub const EARN_COM_FEES_URL: &str = "https://bitcoinfees.earn.com/api/v1/fees/recommended";
pub const OMNI_EXPLORER_URL: &str = "https://api.omniexplorer.info/v1/address/addr/";

/// Fee paid by every send, in satoshis.
pub const DEFAULT_FEE_SATS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BtcNetwork {
    Mainnet,
    Testnet,
}

impl BtcNetwork {
    pub fn is_mainnet(self) -> bool {
        matches!(self, BtcNetwork::Mainnet)
    }

    pub fn to_bitcoin(self) -> bitcoin::Network {
        match self {
            BtcNetwork::Mainnet => bitcoin::Network::Bitcoin,
            BtcNetwork::Testnet => bitcoin::Network::Testnet,
        }
    }
}

pub fn parse_network(value: &str) -> Result<BtcNetwork, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "mainnet" | "bitcoin" => Ok(BtcNetwork::Mainnet),
        "testnet" | "testnet3" | "localnet" => Ok(BtcNetwork::Testnet),
        _ => Err(ConfigError::Invalid {
            label: "BTC_NETWORK".to_string(),
            message: "expected mainnet/testnet".to_string(),
        }),
    }
}

/// Endpoints and HTTP settings for the explorer and fee oracles.
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    pub network: BtcNetwork,
    pub insight_url: String,
    pub blockcypher_url: String,
    pub blockcypher_token: Option<String>,
    pub earn_com_url: String,
    pub omni_url: String,
    pub timeout: Duration,
}

impl ExplorerConfig {
    pub fn for_network(network: BtcNetwork) -> Self {
        let (insight_url, blockcypher_url) = match network {
            BtcNetwork::Mainnet => (INSIGHT_MAINNET_URL, BLOCKCYPHER_MAINNET_URL),
            BtcNetwork::Testnet => (INSIGHT_TESTNET_URL, BLOCKCYPHER_TESTNET_URL),
        };
        Self {
            network,
            insight_url: insight_url.to_string(),
            blockcypher_url: blockcypher_url.to_string(),
            blockcypher_token: None,
            earn_com_url: EARN_COM_FEES_URL.to_string(),
            omni_url: OMNI_EXPLORER_URL.to_string(),
            timeout: Duration::from_millis(10_000),
        }
    }

    /// Reads `BTC_NETWORK` (default testnet) and optional URL overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let network = match read_env_string("BTC_NETWORK") {
            Some(value) => parse_network(&value)?,
            None => BtcNetwork::Testnet,
        };
        let mut config = Self::for_network(network);
        if let Some(url) = read_env_string("BTC_EXPLORER_URL") {
            config.insight_url = url;
        }
        if let Some(url) = read_env_string("BLOCKCYPHER_API_URL") {
            config.blockcypher_url = url;
        }
        config.blockcypher_token = read_env_string("BLOCKCYPHER_API_TOKEN");
        let timeout_ms = read_env_u64("BTC_HTTP_TIMEOUT_MS", config.timeout.as_millis() as u64);
        config.timeout = Duration::from_millis(timeout_ms);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("insight url", &self.insight_url)?;
        validate_http_url("blockcypher url", &self.blockcypher_url)?;
        validate_http_url("earn.com url", &self.earn_com_url)?;
        validate_http_url("omni explorer url", &self.omni_url)?;
        validate_nonzero("http timeout", self.timeout.as_millis() as u64)
    }

    pub(crate) fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder().timeout(self.timeout).build()
    }
}

#[derive(Debug, Clone)]
pub struct TxBuilderConfig {
    pub fee_value: u64,
}

impl Default for TxBuilderConfig {
    fn default() -> Self {
        Self {
            fee_value: DEFAULT_FEE_SATS,
        }
    }
}

impl TxBuilderConfig {
    pub fn from_env() -> Self {
        Self {
            fee_value: read_env_u64("BTC_TX_FEE_SATS", DEFAULT_FEE_SATS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_follow_network() {
        let mainnet = ExplorerConfig::for_network(BtcNetwork::Mainnet);
        assert_eq!(mainnet.insight_url, INSIGHT_MAINNET_URL);
        assert_eq!(mainnet.blockcypher_url, BLOCKCYPHER_MAINNET_URL);

        let testnet = ExplorerConfig::for_network(BtcNetwork::Testnet);
        assert_eq!(testnet.insight_url, INSIGHT_TESTNET_URL);
        assert_eq!(testnet.blockcypher_url, BLOCKCYPHER_TESTNET_URL);
        assert!(testnet.validate().is_ok());
    }

    #[test]
    fn parses_network_names() {
        assert_eq!(parse_network("Mainnet").unwrap(), BtcNetwork::Mainnet);
        assert_eq!(parse_network("testnet").unwrap(), BtcNetwork::Testnet);
        assert!(parse_network("regtest").is_err());
    }
}
