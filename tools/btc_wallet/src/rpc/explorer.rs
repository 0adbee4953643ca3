use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use swap_sdk::{Amount, BTC_DECIMALS};
use tracing::debug;

use super::{is_truthy, request_json};
use crate::config::ExplorerConfig;
use crate::types::{BtcWalletError, Result};

/// Omni asset id of USDT.
pub const DEFAULT_OMNI_ASSET_ID: u64 = 31;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnspentOutput {
    pub txid: String,
    #[serde(rename = "vout")]
    pub output_index: u32,
    #[serde(rename = "satoshis")]
    pub amount_satoshis: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BroadcastReceipt {
    pub txid: String,
}

/// The slice of the explorer a send needs: spendable outputs and broadcast.
#[async_trait]
pub trait UtxoExplorer: Send + Sync {
    async fn fetch_unspents(&self, address: &str) -> Result<Vec<UnspentOutput>>;
    async fn broadcast_tx(&self, raw_tx: &str) -> Result<BroadcastReceipt>;
}

pub struct ExplorerGateway {
    client: Client,
    config: ExplorerConfig,
}

impl ExplorerGateway {
    pub fn new(config: ExplorerConfig) -> Result<Self> {
        config.validate()?;
        let client = config.http_client()?;
        debug!(
            network = ?config.network,
            insight = %config.insight_url,
            blockcypher = %config.blockcypher_url,
            "Explorer gateway ready"
        );
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    fn insight(&self, path: &str) -> String {
        format!("{}/{}", self.config.insight_url.trim_end_matches('/'), path)
    }

    fn blockcypher(&self, path: &str) -> String {
        format!("{}/{}", self.config.blockcypher_url.trim_end_matches('/'), path)
    }

    fn with_token(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.blockcypher_token {
            Some(token) => request.query(&[("token", token)]),
            None => request,
        }
    }

    fn balance_request(&self, address: &str) -> (String, RequestBuilder) {
        let url = self.insight(&format!("addr/{address}"));
        let request = self.client.get(&url);
        (url, request)
    }

    fn unspents_request(&self, address: &str) -> (String, RequestBuilder) {
        let url = self.insight(&format!("addr/{address}/utxo"));
        let request = self.client.get(&url);
        (url, request)
    }

    fn broadcast_request(&self, raw_tx: &str) -> (String, RequestBuilder) {
        let url = self.insight("tx/send");
        let request = self.client.post(&url).json(&json!({ "rawtx": raw_tx }));
        (url, request)
    }

    fn tx_request(&self, hash: &str) -> (String, RequestBuilder) {
        let url = self.insight(&format!("tx/{hash}"));
        let request = self.client.get(&url);
        (url, request)
    }

    fn tx_detail_request(&self, hash: &str) -> (String, RequestBuilder) {
        let url = self.blockcypher(&format!("txs/{hash}"));
        let request = self.client.get(&url);
        (url, request)
    }

    /// Only the confidence lookup carries the token.
    fn tx_confidence_request(&self, hash: &str) -> (String, RequestBuilder) {
        let url = self.blockcypher(&format!("txs/{hash}/confidence"));
        let request = self.with_token(self.client.get(&url));
        (url, request)
    }

    fn omni_balance_request(&self, address: &str) -> (String, RequestBuilder) {
        let url = self.config.omni_url.clone();
        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(format!("addr={address}"));
        (url, request)
    }

    pub async fn fetch_balance(&self, address: &str) -> Result<Amount> {
        let (url, request) = self.balance_request(address);
        let body = request_json("GET", &url, request).await?;
        balance_from_address_info(&body)
    }

    pub async fn fetch_tx(&self, hash: &str) -> Result<Value> {
        let (url, request) = self.tx_request(hash);
        request_json("GET", &url, request).await
    }

    /// Detail and confidence lookups run concurrently and are merged.
    pub async fn fetch_tx_info(&self, hash: &str) -> Result<Value> {
        let (detail_url, detail_request) = self.tx_detail_request(hash);
        let (confidence_url, confidence_request) = self.tx_confidence_request(hash);
        let (detail, confidence) = tokio::join!(
            request_json("GET", &detail_url, detail_request),
            request_json("GET", &confidence_url, confidence_request),
        );
        merge_tx_info(detail, confidence)
    }

    pub async fn fetch_omni_balance(&self, address: &str, asset_id: u64) -> Result<Amount> {
        let (url, request) = self.omni_balance_request(address);
        let body = request_json("POST", &url, request).await?;
        omni_asset_balance(&body, asset_id)
    }
}

#[async_trait]
impl UtxoExplorer for ExplorerGateway {
    async fn fetch_unspents(&self, address: &str) -> Result<Vec<UnspentOutput>> {
        let (url, request) = self.unspents_request(address);
        let body = request_json("GET", &url, request).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn broadcast_tx(&self, raw_tx: &str) -> Result<BroadcastReceipt> {
        let (url, request) = self.broadcast_request(raw_tx);
        let body = request_json("POST", &url, request).await?;
        Ok(serde_json::from_value(body)?)
    }
}

/// Overlays the confidence payload on the detail payload.
///
/// A failed half contributes an `error` field. The merge succeeds only when
/// it carries a truthy `confidence` or `fees`.
pub fn merge_tx_info(detail: Result<Value>, confidence: Result<Value>) -> Result<Value> {
    let mut merged = Map::new();
    for part in [detail, confidence] {
        match part {
            Ok(Value::Object(fields)) => merged.extend(fields),
            Ok(_) => {}
            Err(err) => {
                merged.insert("error".to_string(), Value::String(err.to_string()));
            }
        }
    }

    let has = |key: &str| merged.get(key).is_some_and(is_truthy);
    if has("confidence") || has("fees") {
        return Ok(Value::Object(merged));
    }
    match merged.get("error").filter(|value| is_truthy(value)) {
        Some(Value::String(message)) => Err(BtcWalletError::Provider(format!(
            "BlockCypherError: {message}"
        ))),
        Some(other) => Err(BtcWalletError::Provider(format!("BlockCypherError: {other}"))),
        None => Err(BtcWalletError::NoResponse),
    }
}

fn balance_from_address_info(body: &Value) -> Result<Amount> {
    if let Some(sats) = body.get("balanceSat").and_then(Value::as_u64) {
        return Ok(Amount::from_sat(sats));
    }
    match body.get("balance") {
        Some(Value::Number(number)) => match number.as_u64() {
            Some(whole) => Ok(Amount::from(whole)),
            None => {
                let value = number.as_f64().unwrap_or_default();
                Ok(format!("{value:.8}").parse()?)
            }
        },
        Some(Value::String(text)) => Ok(text.parse()?),
        _ => Err(BtcWalletError::Provider(
            "address info has no balance".to_string(),
        )),
    }
}

fn omni_asset_balance(body: &Value, asset_id: u64) -> Result<Amount> {
    if let Some(error) = body.get("error").filter(|value| is_truthy(value)) {
        let message = error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string());
        return Err(BtcWalletError::Provider(format!("Omni Balance: {message}")));
    }

    let assets = body.get("balance").and_then(Value::as_array);
    let found = assets.into_iter().flatten().find(|asset| {
        match asset.get("id") {
            Some(Value::Number(id)) => id.as_u64() == Some(asset_id),
            Some(Value::String(id)) => id.trim().parse::<u64>().ok() == Some(asset_id),
            _ => false,
        }
    });
    let Some(asset) = found else {
        return Ok(Amount::ZERO);
    };

    debug!(asset_id, value = %asset["value"], pendingpos = %asset["pendingpos"], pendingneg = %asset["pendingneg"], "Omni balance");
    let units = match &asset["value"] {
        Value::String(text) => text.trim().parse::<u128>().ok(),
        Value::Number(number) => number.as_u64().map(u128::from),
        _ => None,
    };
    match units {
        Some(units) => Ok(Amount::from_base_units(units, BTC_DECIMALS)?),
        None => Ok(Amount::ZERO),
    }
}
