//! HTTP plumbing shared by the explorer gateway and the fee providers.

mod explorer;

pub use explorer::{
    merge_tx_info, BroadcastReceipt, ExplorerGateway, UnspentOutput, UtxoExplorer,
    DEFAULT_OMNI_ASSET_ID,
};

use reqwest::RequestBuilder;
use serde_json::Value;
use tracing::{debug, error};

use crate::types::{BtcWalletError, Result};

/// Status the explorers use to say "refused" rather than "failed".
pub const REJECTED_STATUS: u16 = 525;

/// Maps a failed provider call onto the error kinds callers branch on.
pub fn classify_error(
    method: &'static str,
    url: &str,
    status: Option<u16>,
    message: String,
) -> BtcWalletError {
    if status == Some(REJECTED_STATUS) {
        error!(method, url, "Provider rejected request");
        return BtcWalletError::ProviderRejected {
            method,
            url: url.to_string(),
        };
    }
    error!(method, url, ?status, %message, "Unknown provider error");
    BtcWalletError::UnknownProvider { status, message }
}

pub(crate) async fn request_json(
    method: &'static str,
    url: &str,
    request: RequestBuilder,
) -> Result<Value> {
    debug!(method, url, "Provider request");
    let response = request
        .send()
        .await
        .map_err(|err| classify_error(method, url, err.status().map(|s| s.as_u16()), err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(classify_error(method, url, Some(status.as_u16()), body));
    }
    let body = response
        .json::<Value>()
        .await
        .map_err(|err| classify_error(method, url, Some(status.as_u16()), err.to_string()))?;
    debug!(method, url, status = status.as_u16(), "Provider response");
    Ok(body)
}

/// JavaScript-style truthiness, used to judge merged explorer payloads.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
