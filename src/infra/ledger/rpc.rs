//! Read-only ledger backed by a Solana JSON-RPC endpoint.
//!
//! Balances and signature confirmations come from the cluster. Submission and
//! status-by-identifier need an indexer this client does not have, so those
//! report `NotSupported`.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::config::SdkConfig;
use crate::domain::{
    Confirmation, Ledger, NetworkError, SdkError, SignedOperation, StatusRecord,
};

#[derive(Debug, Serialize)]
struct JsonRpcRequest<T: Serialize> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: T,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcValue<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureStatus {
    slot: u64,
    err: Option<serde_json::Value>,
    confirmation_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenAccount {
    account: TokenAccountData,
}

#[derive(Debug, Deserialize)]
struct TokenAccountData {
    data: ParsedData,
}

#[derive(Debug, Deserialize)]
struct ParsedData {
    parsed: ParsedAccount,
}

#[derive(Debug, Deserialize)]
struct ParsedAccount {
    info: ParsedTokenInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedTokenInfo {
    token_amount: TokenAmount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenAmount {
    ui_amount: Option<f64>,
}

pub struct RpcLedger {
    http_client: Client,
    rpc_url: String,
}

impl RpcLedger {
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self, SdkError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::new(format!("Failed to build RPC client: {e}")))?;

        Ok(Self {
            http_client,
            rpc_url: rpc_url.to_string(),
        })
    }

    pub fn from_config(config: &SdkConfig) -> Result<Self, SdkError> {
        Self::new(&config.rpc_url, config.timeout)
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    #[instrument(skip(self, params))]
    async fn rpc_call<R: DeserializeOwned>(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<R, SdkError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NetworkError::new(format!("RPC request timed out: {e}"))
                } else {
                    NetworkError::new(format!("RPC request failed: {e}"))
                }
            })?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| NetworkError::new(format!("Invalid RPC response: {e}")))?;

        if let Some(error) = rpc_response.error {
            warn!(code = error.code, message = %error.message, "RPC error");
            return Err(NetworkError::new(format!("{}: {}", error.code, error.message)).into());
        }

        rpc_response
            .result
            .ok_or_else(|| NetworkError::new("Empty RPC response").into())
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    #[instrument(skip(self))]
    async fn get_balance(&self, address: &str) -> Result<u64, SdkError> {
        let result: RpcValue<u64> = self
            .rpc_call("getBalance", serde_json::json!([address]))
            .await?;
        Ok(result.value)
    }

    #[instrument(skip(self))]
    async fn get_token_balance(&self, owner: &str, mint: &str) -> Result<f64, SdkError> {
        let params = serde_json::json!([owner, {"mint": mint}, {"encoding": "jsonParsed"}]);
        let result: RpcValue<Vec<TokenAccount>> =
            self.rpc_call("getTokenAccountsByOwner", params).await?;

        let total = result
            .value
            .iter()
            .filter_map(|account| account.account.data.parsed.info.token_amount.ui_amount)
            .sum();
        debug!(accounts = result.value.len(), total, "Token balance fetched");
        Ok(total)
    }

    async fn submit(&self, signed: &SignedOperation) -> Result<String, SdkError> {
        let _ = signed;
        Err(SdkError::NotSupported(
            "RPC ledger is read-only; submission requires a relayer".to_string(),
        ))
    }

    async fn get_status(&self, id: &str) -> Result<Option<StatusRecord>, SdkError> {
        let _ = id;
        Err(SdkError::NotSupported(
            "RPC ledger cannot look up operations by identifier".to_string(),
        ))
    }

    #[instrument(skip(self))]
    async fn confirm(&self, signature: &str) -> Result<Confirmation, SdkError> {
        let params = serde_json::json!([[signature], {"searchTransactionHistory": true}]);
        let result: RpcValue<Vec<Option<SignatureStatus>>> =
            self.rpc_call("getSignatureStatuses", params).await?;

        let Some(Some(status)) = result.value.into_iter().next() else {
            return Ok(Confirmation::unconfirmed(signature));
        };

        let confirmed = status.err.is_none()
            && matches!(
                status.confirmation_status.as_deref(),
                Some("confirmed") | Some("finalized")
            );

        Ok(Confirmation {
            signature: signature.to_string(),
            confirmed,
            slot: Some(status.slot),
            block_time: None,
            error: status.err.map(|e| e.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_uses_rpc_url() {
        let config = SdkConfig::default().with_rpc_url("http://localhost:8899");
        let ledger = RpcLedger::from_config(&config).unwrap();
        assert_eq!(ledger.rpc_url(), "http://localhost:8899");
    }

    #[tokio::test]
    async fn test_writes_not_supported() {
        let ledger = RpcLedger::new("http://localhost:8899", Duration::from_secs(1)).unwrap();
        assert!(matches!(
            ledger.get_status("tx_1").await,
            Err(SdkError::NotSupported(_))
        ));
    }

    #[test]
    fn test_signature_status_parses() {
        let json = serde_json::json!({
            "slot": 72,
            "confirmations": null,
            "err": null,
            "confirmationStatus": "finalized"
        });
        let status: SignatureStatus = serde_json::from_value(json).unwrap();
        assert_eq!(status.slot, 72);
        assert!(status.err.is_none());
    }
}
