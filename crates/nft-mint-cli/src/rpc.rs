//! [`LedgerClient`] over Solana JSON-RPC.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use nft_mint::{LedgerClient, MintError};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcRequest {
    GetMinimumBalanceForRentExemption,
    GetLatestBlockhash,
    SendTransaction,
}

impl RpcRequest {
    pub fn method(&self) -> &'static str {
        match self {
            RpcRequest::GetMinimumBalanceForRentExemption => "getMinimumBalanceForRentExemption",
            RpcRequest::GetLatestBlockhash => "getLatestBlockhash",
            RpcRequest::SendTransaction => "sendTransaction",
        }
    }

    pub fn build_request_json(&self, id: u64, params: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": self.method(),
            "params": params,
        })
    }
}

#[derive(Deserialize, Debug)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// HTTP JSON-RPC ledger, typically `https://api.devnet.solana.com`.
pub struct RpcLedger {
    client: reqwest::Client,
    url: String,
    commitment: String,
    request_id: AtomicU64,
}

impl RpcLedger {
    pub fn new(url: String, commitment: String) -> Result<Self, MintError> {
        Self::new_with_timeout(url, commitment, Duration::from_secs(30))
    }

    pub fn new_with_timeout(
        url: String,
        commitment: String,
        timeout: Duration,
    ) -> Result<Self, MintError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MintError::Network(format!("build rpc client: {e}")))?;
        Ok(Self {
            client,
            url,
            commitment,
            request_id: AtomicU64::new(0),
        })
    }

    /// POST one request and return the raw response envelope.
    async fn call(&self, request: RpcRequest, params: Value) -> Result<Value, MintError> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = request.build_request_json(id, params).to_string();
        debug!(method = request.method(), id, "rpc request");

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| MintError::Network(format!("{}: {e}", request.method())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MintError::Network(format!(
                "{}: HTTP {status}",
                request.method()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| MintError::Network(format!("{}: malformed response: {e}", request.method())))
    }
}

/// Split a response envelope into its `result`, or the node's error object.
fn take_result(request: RpcRequest, mut envelope: Value) -> Result<Value, RpcFailure> {
    if let Some(error) = envelope.get("error") {
        let error: RpcErrorObject = serde_json::from_value(error.clone()).map_err(|_| {
            RpcFailure::Malformed(format!("{}: unreadable error {error}", request.method()))
        })?;
        return Err(RpcFailure::Node(format!(
            "{}: {} (code {})",
            request.method(),
            error.message,
            error.code
        )));
    }
    match envelope.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(RpcFailure::Malformed(format!(
            "{}: response has neither result nor error",
            request.method()
        ))),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum RpcFailure {
    Node(String),
    Malformed(String),
}

impl RpcFailure {
    /// A node error is a rejection only for submissions; query errors are
    /// treated like any other failed round-trip.
    fn into_error(self, rejection: bool) -> MintError {
        match self {
            RpcFailure::Node(msg) if rejection => MintError::LedgerRejection(msg),
            RpcFailure::Node(msg) | RpcFailure::Malformed(msg) => MintError::Network(msg),
        }
    }
}

fn parse_rent(envelope: Value) -> Result<u64, MintError> {
    let request = RpcRequest::GetMinimumBalanceForRentExemption;
    let result = take_result(request, envelope).map_err(|f| f.into_error(false))?;
    result
        .as_u64()
        .ok_or_else(|| MintError::Network(format!("{}: expected u64, got {result}", request.method())))
}

fn parse_blockhash(envelope: Value) -> Result<[u8; 32], MintError> {
    let request = RpcRequest::GetLatestBlockhash;
    let result = take_result(request, envelope).map_err(|f| f.into_error(false))?;
    let encoded = result
        .pointer("/value/blockhash")
        .and_then(Value::as_str)
        .ok_or_else(|| MintError::Network(format!("{}: missing value.blockhash", request.method())))?;
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| MintError::Network(format!("{}: bad blockhash: {e}", request.method())))?;
    bytes.try_into().map_err(|v: Vec<u8>| {
        MintError::Network(format!(
            "{}: blockhash is {} bytes",
            request.method(),
            v.len()
        ))
    })
}

fn parse_signature(envelope: Value) -> Result<String, MintError> {
    let request = RpcRequest::SendTransaction;
    let result = take_result(request, envelope).map_err(|f| f.into_error(true))?;
    result
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| MintError::Network(format!("{}: expected signature, got {result}", request.method())))
}

#[async_trait]
impl LedgerClient for RpcLedger {
    async fn get_minimum_balance_for_rent_exemption(&self, size: u64) -> Result<u64, MintError> {
        let envelope = self
            .call(RpcRequest::GetMinimumBalanceForRentExemption, json!([size]))
            .await?;
        parse_rent(envelope)
    }

    async fn get_latest_blockhash(&self) -> Result<[u8; 32], MintError> {
        let envelope = self
            .call(
                RpcRequest::GetLatestBlockhash,
                json!([{ "commitment": self.commitment }]),
            )
            .await?;
        parse_blockhash(envelope)
    }

    async fn send_transaction(&self, wire: &[u8]) -> Result<String, MintError> {
        let params = json!([
            STANDARD.encode(wire),
            { "encoding": "base64", "preflightCommitment": self.commitment },
        ]);
        let envelope = self.call(RpcRequest::SendTransaction, params).await?;
        parse_signature(envelope).inspect_err(|e| {
            if let MintError::LedgerRejection(msg) = e {
                warn!(%msg, "transaction rejected");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_envelope() {
        let req = RpcRequest::GetMinimumBalanceForRentExemption.build_request_json(3, json!([82]));
        assert_eq!(
            req,
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "getMinimumBalanceForRentExemption",
                "params": [82],
            })
        );
    }

    #[test]
    fn rent_result() {
        let env = json!({"jsonrpc": "2.0", "id": 0, "result": 1461600});
        assert_eq!(parse_rent(env).unwrap(), 1_461_600);
    }

    #[test]
    fn blockhash_result() {
        let hash = [9u8; 32];
        let env = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "context": { "slot": 1 },
                "value": {
                    "blockhash": bs58::encode(hash).into_string(),
                    "lastValidBlockHeight": 100,
                }
            }
        });
        assert_eq!(parse_blockhash(env).unwrap(), hash);
    }

    #[test]
    fn short_blockhash_is_network_error() {
        let env = json!({"result": {"value": {"blockhash": "2"}}});
        assert!(matches!(parse_blockhash(env), Err(MintError::Network(_))));
    }

    #[test]
    fn send_error_is_rejection() {
        let env = json!({
            "jsonrpc": "2.0",
            "id": 2,
            "error": {
                "code": -32002,
                "message": "Transaction simulation failed: Attempt to debit an account but found no record of a prior credit."
            }
        });
        let err = parse_signature(env).unwrap_err();
        match err {
            MintError::LedgerRejection(msg) => {
                assert!(msg.starts_with("sendTransaction: Transaction simulation failed"));
                assert!(msg.ends_with("(code -32002)"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn query_error_is_network_error() {
        let env = json!({"error": {"code": -32005, "message": "Node is behind"}});
        assert!(matches!(parse_rent(env), Err(MintError::Network(_))));
    }

    #[test]
    fn missing_result_is_network_error() {
        let env = json!({"jsonrpc": "2.0", "id": 0});
        assert!(matches!(parse_signature(env), Err(MintError::Network(_))));
    }

    #[test]
    fn signature_result() {
        let env = json!({"result": "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnbJLgp8uirBgmQpjKhoR4tjF3ZpRzrFmBV6UjKdiSZkQUW"});
        assert_eq!(
            parse_signature(env).unwrap(),
            "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnbJLgp8uirBgmQpjKhoR4tjF3ZpRzrFmBV6UjKdiSZkQUW"
        );
    }
}
