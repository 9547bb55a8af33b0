//! XRPL JSON-RPC transport (`http://` / `https://` endpoints).

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::trace;

use crate::adapters::wire::{parse_account_lines, rpc_error};
use crate::domain::{SourceError, TrustlinePage};
use crate::ports::{AccountLinesRequest, TrustlineSource};

/// rippled's JSON-RPC envelope: one method, a single-element params array.
#[derive(Debug, Serialize)]
struct RpcRequest<'a, P: Serialize> {
    method: &'static str,
    params: [&'a P; 1],
}

/// Trustline source backed by a rippled/clio JSON-RPC endpoint.
pub struct JsonRpcSource {
    http_client: reqwest::Client,
    rpc_url: String,
    timeout: Duration,
}

impl JsonRpcSource {
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Connection(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            rpc_url: rpc_url.into(),
            timeout,
        })
    }

    async fn call<P: Serialize + Sync>(
        &self,
        method: &'static str,
        params: &P,
    ) -> Result<Value, SourceError> {
        let request = RpcRequest {
            method,
            params: [params],
        };

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Connection(format!(
                "{} returned HTTP {status}",
                self.rpc_url
            )));
        }

        let mut body: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout(self.timeout)
            } else {
                SourceError::MalformedResponse(format!("Failed to parse RPC response: {e}"))
            }
        })?;
        trace!(method, "Received RPC response");

        if let Some(err) = rpc_error(&body) {
            return Err(err);
        }
        body.get_mut("result")
            .map(Value::take)
            .ok_or_else(|| SourceError::MalformedResponse("RPC response missing result".into()))
    }

    fn transport_error(&self, e: reqwest::Error) -> SourceError {
        if e.is_timeout() {
            SourceError::Timeout(self.timeout)
        } else {
            SourceError::Connection(format!("Failed to send RPC request: {e}"))
        }
    }
}

#[async_trait]
impl TrustlineSource for JsonRpcSource {
    async fn account_lines(
        &self,
        request: &AccountLinesRequest,
    ) -> Result<TrustlinePage, SourceError> {
        let result = self.call("account_lines", request).await?;
        parse_account_lines(result)
    }
}
