//! Transport selection.
//!
//! The endpoint scheme decides which client is built; the rest of the
//! crate only sees a [`TrustlineSource`].

use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use crate::adapters::json_rpc::JsonRpcSource;
use crate::adapters::websocket::WebSocketSource;
use crate::config::Transport;
use crate::domain::{SourceError, TrustlinePage};
use crate::ports::{AccountLinesRequest, TrustlineSource};

pub enum LedgerClient {
    JsonRpc(JsonRpcSource),
    WebSocket(WebSocketSource),
}

impl LedgerClient {
    /// Connect to `endpoint` with the transport its scheme implies.
    pub async fn connect(endpoint: &str, request_timeout: Duration) -> Result<Self, SourceError> {
        let transport = Transport::for_endpoint(endpoint).ok_or_else(|| {
            SourceError::Connection(format!("Unsupported endpoint scheme: {endpoint}"))
        })?;

        let client = match transport {
            Transport::WebSocket => {
                Self::WebSocket(WebSocketSource::connect(endpoint, request_timeout).await?)
            }
            Transport::JsonRpc => Self::JsonRpc(JsonRpcSource::new(endpoint, request_timeout)?),
        };
        info!(endpoint, transport = ?client.transport(), "Ledger client ready");
        Ok(client)
    }

    pub fn transport(&self) -> Transport {
        match self {
            Self::JsonRpc(_) => Transport::JsonRpc,
            Self::WebSocket(_) => Transport::WebSocket,
        }
    }

    /// Release the connection, if the transport holds one.
    pub async fn close(&self) {
        if let Self::WebSocket(source) = self {
            source.close().await;
        }
    }
}

#[async_trait]
impl TrustlineSource for LedgerClient {
    async fn account_lines(
        &self,
        request: &AccountLinesRequest,
    ) -> Result<TrustlinePage, SourceError> {
        match self {
            Self::JsonRpc(source) => source.account_lines(request).await,
            Self::WebSocket(source) => source.account_lines(request).await,
        }
    }
}
