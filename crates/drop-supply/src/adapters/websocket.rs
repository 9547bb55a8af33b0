//! XRPL WebSocket transport (`ws://` / `wss://` endpoints).
//!
//! One connection per run. Requests are sent one at a time and the
//! response is matched by `id`; unrelated frames (stream messages, stale
//! responses) are skipped.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};

use crate::adapters::wire::{parse_account_lines, rpc_error};
use crate::domain::{SourceError, TrustlinePage};
use crate::ports::{AccountLinesRequest, TrustlineSource};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A WebSocket command frame: the request fields flattened next to
/// `id` and `command`.
#[derive(Debug, Serialize)]
struct WsCommand<'a, P: Serialize> {
    id: u64,
    command: &'static str,
    #[serde(flatten)]
    params: &'a P,
}

/// Trustline source over a persistent XRPL WebSocket connection.
pub struct WebSocketSource {
    stream: Mutex<WsStream>,
    request_id: AtomicU64,
    timeout: Duration,
}

impl WebSocketSource {
    /// Open the connection. `timeout` bounds the handshake and every
    /// later request/response exchange.
    pub async fn connect(
        ws_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let ws_url = ws_url.into();
        let (stream, _) = tokio::time::timeout(timeout, connect_async(ws_url.as_str()))
            .await
            .map_err(|_| SourceError::Timeout(timeout))?
            .map_err(|e| SourceError::Connection(format!("Failed to connect to {ws_url}: {e}")))?;

        debug!(url = %ws_url, "WebSocket connected");
        Ok(Self {
            stream: Mutex::new(stream),
            request_id: AtomicU64::new(1),
            timeout,
        })
    }

    /// Close the connection politely. Errors are logged and ignored.
    pub async fn close(&self) {
        let mut stream = self.stream.lock().await;
        if let Err(e) = stream.close(None).await {
            debug!(error = %e, "WebSocket close failed");
        }
    }

    async fn request<P: Serialize + Sync>(
        &self,
        command: &'static str,
        params: &P,
    ) -> Result<Value, SourceError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let frame = serde_json::to_string(&WsCommand { id, command, params }).map_err(|e| {
            SourceError::MalformedResponse(format!("Failed to encode request: {e}"))
        })?;

        let mut stream = self.stream.lock().await;
        tokio::time::timeout(self.timeout, exchange(&mut stream, id, frame))
            .await
            .map_err(|_| SourceError::Timeout(self.timeout))?
    }
}

/// Send `frame` and wait for the response carrying `id`.
async fn exchange(stream: &mut WsStream, id: u64, frame: String) -> Result<Value, SourceError> {
    stream
        .send(Message::Text(frame.into()))
        .await
        .map_err(|e| SourceError::Connection(format!("Failed to send request: {e}")))?;

    while let Some(message) = stream.next().await {
        let message =
            message.map_err(|e| SourceError::Connection(format!("WebSocket error: {e}")))?;

        let text = match message {
            Message::Text(text) => text.as_str().to_owned(),
            Message::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Message::Ping(payload) => {
                stream
                    .send(Message::Pong(payload))
                    .await
                    .map_err(|e| SourceError::Connection(format!("Failed to send pong: {e}")))?;
                continue;
            }
            Message::Close(_) => {
                return Err(SourceError::Connection(
                    "Server closed the connection".to_string(),
                ))
            }
            Message::Pong(_) | Message::Frame(_) => continue,
        };

        let mut body: Value = serde_json::from_str(&text)
            .map_err(|e| SourceError::MalformedResponse(format!("Invalid JSON frame: {e}")))?;

        if body.get("id").and_then(Value::as_u64) != Some(id) {
            trace!(expected = id, "Skipping unrelated frame");
            continue;
        }

        if let Some(err) = rpc_error(&body) {
            return Err(err);
        }
        return body
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| SourceError::MalformedResponse("response missing result".into()));
    }

    Err(SourceError::Connection(
        "Connection ended before a response arrived".to_string(),
    ))
}

#[async_trait]
impl TrustlineSource for WebSocketSource {
    async fn account_lines(
        &self,
        request: &AccountLinesRequest,
    ) -> Result<TrustlinePage, SourceError> {
        let result = self.request("account_lines", request).await?;
        parse_account_lines(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PageCursor;
    use serde_json::json;
    use tokio::net::TcpListener;

    #[test]
    fn test_command_frame_flattens_request() {
        let cursor = PageCursor::from_marker(Some(json!("M1"))).unwrap();
        let request = AccountLinesRequest::after("rIssuer", 400, cursor);
        let frame = serde_json::to_value(WsCommand {
            id: 7,
            command: "account_lines",
            params: &request,
        })
        .unwrap();

        assert_eq!(
            frame,
            json!({
                "id": 7,
                "command": "account_lines",
                "account": "rIssuer",
                "ledger_index": "validated",
                "limit": 400,
                "marker": "M1"
            })
        );
    }

    /// Serve one connection, answering each command with `reply(command)`.
    async fn serve<F>(reply: F) -> String
    where
        F: Fn(Value) -> Vec<Value> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            while let Some(Ok(message)) = ws.next().await {
                if let Message::Text(text) = message {
                    let command: Value = serde_json::from_str(text.as_str()).unwrap();
                    for frame in reply(command) {
                        ws.send(Message::Text(frame.to_string().into())).await.unwrap();
                    }
                }
            }
        });
        format!("ws://{addr}")
    }

    #[tokio::test]
    async fn test_response_matched_by_id() {
        let url = serve(|command| {
            let id = command["id"].clone();
            vec![
                json!({"type": "ledgerClosed", "ledger_index": 1}),
                json!({"id": 999, "status": "success", "result": {"lines": []}}),
                json!({
                    "id": id,
                    "status": "success",
                    "type": "response",
                    "result": {
                        "account": command["account"],
                        "lines": [{"account": "rA", "currency": "DROP", "balance": "-2"}],
                        "marker": "NEXT"
                    }
                }),
            ]
        })
        .await;

        let source = WebSocketSource::connect(url, Duration::from_secs(5)).await.unwrap();
        let page = source
            .account_lines(&AccountLinesRequest::first_page("rIssuer", 10))
            .await
            .unwrap();

        assert_eq!(page.lines.len(), 1);
        assert_eq!(page.cursor.unwrap().as_value(), &json!("NEXT"));
        source.close().await;
    }

    #[tokio::test]
    async fn test_error_response_maps_to_rpc_error() {
        let url = serve(|command| {
            vec![json!({
                "id": command["id"],
                "status": "error",
                "type": "response",
                "error": "actNotFound",
                "error_message": "Account not found."
            })]
        })
        .await;

        let source = WebSocketSource::connect(url, Duration::from_secs(5)).await.unwrap();
        let err = source
            .account_lines(&AccountLinesRequest::first_page("rMissing", 10))
            .await
            .unwrap_err();

        assert!(matches!(err, SourceError::Rpc { ref code, .. } if code == "actNotFound"));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let url = serve(|_| Vec::new()).await;

        let source = WebSocketSource::connect(url, Duration::from_millis(200))
            .await
            .unwrap();
        let err = source
            .account_lines(&AccountLinesRequest::first_page("rIssuer", 10))
            .await
            .unwrap_err();

        assert!(matches!(err, SourceError::Timeout(_)));
    }
}
