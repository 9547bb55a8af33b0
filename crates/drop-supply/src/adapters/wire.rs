//! `account_lines` wire format shared by the WebSocket and JSON-RPC
//! transports.
//!
//! Both transports end up with the same `result` object:
//!
//! ```json
//! {"account": "r...", "lines": [{"account": "r...", "currency": "DROP", "balance": "-5", ...}],
//!  "marker": "...", "ledger_index": 123, "validated": true}
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{PageCursor, SourceError, TrustLine, TrustlinePage};

/// The fields of a trustline entry this crate reads. Everything else
/// (limits, flags, quality) is ignored.
#[derive(Debug, Deserialize)]
struct RawLine {
    account: String,
    currency: String,
    balance: Value,
}

/// Decode an `account_lines` result object into a page.
pub(crate) fn parse_account_lines(mut result: Value) -> Result<TrustlinePage, SourceError> {
    if let Some(err) = rpc_error(&result) {
        return Err(err);
    }

    let Some(object) = result.as_object_mut() else {
        return Err(SourceError::MalformedResponse(
            "result is not an object".to_string(),
        ));
    };

    let lines = match object.remove("lines") {
        Some(Value::Array(lines)) => lines,
        Some(_) => {
            return Err(SourceError::MalformedResponse(
                "result.lines is not an array".to_string(),
            ))
        }
        None => {
            return Err(SourceError::MalformedResponse(
                "missing result.lines".to_string(),
            ))
        }
    };

    let lines = lines
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| parse_line(idx, raw))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TrustlinePage {
        lines,
        cursor: PageCursor::from_marker(object.remove("marker")),
    })
}

fn parse_line(idx: usize, raw: Value) -> Result<TrustLine, SourceError> {
    let raw: RawLine = serde_json::from_value(raw)
        .map_err(|e| SourceError::MalformedResponse(format!("result.lines[{idx}]: {e}")))?;

    // Kept as text; only lines that count toward a total get parsed.
    let balance = match raw.balance {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        other => {
            return Err(SourceError::MalformedResponse(format!(
                "result.lines[{idx}].balance is not a string: {other}"
            )))
        }
    };

    Ok(TrustLine {
        counterparty: raw.account,
        currency: raw.currency,
        balance,
    })
}

/// Extract a ledger-reported error, if `body` carries one.
///
/// rippled signals failure with `"status": "error"` and an `error` code,
/// optionally explained by `error_message`.
pub(crate) fn rpc_error(body: &Value) -> Option<SourceError> {
    let status_error = body.get("status").and_then(Value::as_str) == Some("error");
    let code = body.get("error");
    if !status_error && code.is_none() {
        return None;
    }

    let code = match code {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "unknown".to_string(),
    };
    let message = body
        .get("error_message")
        .and_then(Value::as_str)
        .unwrap_or(code.as_str())
        .to_string();

    Some(SourceError::Rpc { code, message })
}
