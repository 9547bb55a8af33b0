//! # Outbound Ports (Driven Ports)
//!
//! What a supply run needs from the outside world: trustline listings,
//! somewhere to keep the published snapshot, and a clock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::domain::{PageCursor, SnapshotStoreError, SourceError, SupplySnapshot, TrustlinePage};

/// Ledger selector used for every query. Only validated ledgers are final.
pub const VALIDATED_LEDGER: &str = "validated";

/// Parameters of one `account_lines` request.
///
/// `marker` is skipped entirely when absent: the first page must not carry
/// the field at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountLinesRequest {
    pub account: String,
    pub ledger_index: &'static str,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<PageCursor>,
}

impl AccountLinesRequest {
    pub fn first_page(account: &str, limit: u32) -> Self {
        Self {
            account: account.to_string(),
            ledger_index: VALIDATED_LEDGER,
            limit,
            marker: None,
        }
    }

    pub fn after(account: &str, limit: u32, cursor: PageCursor) -> Self {
        Self {
            marker: Some(cursor),
            ..Self::first_page(account, limit)
        }
    }
}

/// Source of trustline pages (an XRPL node, or a test double).
#[async_trait]
pub trait TrustlineSource: Send + Sync {
    /// Fetch a single page of trustlines.
    async fn account_lines(
        &self,
        request: &AccountLinesRequest,
    ) -> Result<TrustlinePage, SourceError>;
}

/// Persistence for the published snapshot.
pub trait SnapshotStore: Send + Sync {
    /// Load the currently published snapshot as raw JSON.
    ///
    /// - `Ok(None)`: nothing published yet
    /// - `Err(StaleSnapshotParse)`: something is there but it is not JSON
    fn load(&self) -> Result<Option<Value>, SnapshotStoreError>;

    /// Replace the published snapshot. Must not leave a partial file behind.
    fn store(&self, snapshot: &SupplySnapshot) -> Result<(), SnapshotStoreError>;

    /// Human-readable location, for log and console output.
    fn location(&self) -> String;
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_page_omits_marker() {
        let request = AccountLinesRequest::first_page("rIssuer", 400);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"account": "rIssuer", "ledger_index": "validated", "limit": 400})
        );
    }

    #[test]
    fn test_follow_up_page_carries_marker() {
        let cursor = PageCursor::from_marker(Some(json!("ABC,1"))).unwrap();
        let request = AccountLinesRequest::after("rIssuer", 400, cursor);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"account": "rIssuer", "ledger_index": "validated", "limit": 400, "marker": "ABC,1"})
        );
    }
}
