//! In-memory adapters for tests and offline runs.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::domain::{
    PageCursor, SnapshotStoreError, SourceError, SupplySnapshot, TrustLine, TrustlinePage,
};
use crate::ports::{AccountLinesRequest, SnapshotStore, TrustlineSource};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Trustline source serving pre-arranged pages.
///
/// Markers are `"<account>:<page index>"`. Every request is recorded so
/// tests can assert on the exact marker sequence.
#[derive(Debug, Default)]
pub struct InMemoryTrustlineSource {
    pages: Mutex<HashMap<String, Vec<Vec<TrustLine>>>>,
    failures: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<AccountLinesRequest>>,
}

impl InMemoryTrustlineSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `pages` for `account`, in order.
    pub fn set_pages(&self, account: &str, pages: Vec<Vec<TrustLine>>) {
        lock(&self.pages).insert(account.to_string(), pages);
    }

    /// Answer every request for `account` with a malformed-response error.
    pub fn fail_account(&self, account: &str, message: &str) {
        lock(&self.failures).insert(account.to_string(), message.to_string());
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<AccountLinesRequest> {
        lock(&self.requests).clone()
    }

    fn page_index(request: &AccountLinesRequest) -> Result<usize, SourceError> {
        let Some(cursor) = &request.marker else {
            return Ok(0);
        };
        cursor
            .as_value()
            .as_str()
            .and_then(|m| m.strip_prefix(&format!("{}:", request.account)))
            .and_then(|idx| idx.parse().ok())
            .ok_or_else(|| SourceError::Rpc {
                code: "invalidParams".into(),
                message: format!("Unknown marker {}", cursor.as_value()),
            })
    }
}

#[async_trait]
impl TrustlineSource for InMemoryTrustlineSource {
    async fn account_lines(
        &self,
        request: &AccountLinesRequest,
    ) -> Result<TrustlinePage, SourceError> {
        lock(&self.requests).push(request.clone());

        if let Some(message) = lock(&self.failures).get(&request.account) {
            return Err(SourceError::MalformedResponse(message.clone()));
        }

        let pages = lock(&self.pages);
        let Some(account_pages) = pages.get(&request.account) else {
            return Err(SourceError::Rpc {
                code: "actNotFound".into(),
                message: "Account not found.".into(),
            });
        };

        let idx = Self::page_index(request)?;
        let lines = match account_pages.get(idx) {
            Some(lines) => lines.clone(),
            None if idx == 0 => Vec::new(),
            None => {
                return Err(SourceError::Rpc {
                    code: "invalidParams".into(),
                    message: format!("Marker past the last page: {idx}"),
                })
            }
        };
        let cursor = if idx + 1 < account_pages.len() {
            PageCursor::from_marker(Some(json!(format!("{}:{}", request.account, idx + 1))))
        } else {
            None
        };

        Ok(TrustlinePage { lines, cursor })
    }
}

/// Snapshot store holding the serialized text in memory.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    raw: Mutex<Option<String>>,
    writes: AtomicUsize,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `raw` as the published text, valid JSON or not.
    pub fn with_raw(raw: &str) -> Self {
        Self {
            raw: Mutex::new(Some(raw.to_string())),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn raw(&self) -> Option<String> {
        lock(&self.raw).clone()
    }

    /// Number of successful `store` calls.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load(&self) -> Result<Option<Value>, SnapshotStoreError> {
        let raw = lock(&self.raw);
        let Some(raw) = raw.as_deref() else {
            return Ok(None);
        };
        serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| SnapshotStoreError::StaleSnapshotParse {
                path: PathBuf::from(self.location()),
                message: e.to_string(),
            })
    }

    fn store(&self, snapshot: &SupplySnapshot) -> Result<(), SnapshotStoreError> {
        let text = serde_json::to_string_pretty(snapshot)
            .map_err(|e| SnapshotStoreError::Serialization(e.to_string()))?;
        *lock(&self.raw) = Some(text);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
