//! # Domain Errors
//!
//! Error types for each stage of a supply run.
//!
//! | Stage | Type | Fatal |
//! |-------|------|-------|
//! | Ledger query | [`SourceError`] | yes, via [`AggregationError`] |
//! | Aggregation | [`AggregationError`] | yes |
//! | Snapshot persistence | [`SnapshotStoreError`] | `Io` yes, `StaleSnapshotParse` no |
//! | Publishing | [`PublishError`] | yes |
//! | Whole run | [`JobError`] | yes |

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use super::value_objects::AccountId;

/// Invalid currency code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    #[error("currency code is empty")]
    Empty,

    #[error("currency code {0:?} must be printable ASCII")]
    NotAscii(String),

    #[error("currency code is {len} bytes, maximum is {max}")]
    TooLong { len: usize, max: usize },

    #[error("XRP is the native asset and has no trustlines")]
    NativeAsset,

    #[error("invalid 160-bit hex currency code: {0}")]
    InvalidHex(String),
}

/// Failures talking to the ledger data source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Ledger returned error {code}: {message}")]
    Rpc { code: String, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Errors that abort the trustline aggregation.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("account_lines walk for {account} failed on page {page}: {source}")]
    Source {
        account: AccountId,
        page: usize,
        #[source]
        source: SourceError,
    },

    /// A counted line whose balance is not a number, or is too large to sum.
    #[error("Unusable balance {value:?} on {account} trustline with {counterparty}")]
    InvalidBalance {
        account: AccountId,
        counterparty: AccountId,
        value: String,
    },

    #[error("Balance total overflowed while summing trustlines of {account}")]
    Overflow { account: AccountId },
}

/// Errors from the snapshot store.
#[derive(Debug, Error)]
pub enum SnapshotStoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The previous snapshot exists but is not valid JSON.
    #[error("Stale snapshot at {path} is not valid JSON: {message}")]
    StaleSnapshotParse { path: PathBuf, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors that abort publishing.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Excluded holdings {excluded_held} exceed issued supply {issued}")]
    NegativeCirculating {
        issued: String,
        excluded_held: String,
    },

    #[error("Failed to write snapshot: {0}")]
    OutputIo(#[from] SnapshotStoreError),
}

/// Errors that abort a whole supply run.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("Run exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),
}
