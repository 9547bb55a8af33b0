//! # Adapters Layer
//!
//! Implementations of the outbound ports.
//!
//! - `websocket` / `json_rpc`: XRPL transports, selected by `ledger_client`
//! - `snapshot_file`: atomic JSON file store
//! - `time`: system and fixed clocks
//! - `memory`: in-memory source and store for tests and offline runs

pub mod json_rpc;
pub mod ledger_client;
pub mod memory;
pub mod snapshot_file;
pub mod time;
pub mod websocket;
mod wire;

pub use json_rpc::JsonRpcSource;
pub use ledger_client::LedgerClient;
pub use memory::{InMemorySnapshotStore, InMemoryTrustlineSource};
pub use snapshot_file::FileSnapshotStore;
pub use time::{FixedTimeSource, SystemTimeSource};
pub use websocket::WebSocketSource;
