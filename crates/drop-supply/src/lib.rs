//! # DROP Supply
//!
//! Batch job that computes the issued and circulating supply of an XRPL
//! issued token and publishes them as `docs/supply.json`.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure supply logic, no I/O
//!   - `TrustLine`, `TrustlinePage`, `PageCursor`: ledger data as read
//!   - `SupplyTotals`: issued and excluded balances
//!   - `SupplySnapshot`: the published record
//!   - `CurrencyCode`, `TokenConfig`: value objects
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `SupplyApi`: Driving port (one run)
//!   - `TrustlineSource`, `SnapshotStore`, `TimeSource`: Driven ports
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `TrustlinePages`: marker-driven pagination
//!   - `TrustlineAggregator`: issued supply and excluded holdings
//!   - `SnapshotPublisher`: idempotent publish
//!   - `SupplyJob`: implements `SupplyApi` under a run deadline
//!
//! - **Adapters Layer** (`adapters/`): External connections
//!   - `WebSocketSource`, `JsonRpcSource`, `LedgerClient`: XRPL transports
//!   - `FileSnapshotStore`: atomic file writes
//!   - `InMemoryTrustlineSource`, `InMemorySnapshotStore`: test doubles
//!
//! ## Invariants
//!
//! - Circulating supply = issued supply - excluded holdings, never negative
//! - A run either publishes a complete snapshot or writes nothing
//! - Re-running on an unchanged ledger leaves the output file untouched
//!
//! ## Usage Example
//!
//! ```ignore
//! use drop_supply::{FileSnapshotStore, LedgerClient, SupplyApi, SupplyConfig, SupplyJob, SystemTimeSource};
//! use std::sync::Arc;
//!
//! let mut config = SupplyConfig::default();
//! config.apply_env(|key| std::env::var(key).ok())?;
//! config.validate()?;
//! let client = Arc::new(LedgerClient::connect(&config.endpoint, config.request_timeout).await?);
//! let store = Arc::new(FileSnapshotStore::new(&config.output_path));
//! let job = SupplyJob::new(client, store, Arc::new(SystemTimeSource), &config);
//! let report = job.run().await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;
pub mod telemetry;

pub use adapters::{
    FileSnapshotStore, FixedTimeSource, InMemorySnapshotStore, InMemoryTrustlineSource,
    JsonRpcSource, LedgerClient, SystemTimeSource, WebSocketSource,
};
pub use cli::Cli;
pub use config::{ConfigError, SupplyConfig, Transport};
pub use domain::*;
pub use ports::{AccountLinesRequest, SnapshotStore, SupplyApi, TimeSource, TrustlineSource};
pub use service::{SnapshotPublisher, SupplyJob, TrustlineAggregator, TrustlinePages};
pub use telemetry::{init_logging, LogConfig, TelemetryError};
