//! Snapshot Publisher
//!
//! Turns [`SupplyTotals`] into a [`SupplySnapshot`] and writes it only when
//! it differs from the one already published. The timestamp never counts as
//! a difference, so re-running on an unchanged ledger leaves the file alone.

use chrono::SecondsFormat;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::SupplyConfig;
use crate::domain::{
    format_fixed, AccountId, PublishError, SnapshotInfo, SnapshotStoreError, SupplySnapshot,
    SupplyTotals, TokenConfig, WriteOutcome,
};
use crate::ports::{SnapshotStore, TimeSource};

pub struct SnapshotPublisher<St: SnapshotStore + ?Sized, C: TimeSource + ?Sized> {
    store: Arc<St>,
    clock: Arc<C>,
    issuer: AccountId,
    token: TokenConfig,
    excluded: Vec<AccountId>,
    explorer_url: String,
    dry_run: bool,
}

impl<St: SnapshotStore + ?Sized, C: TimeSource + ?Sized> SnapshotPublisher<St, C> {
    pub fn new(store: Arc<St>, clock: Arc<C>, config: &SupplyConfig) -> Self {
        Self {
            store,
            clock,
            issuer: config.issuer.clone(),
            token: config.token.clone(),
            excluded: config.excluded_accounts.clone(),
            explorer_url: config.explorer_url(),
            dry_run: config.dry_run,
        }
    }

    /// Where snapshots go.
    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Build the record for `totals`, stamped with the current time.
    ///
    /// Both totals are rounded to the published precision before the
    /// circulating figure is derived from them. Fails if the rounded
    /// excluded holdings exceed the rounded issued supply.
    pub fn build_snapshot(&self, totals: &SupplyTotals) -> Result<SupplySnapshot, PublishError> {
        let decimals = self.token.decimals;
        let totals = totals.rounded(decimals);
        if totals.circulating() < Decimal::ZERO {
            return Err(PublishError::NegativeCirculating {
                issued: totals.issued_fixed(decimals),
                excluded_held: totals.excluded_held_fixed(decimals),
            });
        }

        Ok(SupplySnapshot {
            symbol: self.token.symbol().to_string(),
            decimals,
            total_supply: format_fixed(self.token.total_supply, decimals),
            circulating_supply: totals.circulating_fixed(decimals),
            issued_supply: totals.issued_fixed(decimals),
            excluded_accounts: self.excluded.clone(),
            issuer: self.issuer.clone(),
            updated_at: self
                .clock
                .now()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            info: SnapshotInfo {
                xrpscan: self.explorer_url.clone(),
            },
        })
    }

    /// Build and publish in one step.
    pub fn publish(
        &self,
        totals: &SupplyTotals,
    ) -> Result<(SupplySnapshot, WriteOutcome), PublishError> {
        let snapshot = self.build_snapshot(totals)?;
        let outcome = self.publish_snapshot(&snapshot)?;
        Ok((snapshot, outcome))
    }

    /// Write `snapshot` unless it matches the published one.
    pub fn publish_snapshot(&self, snapshot: &SupplySnapshot) -> Result<WriteOutcome, PublishError> {
        let changed = self.differs_from_published(snapshot)?;

        if self.dry_run {
            info!(changed, location = %self.location(), "Dry run, not writing snapshot");
            return Ok(WriteOutcome::DryRun { changed });
        }
        if !changed {
            info!(location = %self.location(), "Snapshot unchanged");
            return Ok(WriteOutcome::Unchanged);
        }

        self.store.store(snapshot)?;
        info!(
            location = %self.location(),
            circulating = %snapshot.circulating_supply,
            issued = %snapshot.issued_supply,
            "Snapshot updated"
        );
        Ok(WriteOutcome::Updated)
    }

    fn differs_from_published(&self, snapshot: &SupplySnapshot) -> Result<bool, PublishError> {
        let previous = match self.store.load() {
            Ok(previous) => previous,
            Err(e @ SnapshotStoreError::StaleSnapshotParse { .. }) => {
                warn!(error = %e, "Ignoring unreadable snapshot");
                None
            }
            Err(e) => return Err(e.into()),
        };

        let Some(previous) = previous else {
            debug!("No published snapshot yet");
            return Ok(true);
        };

        let current = serde_json::to_value(snapshot)
            .map_err(|e| SnapshotStoreError::Serialization(e.to_string()))?;
        Ok(without_timestamp(previous) != without_timestamp(current))
    }
}

fn without_timestamp(mut value: Value) -> Value {
    if let Value::Object(map) = &mut value {
        map.remove(SupplySnapshot::TIMESTAMP_FIELD);
    }
    value
}
