//! Supply Job
//!
//! One end-to-end run: aggregate, build, publish, all under a single
//! deadline. Nothing is written unless every step before the write succeeded.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

use crate::config::SupplyConfig;
use crate::domain::{JobError, RunReport};
use crate::ports::{SnapshotStore, SupplyApi, TimeSource, TrustlineSource};
use crate::service::aggregator::TrustlineAggregator;
use crate::service::publisher::SnapshotPublisher;

/// Implements [`SupplyApi`] over injected ports.
pub struct SupplyJob<S, St, C>
where
    S: TrustlineSource + ?Sized,
    St: SnapshotStore + ?Sized,
    C: TimeSource + ?Sized,
{
    aggregator: TrustlineAggregator<S>,
    publisher: SnapshotPublisher<St, C>,
    deadline: Duration,
}

impl<S, St, C> SupplyJob<S, St, C>
where
    S: TrustlineSource + ?Sized,
    St: SnapshotStore + ?Sized,
    C: TimeSource + ?Sized,
{
    pub fn new(source: Arc<S>, store: Arc<St>, clock: Arc<C>, config: &SupplyConfig) -> Self {
        Self {
            aggregator: TrustlineAggregator::new(source, config),
            publisher: SnapshotPublisher::new(store, clock, config),
            deadline: config.run_deadline,
        }
    }

    async fn run_once(&self) -> Result<RunReport, JobError> {
        let totals = self.aggregator.aggregate().await?;
        let (snapshot, outcome) = self.publisher.publish(&totals)?;
        Ok(RunReport { snapshot, outcome })
    }
}

#[async_trait]
impl<S, St, C> SupplyApi for SupplyJob<S, St, C>
where
    S: TrustlineSource + ?Sized + 'static,
    St: SnapshotStore + ?Sized + 'static,
    C: TimeSource + ?Sized + 'static,
{
    #[instrument(skip(self), fields(deadline = ?self.deadline))]
    async fn run(&self) -> Result<RunReport, JobError> {
        let report = tokio::time::timeout(self.deadline, self.run_once())
            .await
            .map_err(|_| JobError::DeadlineExceeded(self.deadline))??;

        info!(
            outcome = ?report.outcome,
            circulating = %report.snapshot.circulating_supply,
            "Supply run finished"
        );
        Ok(report)
    }
}
