//! # Inbound Ports (Driving Ports)
//!
//! The API the binary drives.

use async_trait::async_trait;

use crate::domain::{JobError, RunReport};

/// One end-to-end supply run: aggregate trustlines, then publish.
#[async_trait]
pub trait SupplyApi: Send + Sync {
    /// Run once.
    ///
    /// ## Returns
    ///
    /// - `Ok(report)`: the run completed; `report.outcome` says whether the
    ///   snapshot was written
    /// - `Err(JobError)`: the run was aborted and nothing was written
    async fn run(&self) -> Result<RunReport, JobError>;
}
