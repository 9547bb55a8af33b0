//! Service Layer
//!
//! Application services that drive the domain through the ports:
//! pagination, aggregation, publishing and the end-to-end job.

pub mod aggregator;
pub mod job;
pub mod pages;
pub mod publisher;

pub use aggregator::TrustlineAggregator;
pub use job::SupplyJob;
pub use pages::TrustlinePages;
pub use publisher::SnapshotPublisher;
