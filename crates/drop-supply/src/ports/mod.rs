//! # Ports Layer
//!
//! - **Driving Ports (Inbound)**: APIs consumed by the binary
//! - **Driven Ports (Outbound)**: SPIs implemented by adapters (ledger transports, file store, clock)

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
