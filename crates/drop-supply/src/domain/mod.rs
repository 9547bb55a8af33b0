//! # Domain Layer
//!
//! Pure supply logic: trustlines, totals, the snapshot record and the
//! currency/amount value objects.
//!
//! ## Hexagonal Architecture
//!
//! This module contains NO I/O dependencies. The ledger and the output
//! file are reached through ports in the `ports` module.

pub mod amount;
pub mod entities;
pub mod errors;
pub mod value_objects;

pub use amount::*;
pub use entities::*;
pub use errors::*;
pub use value_objects::*;
