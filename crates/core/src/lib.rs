//! `pharmatrack-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod expiry;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use expiry::{DEFAULT_EXPIRY_HORIZON_DAYS, ExpiryMonth};
pub use id::{MedicineId, SaleId};
