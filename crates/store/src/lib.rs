//! `pharmatrack-store` — SQLite-backed inventory and sales store.
//!
//! Owns the durable record of medicines and sale events: medicines CRUD,
//! atomic sale recording against stock, and the derived alert queries
//! (out-of-stock, expiring-soon, expired). The presentation layer calls in
//! with validated domain inputs and renders whatever comes back.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{InventoryStore, MissingIdPolicy};
