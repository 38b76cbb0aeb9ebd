//! Pharmacy inventory domain module.
//!
//! This crate contains business rules for medicines and sales, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod medicine;
pub mod sale;

pub use medicine::{EXPIRY_YEAR_WINDOW, Medicine, MedicineUpdate, NewMedicine};
pub use sale::{Sale, validate_sale_quantity};
