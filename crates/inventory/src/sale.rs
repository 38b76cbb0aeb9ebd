use serde::{Deserialize, Serialize};

use pharmatrack_core::{DomainError, DomainResult, MedicineId, SaleId};

/// An append-only record of one sale event.
///
/// `medicine_id` is a weak reference: deleting a medicine leaves its sales
/// in place, so the id may no longer resolve.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub medicine_id: MedicineId,
    pub quantity: i64,
}

/// Validate a requested sale quantity before it reaches storage.
pub fn validate_sale_quantity(quantity: i64) -> DomainResult<()> {
    if quantity < 1 {
        return Err(DomainError::validation(format!(
            "sale quantity must be positive: {quantity}"
        )));
    }
    Ok(())
}
