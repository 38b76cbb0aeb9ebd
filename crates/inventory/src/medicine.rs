use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use pharmatrack_core::{DomainError, DomainResult, ExpiryMonth, MedicineId};

/// Number of years beyond the current one a new expiry date may fall in.
/// Together with the current year this spans the ten-year entry window.
pub const EXPIRY_YEAR_WINDOW: i32 = 9;

/// A stock-keeping unit: one medicine row as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub id: MedicineId,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub expiry_date: ExpiryMonth,
}

impl Medicine {
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }

    /// Expired strictly before the month containing `at`.
    pub fn is_expired(&self, at: DateTime<Utc>) -> bool {
        self.expiry_date < ExpiryMonth::from_datetime(at)
    }

    /// Expiring within `horizon_days` of `at`, current month inclusive.
    pub fn is_expiring_soon(&self, at: DateTime<Utc>, horizon_days: i64) -> bool {
        self.expiry_date <= ExpiryMonth::horizon(at, horizon_days)
    }
}

/// Validated input for adding a new medicine.
///
/// New stock must arrive with a positive quantity; an entry of zero is
/// rejected here rather than stored as an immediately out-of-stock row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMedicine {
    name: String,
    price: f64,
    quantity: i64,
    expiry_date: ExpiryMonth,
}

impl NewMedicine {
    /// Validate input for the Add operation.
    ///
    /// `at` anchors the accepted expiry window: the expiry year must fall in
    /// `[at.year, at.year + EXPIRY_YEAR_WINDOW]`.
    pub fn new(
        name: impl Into<String>,
        price: f64,
        quantity: i64,
        expiry_date: ExpiryMonth,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        validate_price(price)?;
        if quantity < 1 {
            return Err(DomainError::validation(format!(
                "quantity for new stock must be positive: {quantity}"
            )));
        }
        validate_expiry_window(expiry_date, at)?;
        Ok(Self {
            name,
            price,
            quantity,
            expiry_date,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn expiry_date(&self) -> ExpiryMonth {
        self.expiry_date
    }
}

/// Validated input for a full-field replace of an existing medicine.
///
/// Unlike [`NewMedicine`], a zero quantity is allowed: an update may record
/// stock running out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineUpdate {
    name: String,
    price: f64,
    quantity: i64,
    expiry_date: ExpiryMonth,
}

impl MedicineUpdate {
    pub fn new(
        name: impl Into<String>,
        price: f64,
        quantity: i64,
        expiry_date: ExpiryMonth,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        validate_price(price)?;
        if quantity < 0 {
            return Err(DomainError::validation(format!(
                "quantity cannot be negative: {quantity}"
            )));
        }
        validate_expiry_window(expiry_date, at)?;
        Ok(Self {
            name,
            price,
            quantity,
            expiry_date,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn expiry_date(&self) -> ExpiryMonth {
        self.expiry_date
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(())
}

fn validate_price(price: f64) -> DomainResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(DomainError::validation(format!(
            "price must be a non-negative number: {price}"
        )));
    }
    Ok(())
}

fn validate_expiry_window(expiry: ExpiryMonth, at: DateTime<Utc>) -> DomainResult<()> {
    let min = at.year();
    let max = min + EXPIRY_YEAR_WINDOW;
    if expiry.year() < min || expiry.year() > max {
        return Err(DomainError::validation(format!(
            "expiry year {} outside the accepted window {min}..={max}",
            expiry.year()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 15, 12, 0, 0).unwrap()
    }

    fn expiry(s: &str) -> ExpiryMonth {
        s.parse().unwrap()
    }

    #[test]
    fn new_medicine_accepts_valid_input() {
        let new = NewMedicine::new("Paracetamol", 2.5, 100, expiry("2027-06"), test_now()).unwrap();
        assert_eq!(new.name(), "Paracetamol");
        assert_eq!(new.quantity(), 100);
    }

    #[test]
    fn new_medicine_rejects_blank_name() {
        let err = NewMedicine::new("   ", 2.5, 100, expiry("2027-06"), test_now()).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn new_medicine_rejects_negative_price() {
        assert!(NewMedicine::new("Aspirin", -0.01, 10, expiry("2027-06"), test_now()).is_err());
        assert!(NewMedicine::new("Aspirin", f64::NAN, 10, expiry("2027-06"), test_now()).is_err());
    }

    #[test]
    fn new_medicine_rejects_non_positive_quantity() {
        assert!(NewMedicine::new("Aspirin", 1.0, 0, expiry("2027-06"), test_now()).is_err());
        assert!(NewMedicine::new("Aspirin", 1.0, -5, expiry("2027-06"), test_now()).is_err());
    }

    #[test]
    fn expiry_window_spans_ten_years_inclusive() {
        // Current year and current year + 9 are the window edges.
        assert!(NewMedicine::new("A", 1.0, 1, expiry("2026-01"), test_now()).is_ok());
        assert!(NewMedicine::new("A", 1.0, 1, expiry("2035-12"), test_now()).is_ok());
        assert!(NewMedicine::new("A", 1.0, 1, expiry("2025-12"), test_now()).is_err());
        assert!(NewMedicine::new("A", 1.0, 1, expiry("2036-01"), test_now()).is_err());
    }

    #[test]
    fn update_allows_zero_quantity_but_not_negative() {
        assert!(MedicineUpdate::new("Aspirin", 1.0, 0, expiry("2027-06"), test_now()).is_ok());
        assert!(MedicineUpdate::new("Aspirin", 1.0, -1, expiry("2027-06"), test_now()).is_err());
    }

    #[test]
    fn expiry_classification_boundaries() {
        let med = Medicine {
            id: MedicineId::from_raw(1),
            name: "Aspirin".to_string(),
            price: 1.0,
            quantity: 5,
            expiry_date: expiry("2026-08"),
        };
        // Current month: not expired (strict <), but expiring soon (<=).
        assert!(!med.is_expired(test_now()));
        assert!(med.is_expiring_soon(test_now(), 30));

        let last_month = Medicine {
            expiry_date: expiry("2026-07"),
            ..med.clone()
        };
        assert!(last_month.is_expired(test_now()));
    }

    #[test]
    fn medicine_serializes_expiry_as_string() {
        let med = Medicine {
            id: MedicineId::from_raw(7),
            name: "Ibuprofen".to_string(),
            price: 3.0,
            quantity: 10,
            expiry_date: expiry("2027-01"),
        };
        let json = serde_json::to_value(&med).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["expiry_date"], "2027-01");
    }
}
