//! The [`InventoryStore`]: medicines CRUD, sale recording, alert queries.

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use pharmatrack_core::{
    DEFAULT_EXPIRY_HORIZON_DAYS, DomainError, ExpiryMonth, MedicineId, SaleId,
};
use pharmatrack_inventory::{Medicine, MedicineUpdate, NewMedicine, Sale, validate_sale_quantity};

use crate::error::StoreResult;

/// How update/delete report an id that matches no row.
///
/// The legacy system issued the UPDATE/DELETE blindly and reported success
/// whether or not a row matched. `Report` surfaces `NotFound` instead;
/// `SilentSuccess` reproduces the legacy behavior for compatibility testing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum MissingIdPolicy {
    #[default]
    Report,
    SilentSuccess,
}

/// SQLite-backed store for medicines and sales.
///
/// Holds one shared connection pool for the life of the process. Every
/// mutating operation runs inside a single transaction, so a check and the
/// write it guards cannot interleave with another writer; dropping the
/// transaction on an error path rolls it back.
#[derive(Debug, Clone)]
pub struct InventoryStore {
    pool: SqlitePool,
    missing_id_policy: MissingIdPolicy,
}

impl InventoryStore {
    /// Open a store backed by the SQLite file at `path`, creating the file
    /// and schema if absent.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::with_pool(pool).await
    }

    /// In-memory store, primarily for tests.
    pub async fn in_memory() -> StoreResult<Self> {
        // Each pooled connection would otherwise see its own private
        // in-memory database; cap the pool at one connection.
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    /// Wrap an existing pool, creating the schema if absent.
    pub async fn with_pool(pool: SqlitePool) -> StoreResult<Self> {
        init_schema(&pool).await?;
        Ok(Self {
            pool,
            missing_id_policy: MissingIdPolicy::default(),
        })
    }

    /// Select how update/delete report a missing id.
    pub fn with_missing_id_policy(mut self, policy: MissingIdPolicy) -> Self {
        self.missing_id_policy = policy;
        self
    }

    /// Add a new medicine.
    ///
    /// The name-uniqueness check and the insert run in one transaction, so
    /// two concurrent adds of the same name cannot both succeed.
    pub async fn add(&self, new: &NewMedicine) -> StoreResult<Medicine> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM medicines WHERE name = ?1")
            .bind(new.name())
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() {
            tracing::warn!(name = new.name(), "rejected add: duplicate name");
            return Err(DomainError::duplicate_name(new.name()).into());
        }

        let expiry = new.expiry_date().to_string();
        let result = sqlx::query(
            "INSERT INTO medicines (name, price, quantity, expiry_date) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(new.name())
        .bind(new.price())
        .bind(new.quantity())
        .bind(&expiry)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        let id = MedicineId::from_raw(result.last_insert_rowid());
        tracing::debug!(%id, name = new.name(), "medicine added");
        Ok(Medicine {
            id,
            name: new.name().to_string(),
            price: new.price(),
            quantity: new.quantity(),
            expiry_date: new.expiry_date(),
        })
    }

    /// Replace all fields of the medicine identified by `id`.
    pub async fn update(&self, id: MedicineId, update: &MedicineUpdate) -> StoreResult<()> {
        let expiry = update.expiry_date().to_string();
        let result = sqlx::query(
            "UPDATE medicines SET name = ?1, price = ?2, quantity = ?3, expiry_date = ?4 \
             WHERE id = ?5",
        )
        .bind(update.name())
        .bind(update.price())
        .bind(update.quantity())
        .bind(&expiry)
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        self.check_affected(id, result.rows_affected(), "update")?;
        tracing::debug!(%id, "medicine updated");
        Ok(())
    }

    /// Remove the medicine row with the given `id`.
    ///
    /// Sale rows referencing the id are left in place and become dangling
    /// references.
    pub async fn delete(&self, id: MedicineId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM medicines WHERE id = ?1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        self.check_affected(id, result.rows_affected(), "delete")?;
        tracing::debug!(%id, "medicine deleted");
        Ok(())
    }

    /// Every medicine, in insertion order.
    pub async fn get_all(&self) -> StoreResult<Vec<Medicine>> {
        let rows = sqlx::query(
            "SELECT id, name, price, quantity, expiry_date FROM medicines ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(medicine_from_row).collect()
    }

    /// Medicines whose name contains `term` as a substring.
    pub async fn search(&self, term: &str) -> StoreResult<Vec<Medicine>> {
        let pattern = format!("%{term}%");
        let rows = sqlx::query(
            "SELECT id, name, price, quantity, expiry_date FROM medicines \
             WHERE name LIKE ?1 ORDER BY id",
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(medicine_from_row).collect()
    }

    /// Record a sale: append a sale row and decrement stock, atomically.
    ///
    /// The quantity on hand is re-read inside the transaction, so a stale
    /// caller-side snapshot cannot drive stock negative; an overdraw is
    /// rejected with `InsufficientStock`, never clamped.
    pub async fn record_sale(&self, medicine_id: MedicineId, quantity: i64) -> StoreResult<Sale> {
        validate_sale_quantity(quantity)?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT quantity FROM medicines WHERE id = ?1")
            .bind(medicine_id.as_i64())
            .fetch_optional(&mut *tx)
            .await?;
        let available: i64 = match row {
            Some(row) => row.try_get("quantity")?,
            None => return Err(DomainError::not_found(medicine_id).into()),
        };
        if quantity > available {
            tracing::warn!(
                %medicine_id,
                quantity,
                available,
                "rejected sale: insufficient stock"
            );
            return Err(DomainError::insufficient_stock(quantity, available).into());
        }

        let inserted = sqlx::query("INSERT INTO sales (medicine_id, quantity) VALUES (?1, ?2)")
            .bind(medicine_id.as_i64())
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE medicines SET quantity = quantity - ?1 WHERE id = ?2")
            .bind(quantity)
            .bind(medicine_id.as_i64())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let sale = Sale {
            id: SaleId::from_raw(inserted.last_insert_rowid()),
            medicine_id,
            quantity,
        };
        tracing::debug!(sale_id = %sale.id, %medicine_id, quantity, "sale recorded");
        Ok(sale)
    }

    /// Sale events recorded against a medicine, oldest first.
    ///
    /// Sales are append-only; this read exists for audit display and keeps
    /// working after the medicine itself has been deleted.
    pub async fn sales_for(&self, medicine_id: MedicineId) -> StoreResult<Vec<Sale>> {
        let rows = sqlx::query(
            "SELECT id, medicine_id, quantity FROM sales WHERE medicine_id = ?1 ORDER BY id",
        )
        .bind(medicine_id.as_i64())
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| {
                Ok(Sale {
                    id: SaleId::from_raw(row.try_get("id")?),
                    medicine_id: MedicineId::from_raw(row.try_get("medicine_id")?),
                    quantity: row.try_get("quantity")?,
                })
            })
            .collect()
    }

    /// Medicines with zero stock on hand.
    pub async fn out_of_stock(&self) -> StoreResult<Vec<Medicine>> {
        let rows = sqlx::query(
            "SELECT id, name, price, quantity, expiry_date FROM medicines \
             WHERE quantity = 0 ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(medicine_from_row).collect()
    }

    /// Medicines expiring within the default 30-day horizon of now.
    pub async fn expiring_soon(&self) -> StoreResult<Vec<Medicine>> {
        self.expiring_soon_at(Utc::now(), DEFAULT_EXPIRY_HORIZON_DAYS)
            .await
    }

    /// Medicines expiring within `horizon_days` of now.
    pub async fn expiring_soon_within(&self, horizon_days: i64) -> StoreResult<Vec<Medicine>> {
        self.expiring_soon_at(Utc::now(), horizon_days).await
    }

    /// Clock-injected variant of [`Self::expiring_soon_within`]: matches
    /// every medicine whose expiry month is at or before the month floor of
    /// `at + horizon_days` (inclusive, so the current month qualifies).
    pub async fn expiring_soon_at(
        &self,
        at: DateTime<Utc>,
        horizon_days: i64,
    ) -> StoreResult<Vec<Medicine>> {
        let threshold = ExpiryMonth::horizon(at, horizon_days).to_string();
        let rows = sqlx::query(
            "SELECT id, name, price, quantity, expiry_date FROM medicines \
             WHERE expiry_date <= ?1 ORDER BY id",
        )
        .bind(&threshold)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(medicine_from_row).collect()
    }

    /// Medicines whose expiry month is strictly before the current month.
    pub async fn expired(&self) -> StoreResult<Vec<Medicine>> {
        self.expired_at(Utc::now()).await
    }

    /// Clock-injected variant of [`Self::expired`].
    pub async fn expired_at(&self, at: DateTime<Utc>) -> StoreResult<Vec<Medicine>> {
        let current = ExpiryMonth::from_datetime(at).to_string();
        let rows = sqlx::query(
            "SELECT id, name, price, quantity, expiry_date FROM medicines \
             WHERE expiry_date < ?1 ORDER BY id",
        )
        .bind(&current)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(medicine_from_row).collect()
    }

    fn check_affected(&self, id: MedicineId, rows_affected: u64, op: &str) -> StoreResult<()> {
        if rows_affected == 0 && self.missing_id_policy == MissingIdPolicy::Report {
            tracing::warn!(%id, op, "no row matched id");
            return Err(DomainError::not_found(id).into());
        }
        Ok(())
    }
}

fn medicine_from_row(row: &SqliteRow) -> StoreResult<Medicine> {
    let expiry: String = row.try_get("expiry_date")?;
    let expiry_date: ExpiryMonth = expiry.parse()?;
    Ok(Medicine {
        id: MedicineId::from_raw(row.try_get("id")?),
        name: row.try_get("name")?,
        price: row.try_get("price")?,
        quantity: row.try_get("quantity")?,
        expiry_date,
    })
}

/// Create the two tables if absent. No uniqueness constraint on `name` and
/// no enforced foreign key on `sales.medicine_id`; those invariants live in
/// the operations above.
async fn init_schema(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS medicines (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            price       REAL NOT NULL,
            quantity    INTEGER NOT NULL,
            expiry_date TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sales (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            medicine_id INTEGER NOT NULL,
            quantity    INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
