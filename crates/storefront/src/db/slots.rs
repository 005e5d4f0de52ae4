//! Durable slot repository.
//!
//! One row per visitor and slot key; the value is the slot's JSON text exactly
//! as the record store wrote it.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::VisitorId;

/// A stored durable slot.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SlotRow {
    pub slot_key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository for durable slot rows.
pub struct SlotRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SlotRepository<'a> {
    /// Create a new slot repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every durable slot stored for a visitor.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn load_all(&self, visitor: VisitorId) -> Result<Vec<SlotRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, SlotRow>(
            r"
            SELECT slot_key, value, updated_at
            FROM storefront.visitor_slot
            WHERE visitor_id = $1
            ORDER BY slot_key
            ",
        )
        .bind(visitor.as_uuid())
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Write several slots for a visitor in one transaction.
    ///
    /// Existing rows for the same key are replaced.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any write fails; no slot is
    /// changed in that case.
    pub async fn upsert_many(
        &self,
        visitor: VisitorId,
        slots: &[(&str, &str)],
    ) -> Result<(), RepositoryError> {
        if slots.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for (key, value) in slots {
            sqlx::query(
                r"
                INSERT INTO storefront.visitor_slot (visitor_id, slot_key, value)
                VALUES ($1, $2, $3)
                ON CONFLICT (visitor_id, slot_key)
                DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
                ",
            )
            .bind(visitor.as_uuid())
            .bind(*key)
            .bind(*value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    /// Delete every slot stored for a visitor. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, visitor: VisitorId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.visitor_slot WHERE visitor_id = $1")
            .bind(visitor.as_uuid())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
