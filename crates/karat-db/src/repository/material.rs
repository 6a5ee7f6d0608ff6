//! # Material Repository
//!
//! Material types and their published per-gram price. The pricing engine
//! reads the price; an unknown material has no price and prices at zero.

use chrono::Utc;
use karat_core::{Material, Money};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Repository for material rates.
#[derive(Debug, Clone)]
pub struct MaterialRepository {
    pool: SqlitePool,
}

impl MaterialRepository {
    /// Creates a new MaterialRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MaterialRepository { pool }
    }

    /// Inserts a material with its current rate.
    pub async fn insert(&self, name: &str, price_per_gram: Money) -> DbResult<Material> {
        let material = Material {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            price_per_gram_cents: price_per_gram.cents(),
            updated_at: Utc::now(),
        };

        debug!(id = %material.id, name = %material.name, "Inserting material");

        sqlx::query(
            r#"
            INSERT INTO materials (id, name, price_per_gram_cents, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&material.id)
        .bind(&material.name)
        .bind(material.price_per_gram_cents)
        .bind(material.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(material)
    }

    /// Gets a material by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Material>> {
        let material = sqlx::query_as::<_, Material>(
            r#"
            SELECT id, name, price_per_gram_cents, updated_at
            FROM materials
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(material)
    }

    /// Publishes a new per-gram rate.
    pub async fn set_price(&self, id: &str, price_per_gram: Money) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE materials
            SET price_per_gram_cents = ?1, updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(price_per_gram.cents())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Material", id));
        }

        info!(id = %id, rate = %price_per_gram, "Material rate updated");
        Ok(())
    }

    /// Published rate for a material, `None` when the material is unknown.
    pub async fn price_per_gram(&self, id: &str) -> DbResult<Option<Money>> {
        let mut conn = self.pool.acquire().await?;
        price_per_gram(&mut conn, Some(id)).await
    }
}

pub(crate) async fn price_per_gram(
    conn: &mut SqliteConnection,
    id: Option<&str>,
) -> DbResult<Option<Money>> {
    let Some(id) = id else {
        return Ok(None);
    };
    let cents: Option<i64> =
        sqlx::query_scalar("SELECT price_per_gram_cents FROM materials WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(cents.map(Money::from_cents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;

    #[tokio::test]
    async fn test_rate_lookup_and_update() {
        let db = test_support::db().await;
        let gold = db
            .materials()
            .insert("Gold 22K", Money::from_cents(625_000))
            .await
            .unwrap();

        assert_eq!(
            db.materials().price_per_gram(&gold.id).await.unwrap(),
            Some(Money::from_cents(625_000))
        );

        db.materials()
            .set_price(&gold.id, Money::from_cents(640_000))
            .await
            .unwrap();
        let reloaded = db.materials().get_by_id(&gold.id).await.unwrap().unwrap();
        assert_eq!(reloaded.price_per_gram().cents(), 640_000);
    }

    #[tokio::test]
    async fn test_unknown_material_has_no_rate() {
        let db = test_support::db().await;
        assert_eq!(db.materials().price_per_gram("nope").await.unwrap(), None);
        assert!(matches!(
            db.materials().set_price("nope", Money::zero()).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
