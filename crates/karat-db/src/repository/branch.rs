//! # Branch Repository
//!
//! Minimal access to the branch master: the engine only needs to create
//! branches (seed, tests) and check that a referenced branch is live.

use chrono::Utc;
use karat_core::Branch;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

/// Repository for branch lookups.
#[derive(Debug, Clone)]
pub struct BranchRepository {
    pool: SqlitePool,
}

impl BranchRepository {
    /// Creates a new BranchRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BranchRepository { pool }
    }

    /// Inserts an active branch.
    pub async fn insert(&self, code: &str, name: &str) -> DbResult<Branch> {
        let branch = Branch {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            name: name.to_string(),
            is_active: true,
            created_at: Utc::now(),
        };

        debug!(id = %branch.id, code = %branch.code, "Inserting branch");

        sqlx::query(
            r#"
            INSERT INTO branches (id, code, name, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&branch.id)
        .bind(&branch.code)
        .bind(&branch.name)
        .bind(branch.is_active)
        .bind(branch.created_at)
        .execute(&self.pool)
        .await?;

        Ok(branch)
    }

    /// Gets a branch by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Branch>> {
        let branch = sqlx::query_as::<_, Branch>(
            r#"
            SELECT id, code, name, is_active, created_at
            FROM branches
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(branch)
    }

    /// Whether the branch exists and is active.
    pub async fn exists_active(&self, id: &str) -> DbResult<bool> {
        let mut conn = self.pool.acquire().await?;
        exists_active(&mut conn, id).await
    }

    /// Number of branches, active or not.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM branches")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Marks a branch inactive. Used when a showroom closes.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        sqlx::query("UPDATE branches SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub(crate) async fn exists_active(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM branches WHERE id = ?1 AND is_active = 1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support;

    #[tokio::test]
    async fn test_insert_and_check_branch() {
        let db = test_support::db().await;
        let branch = test_support::branch(&db, "BLR").await;

        let loaded = db.branches().get_by_id(&branch.id).await.unwrap().unwrap();
        assert_eq!(loaded.code, "BLR");
        assert!(db.branches().exists_active(&branch.id).await.unwrap());
        assert!(!db.branches().exists_active("missing").await.unwrap());
        assert_eq!(db.branches().count().await.unwrap(), 1);

        db.branches().deactivate(&branch.id).await.unwrap();
        assert!(!db.branches().exists_active(&branch.id).await.unwrap());
    }
}
