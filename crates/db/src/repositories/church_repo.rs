//! Repository for the `churches` table.

use sqlx::PgPool;

use crate::models::church::{Church, CreateChurch};

/// Column list for churches queries.
const COLUMNS: &str = "id, church_code, name, pastor_name, pastor_email, created_at, updated_at";

/// Provides CRUD operations for churches.
pub struct ChurchRepo;

impl ChurchRepo {
    /// Insert a church, or refresh its name and pastor if the code exists.
    /// Absent pastor fields keep their stored values.
    pub async fn upsert(pool: &PgPool, input: &CreateChurch) -> Result<Church, sqlx::Error> {
        let query = format!(
            "INSERT INTO churches (church_code, name, pastor_name, pastor_email)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (church_code) DO UPDATE SET
                name = EXCLUDED.name,
                pastor_name = COALESCE(EXCLUDED.pastor_name, churches.pastor_name),
                pastor_email = COALESCE(EXCLUDED.pastor_email, churches.pastor_email),
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Church>(&query)
            .bind(input.church_code.trim().to_uppercase())
            .bind(&input.name)
            .bind(&input.pastor_name)
            .bind(&input.pastor_email)
            .fetch_one(pool)
            .await
    }

    /// List all churches ordered by code.
    pub async fn list(pool: &PgPool) -> Result<Vec<Church>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM churches ORDER BY church_code ASC");
        sqlx::query_as::<_, Church>(&query).fetch_all(pool).await
    }
}
