//! Church models.

use serde::{Deserialize, Serialize};
use sportsfest_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `churches` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Church {
    pub id: DbId,
    pub church_code: String,
    pub name: String,
    pub pastor_name: Option<String>,
    pub pastor_email: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a church.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChurch {
    pub church_code: String,
    pub name: String,
    pub pastor_name: Option<String>,
    pub pastor_email: Option<String>,
}
