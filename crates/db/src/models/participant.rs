//! Participant models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sportsfest_core::approval::ApprovalStatus;
use sportsfest_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `participants` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ParticipantRow {
    pub id: DbId,
    pub chmeetings_id: String,
    pub church_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub primary_sport: Option<String>,
    pub secondary_sport: Option<String>,
    pub other_events: Option<String>,
    pub photo_url: Option<String>,
    pub consent_status: Option<bool>,
    pub is_valid: bool,
    pub approval_status: String,
    pub source_updated_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ParticipantRow {
    /// Parsed approval status; unknown values read as `pending`.
    pub fn status(&self) -> ApprovalStatus {
        ApprovalStatus::from_str_value(&self.approval_status).unwrap_or(ApprovalStatus::Pending)
    }
}

/// DTO written on every sync pass, keyed by `chmeetings_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertParticipant {
    pub chmeetings_id: String,
    pub church_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub primary_sport: Option<String>,
    pub secondary_sport: Option<String>,
    pub other_events: Option<String>,
    pub photo_url: Option<String>,
    pub consent_status: Option<bool>,
    pub is_valid: bool,
    pub approval_status: ApprovalStatus,
    pub source_updated_at: Option<Timestamp>,
}
