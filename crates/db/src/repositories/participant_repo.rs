//! Repository for the `participants` table.

use sqlx::PgPool;
use sportsfest_core::types::DbId;

use crate::models::participant::{ParticipantRow, UpsertParticipant};

/// Column list for participants queries.
const COLUMNS: &str = "id, chmeetings_id, church_id, first_name, last_name, gender, birthdate, \
    primary_sport, secondary_sport, other_events, photo_url, consent_status, is_valid, \
    approval_status, source_updated_at, created_at, updated_at";

/// Provides CRUD operations for participants.
pub struct ParticipantRepo;

impl ParticipantRepo {
    pub async fn find_by_chmeetings_id(
        pool: &PgPool,
        chmeetings_id: &str,
    ) -> Result<Option<ParticipantRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM participants WHERE chmeetings_id = $1");
        sqlx::query_as::<_, ParticipantRow>(&query)
            .bind(chmeetings_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new participant.
    pub async fn create(pool: &PgPool, input: &UpsertParticipant) -> Result<ParticipantRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO participants
                (chmeetings_id, church_id, first_name, last_name, gender, birthdate,
                 primary_sport, secondary_sport, other_events, photo_url, consent_status,
                 is_valid, approval_status, source_updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParticipantRow>(&query)
            .bind(&input.chmeetings_id)
            .bind(input.church_id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.gender)
            .bind(input.birthdate)
            .bind(&input.primary_sport)
            .bind(&input.secondary_sport)
            .bind(&input.other_events)
            .bind(&input.photo_url)
            .bind(input.consent_status)
            .bind(input.is_valid)
            .bind(input.approval_status.as_str())
            .bind(input.source_updated_at)
            .fetch_one(pool)
            .await
    }

    /// Overwrite a participant's synced fields. Returns `None` if the row
    /// does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpsertParticipant,
    ) -> Result<Option<ParticipantRow>, sqlx::Error> {
        let query = format!(
            "UPDATE participants SET
                church_id = $2,
                first_name = $3,
                last_name = $4,
                gender = $5,
                birthdate = $6,
                primary_sport = $7,
                secondary_sport = $8,
                other_events = $9,
                photo_url = $10,
                consent_status = $11,
                is_valid = $12,
                approval_status = $13,
                source_updated_at = $14,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParticipantRow>(&query)
            .bind(id)
            .bind(input.church_id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.gender)
            .bind(input.birthdate)
            .bind(&input.primary_sport)
            .bind(&input.secondary_sport)
            .bind(&input.other_events)
            .bind(&input.photo_url)
            .bind(input.consent_status)
            .bind(input.is_valid)
            .bind(input.approval_status.as_str())
            .bind(input.source_updated_at)
            .fetch_optional(pool)
            .await
    }
}
