//! Repository for the `validation_issues` table.

use sqlx::PgPool;
use sportsfest_core::reconcile::{IssueStatus, IssueUpdate, NewIssue};
use sportsfest_core::types::{DbId, Timestamp};

use crate::models::validation_issue::ValidationIssue;

/// Column list for validation_issues queries.
const COLUMNS: &str = "id, participant_id, church_id, issue_type, description, rule_code, \
    rule_level, severity, sport_type, sport_format, status, resolved_at, created_at, updated_at";

/// Provides CRUD operations for validation issues.
pub struct ValidationIssueRepo;

impl ValidationIssueRepo {
    /// Insert a new open issue, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewIssue) -> Result<ValidationIssue, sqlx::Error> {
        let query = format!(
            "INSERT INTO validation_issues
                (participant_id, church_id, issue_type, description, rule_code, rule_level,
                 severity, sport_type, sport_format, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ValidationIssue>(&query)
            .bind(input.participant_id)
            .bind(input.church_id)
            .bind(input.issue_type.as_str())
            .bind(&input.description)
            .bind(&input.rule_code)
            .bind(input.rule_level)
            .bind(input.severity.as_str())
            .bind(&input.sport_type)
            .bind(&input.sport_format)
            .bind(IssueStatus::Open.as_str())
            .fetch_one(pool)
            .await
    }

    /// All issues for a participant, oldest first.
    pub async fn list_for_participant(
        pool: &PgPool,
        participant_id: DbId,
    ) -> Result<Vec<ValidationIssue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM validation_issues
             WHERE participant_id = $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, ValidationIssue>(&query)
            .bind(participant_id)
            .fetch_all(pool)
            .await
    }

    /// Open issues for a church, oldest first.
    pub async fn list_open_for_church(
        pool: &PgPool,
        church_id: DbId,
    ) -> Result<Vec<ValidationIssue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM validation_issues
             WHERE church_id = $1 AND status = 'open'
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, ValidationIssue>(&query)
            .bind(church_id)
            .fetch_all(pool)
            .await
    }

    /// Rewrite content and status, clearing `resolved_at`. Returns `true`
    /// if a row was updated.
    pub async fn update_content(
        pool: &PgPool,
        id: DbId,
        update: &IssueUpdate,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE validation_issues SET
                description = $2,
                severity = $3,
                status = $4,
                resolved_at = NULL,
                updated_at = $5
             WHERE id = $1",
        )
        .bind(id)
        .bind(&update.description)
        .bind(update.severity.as_str())
        .bind(update.status.as_str())
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark an issue resolved at `now`. Returns `true` if a row was updated.
    pub async fn resolve(pool: &PgPool, id: DbId, now: Timestamp) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE validation_issues SET status = 'resolved', resolved_at = $2, updated_at = $2
             WHERE id = $1",
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
