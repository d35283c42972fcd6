//! Validation issue models.

use serde::Serialize;
use sportsfest_core::reconcile::{IssueStatus, PersistedIssue};
use sportsfest_core::types::{DbId, Timestamp};
use sportsfest_core::validation::Severity;
use sqlx::FromRow;

/// A row from the `validation_issues` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ValidationIssue {
    pub id: DbId,
    pub participant_id: DbId,
    pub church_id: DbId,
    pub issue_type: String,
    pub description: String,
    pub rule_code: Option<String>,
    pub rule_level: String,
    pub severity: String,
    pub sport_type: Option<String>,
    pub sport_format: Option<String>,
    pub status: String,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<ValidationIssue> for PersistedIssue {
    type Error = String;

    fn try_from(row: ValidationIssue) -> Result<Self, Self::Error> {
        Ok(Self {
            issue_id: row.id,
            participant_id: row.participant_id,
            church_id: row.church_id,
            issue_type: row.issue_type,
            rule_code: row.rule_code,
            description: row.description,
            severity: Severity::from_str_value(&row.severity)?,
            status: IssueStatus::from_str_value(&row.status)?,
            updated_at: row.updated_at,
            resolved_at: row.resolved_at,
        })
    }
}
