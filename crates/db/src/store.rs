//! PostgreSQL-backed [`IssueStore`].

use sqlx::PgPool;
use sportsfest_core::reconcile::{IssueStore, IssueUpdate, NewIssue, PersistedIssue};
use sportsfest_core::types::{DbId, Timestamp};

use crate::repositories::ValidationIssueRepo;

/// Adapts [`ValidationIssueRepo`] to the reconciler's store seam.
#[derive(Debug, Clone)]
pub struct PgIssueStore {
    pool: PgPool,
}

impl PgIssueStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl IssueStore for PgIssueStore {
    type Error = sqlx::Error;

    async fn participant_issues(&self, participant_id: DbId) -> Result<Vec<PersistedIssue>, sqlx::Error> {
        ValidationIssueRepo::list_for_participant(&self.pool, participant_id)
            .await?
            .into_iter()
            .map(|row| PersistedIssue::try_from(row).map_err(|e| sqlx::Error::Decode(e.into())))
            .collect()
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<DbId, sqlx::Error> {
        Ok(ValidationIssueRepo::create(&self.pool, issue).await?.id)
    }

    async fn update_issue(&self, issue_id: DbId, update: &IssueUpdate, now: Timestamp) -> Result<(), sqlx::Error> {
        if ValidationIssueRepo::update_content(&self.pool, issue_id, update, now).await? {
            Ok(())
        } else {
            Err(sqlx::Error::RowNotFound)
        }
    }

    async fn resolve_issue(&self, issue_id: DbId, now: Timestamp) -> Result<(), sqlx::Error> {
        if ValidationIssueRepo::resolve(&self.pool, issue_id, now).await? {
            Ok(())
        } else {
            Err(sqlx::Error::RowNotFound)
        }
    }
}
