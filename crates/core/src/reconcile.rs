//! Issue reconciliation: diff a fresh validation pass against persisted
//! issues for one participant.
//!
//! Issues are keyed by `(issue_type, rule_code)`. Fresh issues with no
//! persisted counterpart are created; open persisted ones are rewritten only
//! when the participant changed after the issue was last written AND the
//! content differs; resolved ones that reappear are always reopened; open
//! issues absent from the fresh pass are resolved.
//!
//! [`plan_reconciliation`] is pure; [`IssueReconciler`] applies a plan
//! through an [`IssueStore`]. One participant must not be reconciled by two
//! callers at once.

use std::collections::{HashMap, HashSet};
use std::future::Future;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};
use crate::validation::issues::{Issue, IssueType};
use crate::validation::rules::Severity;

/// Every issue produced by the validator is scoped to one participant.
pub const RULE_LEVEL_INDIVIDUAL: &str = "INDIVIDUAL";

// ---------------------------------------------------------------------------
// Freshness stamp
// ---------------------------------------------------------------------------

/// Last-modified time of a participant in the source system, normalized to
/// UTC at second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SyncTimestamp(DateTime<Utc>);

impl SyncTimestamp {
    /// Wire format, e.g. `2025-05-01 14:30:00`.
    pub const FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";

    /// Parse `YYYY-MM-DD HH:MM:SS` (taken as UTC) or an RFC 3339 timestamp
    /// with an offset (converted to UTC).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self::from_datetime(dt.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(raw, Self::FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
            .ok()
            .map(|naive| Self::from_datetime(naive.and_utc()))
    }

    pub fn from_datetime(ts: Timestamp) -> Self {
        // Persisted timestamps carry sub-second precision; the source system does not.
        let secs = ts.timestamp();
        Self(DateTime::from_timestamp(secs, 0).unwrap_or(ts))
    }

    pub fn as_datetime(&self) -> Timestamp {
        self.0
    }

    pub fn is_newer_than(&self, ts: Timestamp) -> bool {
        *self > Self::from_datetime(ts)
    }
}

impl std::fmt::Display for SyncTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

// ---------------------------------------------------------------------------
// Persisted shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    Resolved,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Resolved => "resolved",
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            "open" => Ok(Self::Open),
            "resolved" => Ok(Self::Resolved),
            other => Err(format!("Unknown issue status: {other}")),
        }
    }
}

/// An issue as read back from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedIssue {
    pub issue_id: DbId,
    pub participant_id: DbId,
    pub church_id: DbId,
    /// Kept as text so rows written by other tools still reconcile.
    pub issue_type: String,
    pub rule_code: Option<String>,
    pub description: String,
    pub severity: Severity,
    pub status: IssueStatus,
    pub updated_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
}

impl PersistedIssue {
    pub fn key(&self) -> IssueKey {
        IssueKey::new(&self.issue_type, self.rule_code.as_deref())
    }
}

/// Insert payload for a newly observed issue. Always created open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub participant_id: DbId,
    pub church_id: DbId,
    pub issue_type: IssueType,
    pub description: String,
    pub rule_code: Option<String>,
    pub rule_level: &'static str,
    pub severity: Severity,
    pub sport_type: Option<String>,
    pub sport_format: Option<String>,
}

impl NewIssue {
    pub fn from_issue(participant_id: DbId, church_id: DbId, issue: &Issue) -> Self {
        Self {
            participant_id,
            church_id,
            issue_type: issue.issue_type,
            description: issue.description.clone(),
            rule_code: issue.rule_code.clone(),
            rule_level: RULE_LEVEL_INDIVIDUAL,
            severity: issue.severity,
            sport_type: issue.sport.clone(),
            sport_format: issue.sport_format.clone(),
        }
    }
}

/// Content rewrite for an existing issue; also reopens it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueUpdate {
    pub description: String,
    pub severity: Severity,
    pub status: IssueStatus,
}

/// Reconciliation key: issue type plus rule code (empty when absent).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueKey {
    pub issue_type: String,
    pub rule_code: String,
}

impl IssueKey {
    pub fn new(issue_type: &str, rule_code: Option<&str>) -> Self {
        Self {
            issue_type: issue_type.to_string(),
            rule_code: rule_code.unwrap_or_default().to_string(),
        }
    }

    pub fn of(issue: &Issue) -> Self {
        Self::new(issue.issue_type.as_str(), issue.rule_code.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueAction {
    Create(NewIssue),
    Update { issue_id: DbId, update: IssueUpdate },
    /// Participant changed but the issue content did not.
    Unchanged { issue_id: DbId },
    /// Persisted record is at least as recent as the participant.
    Skipped { issue_id: DbId },
    Resolve { issue_id: DbId },
}

/// Compute the writes that bring `persisted` in line with `fresh`.
///
/// Actions for fresh issues come first, in input order; resolutions follow
/// in persisted order. When `fresh` repeats a key only its first occurrence
/// counts. When `persisted` holds several rows for one key, an open row is
/// preferred over a resolved one.
pub fn plan_reconciliation(
    participant_id: DbId,
    church_id: DbId,
    fresh: &[Issue],
    persisted: &[PersistedIssue],
    participant_updated: &SyncTimestamp,
) -> Vec<IssueAction> {
    let mut existing: HashMap<IssueKey, &PersistedIssue> = HashMap::new();
    for issue in persisted {
        existing
            .entry(issue.key())
            .and_modify(|current| {
                if current.status != IssueStatus::Open && issue.status == IssueStatus::Open {
                    *current = issue;
                }
            })
            .or_insert(issue);
    }

    let mut actions = Vec::new();
    let mut seen: HashSet<IssueKey> = HashSet::new();

    for issue in fresh {
        let key = IssueKey::of(issue);
        if !seen.insert(key.clone()) {
            continue;
        }

        let Some(current) = existing.get(&key) else {
            actions.push(IssueAction::Create(NewIssue::from_issue(
                participant_id,
                church_id,
                issue,
            )));
            continue;
        };

        // A resolved row's stamp is the resolution time, not a content write.
        let reopen = current.status != IssueStatus::Open;
        if !reopen && !participant_updated.is_newer_than(current.updated_at) {
            actions.push(IssueAction::Skipped {
                issue_id: current.issue_id,
            });
            continue;
        }

        let differs =
            reopen || current.description != issue.description || current.severity != issue.severity;
        if differs {
            actions.push(IssueAction::Update {
                issue_id: current.issue_id,
                update: IssueUpdate {
                    description: issue.description.clone(),
                    severity: issue.severity,
                    status: IssueStatus::Open,
                },
            });
        } else {
            actions.push(IssueAction::Unchanged {
                issue_id: current.issue_id,
            });
        }
    }

    for issue in persisted {
        if issue.status == IssueStatus::Open && !seen.contains(&issue.key()) {
            actions.push(IssueAction::Resolve {
                issue_id: issue.issue_id,
            });
        }
    }

    actions
}

// ---------------------------------------------------------------------------
// Store seam
// ---------------------------------------------------------------------------

/// Persistence operations needed by [`IssueReconciler`].
pub trait IssueStore: Send + Sync {
    type Error: std::fmt::Display + Send;

    /// All issues recorded for a participant, open and resolved.
    fn participant_issues(
        &self,
        participant_id: DbId,
    ) -> impl Future<Output = Result<Vec<PersistedIssue>, Self::Error>> + Send;

    fn create_issue(
        &self,
        issue: &NewIssue,
    ) -> impl Future<Output = Result<DbId, Self::Error>> + Send;

    /// Rewrite content, set `updated_at = now` and clear `resolved_at`.
    fn update_issue(
        &self,
        issue_id: DbId,
        update: &IssueUpdate,
        now: Timestamp,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Mark resolved with `resolved_at = updated_at = now`.
    fn resolve_issue(
        &self,
        issue_id: DbId,
        now: Timestamp,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Per-participant (and, summed, per-run) reconciliation counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    pub created: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub skipped: u32,
    pub resolved: u32,
    pub errors: u32,
}

impl std::ops::AddAssign for ReconcileStats {
    fn add_assign(&mut self, other: Self) {
        self.created += other.created;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.skipped += other.skipped;
        self.resolved += other.resolved;
        self.errors += other.errors;
    }
}

/// Applies reconciliation plans through an [`IssueStore`].
pub struct IssueReconciler<S> {
    store: S,
}

impl<S: IssueStore> IssueReconciler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reconcile one participant's fresh issues.
    ///
    /// Failing to read existing issues aborts with the store error. Failed
    /// individual writes are logged and counted in `errors`.
    pub async fn reconcile(
        &self,
        participant_id: DbId,
        church_id: DbId,
        fresh: &[Issue],
        participant_updated: &SyncTimestamp,
        now: Timestamp,
    ) -> Result<ReconcileStats, S::Error> {
        let persisted = self.store.participant_issues(participant_id).await?;
        let actions = plan_reconciliation(
            participant_id,
            church_id,
            fresh,
            &persisted,
            participant_updated,
        );

        let mut stats = ReconcileStats::default();
        for action in actions {
            match action {
                IssueAction::Create(new_issue) => {
                    match self.store.create_issue(&new_issue).await {
                        Ok(issue_id) => {
                            tracing::debug!(
                                participant_id,
                                issue_id,
                                issue_type = %new_issue.issue_type,
                                "Created validation issue"
                            );
                            stats.created += 1;
                        }
                        Err(e) => {
                            tracing::error!(
                                participant_id,
                                issue_type = %new_issue.issue_type,
                                error = %e,
                                "Failed to create validation issue"
                            );
                            stats.errors += 1;
                        }
                    }
                }
                IssueAction::Update { issue_id, update } => {
                    match self.store.update_issue(issue_id, &update, now).await {
                        Ok(()) => stats.updated += 1,
                        Err(e) => {
                            tracing::error!(participant_id, issue_id, error = %e, "Failed to update validation issue");
                            stats.errors += 1;
                        }
                    }
                }
                IssueAction::Unchanged { .. } => stats.unchanged += 1,
                IssueAction::Skipped { .. } => stats.skipped += 1,
                IssueAction::Resolve { issue_id } => {
                    match self.store.resolve_issue(issue_id, now).await {
                        Ok(()) => {
                            tracing::debug!(participant_id, issue_id, "Resolved validation issue");
                            stats.resolved += 1;
                        }
                        Err(e) => {
                            tracing::error!(participant_id, issue_id, error = %e, "Failed to resolve validation issue");
                            stats.errors += 1;
                        }
                    }
                }
            }
        }

        tracing::info!(
            participant_id,
            created = stats.created,
            updated = stats.updated,
            resolved = stats.resolved,
            errors = stats.errors,
            "Reconciled validation issues"
        );
        Ok(stats)
    }
}
