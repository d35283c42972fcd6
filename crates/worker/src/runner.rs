//! One sync pass over a batch of normalized participant records.
//!
//! Churches named by the records are upserted first. Then, per record:
//! resolve the church, skip pastor-decided participants,
//! validate, derive the approval status, upsert the participant and
//! reconcile its validation issues. Validation runs concurrently across the
//! batch; every database write happens sequentially in input order so no
//! two reconciliations for one participant overlap.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::{Map, Value};
use sportsfest_core::approval::{derive_status, ApprovalStatus};
use sportsfest_core::reconcile::{IssueReconciler, ReconcileStats, SyncTimestamp};
use sportsfest_core::types::DbId;
use sportsfest_core::validation::age::parse_birthdate;
use sportsfest_core::validation::{EligibilityValidator, PhotoProbe, ValidationOutcome};
use sportsfest_db::models::church::CreateChurch;
use sportsfest_db::models::participant::{ParticipantRow, UpsertParticipant};
use sportsfest_db::repositories::{ChurchRepo, ParticipantRepo};
use sportsfest_db::{DbPool, PgIssueStore};

/// Church upsert counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChurchStats {
    pub created: u32,
    pub updated: u32,
    pub errors: u32,
}

impl std::ops::AddAssign for ChurchStats {
    fn add_assign(&mut self, other: Self) {
        self.created += other.created;
        self.updated += other.updated;
        self.errors += other.errors;
    }
}

/// Participant write counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParticipantStats {
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,
    pub errors: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub churches: ChurchStats,
    pub participants: ParticipantStats,
    pub validation_issues: ReconcileStats,
}

/// A record that passed the pre-validation lookups.
struct Prepared {
    record: Map<String, Value>,
    chmeetings_id: String,
    church_id: DbId,
    existing: Option<ParticipantRow>,
}

pub struct SyncRunner<P> {
    pool: DbPool,
    validator: EligibilityValidator,
    probe: Option<P>,
    concurrency: usize,
    reconciler: IssueReconciler<PgIssueStore>,
}

impl<P: PhotoProbe> SyncRunner<P> {
    /// With `probe = Some(..)` photo URLs are checked over the network.
    pub fn new(pool: DbPool, validator: EligibilityValidator, probe: Option<P>) -> Self {
        let reconciler = IssueReconciler::new(PgIssueStore::new(pool.clone()));
        Self {
            pool,
            validator,
            probe,
            concurrency: 1,
            reconciler,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Sync a batch of records in input order.
    pub async fn run(&self, records: Vec<Map<String, Value>>) -> SyncStats {
        let mut stats = SyncStats::default();
        tracing::info!(records = records.len(), "Starting participant sync");

        stats.churches = self.sync_churches(&churches_from_records(&records)).await;
        let prepared = self.prepare(records, &mut stats).await;

        let validated: Vec<(Prepared, ValidationOutcome)> = stream::iter(prepared)
            .map(|item| async move {
                let outcome = self.validate(&item.record).await;
                (item, outcome)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        for (item, outcome) in validated {
            self.persist(item, outcome, &mut stats).await;
        }

        tracing::info!(
            churches_created = stats.churches.created,
            created = stats.participants.created,
            updated = stats.participants.updated,
            skipped = stats.participants.skipped,
            errors = stats.participants.errors,
            issues_created = stats.validation_issues.created,
            issues_resolved = stats.validation_issues.resolved,
            "Participant sync complete"
        );
        stats
    }

    async fn validate(&self, record: &Map<String, Value>) -> ValidationOutcome {
        match &self.probe {
            Some(probe) => self.validator.validate_live(record, probe).await,
            None => self.validator.validate(record),
        }
    }

    // -----------------------------------------------------------------------
    // Churches
    // -----------------------------------------------------------------------

    /// Upsert churches by code, counting which codes were new.
    pub async fn sync_churches(&self, churches: &[CreateChurch]) -> ChurchStats {
        let mut stats = ChurchStats::default();
        if churches.is_empty() {
            return stats;
        }

        let mut known: HashSet<String> = match ChurchRepo::list(&self.pool).await {
            Ok(rows) => rows.into_iter().map(|c| c.church_code).collect(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to list churches");
                stats.errors += churches.len() as u32;
                return stats;
            }
        };

        for church in churches {
            if church.church_code.trim().is_empty() || church.name.trim().is_empty() {
                tracing::warn!(church_code = %church.church_code, "Skipping church without code or name");
                stats.errors += 1;
                continue;
            }
            match ChurchRepo::upsert(&self.pool, church).await {
                Ok(row) => {
                    if known.insert(row.church_code.clone()) {
                        tracing::info!(church_code = %row.church_code, church_id = row.id, "Created church");
                        stats.created += 1;
                    } else {
                        tracing::debug!(church_code = %row.church_code, church_id = row.id, "Updated church");
                        stats.updated += 1;
                    }
                }
                Err(e) => {
                    tracing::error!(church_code = %church.church_code, error = %e, "Failed to upsert church");
                    stats.errors += 1;
                }
            }
        }
        stats
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    async fn prepare(&self, records: Vec<Map<String, Value>>, stats: &mut SyncStats) -> Vec<Prepared> {
        let churches: HashMap<String, DbId> = match ChurchRepo::list(&self.pool).await {
            Ok(rows) => rows.into_iter().map(|c| (c.church_code, c.id)).collect(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load churches");
                stats.participants.errors += records.len() as u32;
                return Vec::new();
            }
        };
        let mut prepared = Vec::with_capacity(records.len());

        for record in records {
            let Some(chmeetings_id) = text_field(&record, "chmeetings_id") else {
                tracing::warn!("Skipping record without chmeetings_id");
                stats.participants.errors += 1;
                continue;
            };

            let Some(code) = text_field(&record, "church_code") else {
                tracing::warn!(chmeetings_id = %chmeetings_id, "Skipping participant without church_code");
                stats.participants.errors += 1;
                continue;
            };

            let Some(&church_id) = churches.get(&code.to_uppercase()) else {
                tracing::warn!(chmeetings_id = %chmeetings_id, church_code = %code, "Unknown church code");
                stats.participants.errors += 1;
                continue;
            };

            let existing = match ParticipantRepo::find_by_chmeetings_id(&self.pool, &chmeetings_id).await {
                Ok(row) => row,
                Err(e) => {
                    tracing::error!(chmeetings_id = %chmeetings_id, error = %e, "Participant lookup failed");
                    stats.participants.errors += 1;
                    continue;
                }
            };

            if let Some(row) = &existing {
                let status = row.status();
                if status.is_final() {
                    tracing::debug!(chmeetings_id = %chmeetings_id, %status, "Skipping participant with final approval status");
                    stats.participants.skipped += 1;
                    continue;
                }
            }

            prepared.push(Prepared {
                record,
                chmeetings_id,
                church_id,
                existing,
            });
        }
        prepared
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    async fn persist(&self, item: Prepared, outcome: ValidationOutcome, stats: &mut SyncStats) {
        let now = Utc::now();
        let stamp = text_field(&item.record, "updated_at")
            .and_then(|raw| SyncTimestamp::parse(&raw))
            .unwrap_or_else(|| SyncTimestamp::from_datetime(now));

        let checklist = checklist_field(&item.record);
        let status = derive_status(outcome.is_valid, &checklist);
        let input = upsert_input(&item, &outcome, status, stamp);

        let written = match &item.existing {
            Some(row) => ParticipantRepo::update(&self.pool, row.id, &input).await,
            None => ParticipantRepo::create(&self.pool, &input).await.map(Some),
        };
        let row = match written {
            Ok(Some(row)) => row,
            Ok(None) => {
                tracing::error!(chmeetings_id = %item.chmeetings_id, "Participant disappeared during sync");
                stats.participants.errors += 1;
                return;
            }
            Err(e) => {
                tracing::error!(chmeetings_id = %item.chmeetings_id, error = %e, "Failed to write participant");
                stats.participants.errors += 1;
                return;
            }
        };
        if item.existing.is_some() {
            stats.participants.updated += 1;
        } else {
            stats.participants.created += 1;
        }

        tracing::debug!(
            participant_id = row.id,
            is_valid = outcome.is_valid,
            issues = outcome.issues.len(),
            %status,
            "Validated participant"
        );

        match self
            .reconciler
            .reconcile(row.id, item.church_id, &outcome.issues, &stamp, now)
            .await
        {
            Ok(issue_stats) => stats.validation_issues += issue_stats,
            Err(e) => {
                tracing::error!(participant_id = row.id, error = %e, "Failed to read validation issues");
                stats.validation_issues.errors += 1;
            }
        }
    }
}

/// Churches carried on the records, first occurrence per code.
fn churches_from_records(records: &[Map<String, Value>]) -> Vec<CreateChurch> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|record| {
            let church_code = text_field(record, "church_code")?.to_uppercase();
            let name = text_field(record, "church_name")?;
            seen.insert(church_code.clone()).then(|| CreateChurch {
                church_code,
                name,
                pastor_name: text_field(record, "pastor_name"),
                pastor_email: text_field(record, "pastor_email"),
            })
        })
        .collect()
}

fn upsert_input(
    item: &Prepared,
    outcome: &ValidationOutcome,
    status: ApprovalStatus,
    stamp: SyncTimestamp,
) -> UpsertParticipant {
    let record = &item.record;
    UpsertParticipant {
        chmeetings_id: item.chmeetings_id.clone(),
        church_id: item.church_id,
        first_name: text_field(record, "first_name").unwrap_or_default(),
        last_name: text_field(record, "last_name").unwrap_or_default(),
        gender: text_field(record, "gender"),
        birthdate: text_field(record, "birthdate").and_then(|raw| parse_birthdate(&raw)),
        primary_sport: text_field(record, "primary_sport"),
        secondary_sport: text_field(record, "secondary_sport"),
        other_events: match record.get("other_events") {
            Some(Value::Array(items)) => {
                let joined = items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(joined).filter(|s| !s.is_empty())
            }
            _ => text_field(record, "other_events"),
        },
        photo_url: text_field(record, "photo_url"),
        consent_status: record.get("consent_status").and_then(Value::as_bool),
        is_valid: outcome.is_valid,
        approval_status: status,
        source_updated_at: Some(stamp.as_datetime()),
    }
}

/// Non-blank string (or number, rendered) value of `key`.
fn text_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Checklist items arrive as a list, or as one string with one item per line.
fn checklist_field(record: &Map<String, Value>) -> Vec<String> {
    match record.get("completion_checklist") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(text)) => text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sportsfest_core::approval::REQUIRED_CHECKLIST;

    use super::*;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn text_field_trims_and_renders_numbers() {
        let r = record(json!({"a": "  x ", "b": "   ", "c": 42, "d": true}));
        assert_eq!(text_field(&r, "a").as_deref(), Some("x"));
        assert_eq!(text_field(&r, "b"), None);
        assert_eq!(text_field(&r, "c").as_deref(), Some("42"));
        assert_eq!(text_field(&r, "d"), None);
        assert_eq!(text_field(&r, "missing"), None);
    }

    #[test]
    fn churches_come_from_named_records_once_per_code() {
        let records = [
            record(json!({"church_code": "rpc", "church_name": "Redeemer", "pastor_email": "kim@rpc.org"})),
            record(json!({"church_code": "RPC", "church_name": "Redeemer Presbyterian"})),
            record(json!({"church_code": "gfc"})),
            record(json!({"church_name": "No Code"})),
        ];
        let churches = churches_from_records(&records);
        assert_eq!(churches.len(), 1);
        assert_eq!(churches[0].church_code, "RPC");
        assert_eq!(churches[0].name, "Redeemer");
        assert_eq!(churches[0].pastor_email.as_deref(), Some("kim@rpc.org"));
        assert_eq!(churches[0].pastor_name, None);
    }

    #[test]
    fn checklist_accepts_list_or_lines() {
        let list = record(json!({"completion_checklist": REQUIRED_CHECKLIST}));
        assert_eq!(checklist_field(&list).len(), 4);

        let lines = record(json!({"completion_checklist": REQUIRED_CHECKLIST.join("\n")}));
        assert_eq!(checklist_field(&lines), checklist_field(&list));

        assert!(checklist_field(&record(json!({}))).is_empty());
    }
}
