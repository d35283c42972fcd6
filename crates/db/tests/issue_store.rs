use chrono::{TimeZone, Utc};
use sportsfest_core::approval::ApprovalStatus;
use sportsfest_core::reconcile::{IssueReconciler, IssueStatus, SyncTimestamp};
use sportsfest_core::validation::{Issue, IssueType, Severity};
use sportsfest_db::models::church::CreateChurch;
use sportsfest_db::models::participant::UpsertParticipant;
use sportsfest_db::repositories::{ChurchRepo, ParticipantRepo, ValidationIssueRepo};
use sportsfest_db::PgIssueStore;
use sqlx::PgPool;

async fn seed(pool: &PgPool) -> (i64, i64) {
    let church = ChurchRepo::upsert(
        pool,
        &CreateChurch {
            church_code: "rpc".into(),
            name: "Redeemer Presbyterian".into(),
            pastor_name: Some("Pastor Kim".into()),
            pastor_email: None,
        },
    )
    .await
    .unwrap();

    let participant = ParticipantRepo::create(
        pool,
        &UpsertParticipant {
            chmeetings_id: "3001".into(),
            church_id: church.id,
            first_name: "Lee".into(),
            last_name: "Tran".into(),
            gender: Some("Male".into()),
            birthdate: None,
            primary_sport: Some("Tennis".into()),
            secondary_sport: None,
            other_events: None,
            photo_url: None,
            consent_status: None,
            is_valid: false,
            approval_status: ApprovalStatus::Pending,
            source_updated_at: None,
        },
    )
    .await
    .unwrap();

    (church.id, participant.id)
}

fn missing_birthdate() -> Issue {
    Issue::new(
        IssueType::MissingBirthdate,
        Severity::Error,
        "Birthdate required for age validation",
    )
}

fn missing_photo() -> Issue {
    Issue::new(IssueType::MissingPhoto, Severity::Warning, "No profile photo provided")
        .with_rule_code("PHOTO_REQUIRED")
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_and_church_upsert(pool: PgPool) {
    sportsfest_db::health_check(&pool).await.unwrap();
    seed(&pool).await;

    // Re-upsert without pastor fields: code is normalized, pastor is kept.
    let again = ChurchRepo::upsert(
        &pool,
        &CreateChurch {
            church_code: " rpc ".into(),
            name: "Redeemer Presbyterian Church".into(),
            pastor_name: None,
            pastor_email: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(again.church_code, "RPC");
    assert_eq!(again.pastor_name.as_deref(), Some("Pastor Kim"));

    let churches = ChurchRepo::list(&pool).await.unwrap();
    assert_eq!(churches.len(), 1);
    assert_eq!(churches[0].name, "Redeemer Presbyterian Church");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_participant_update_keeps_identity(pool: PgPool) {
    let (church_id, participant_id) = seed(&pool).await;
    let row = ParticipantRepo::find_by_chmeetings_id(&pool, "3001").await.unwrap().unwrap();
    assert_eq!(row.id, participant_id);
    assert_eq!(row.status(), ApprovalStatus::Pending);

    let updated = ParticipantRepo::update(
        &pool,
        participant_id,
        &UpsertParticipant {
            chmeetings_id: "3001".into(),
            church_id,
            first_name: "Lee".into(),
            last_name: "Tran".into(),
            gender: Some("Male".into()),
            birthdate: chrono::NaiveDate::from_ymd_opt(2001, 4, 2),
            primary_sport: Some("Tennis".into()),
            secondary_sport: None,
            other_events: Some("Tug-of-war".into()),
            photo_url: None,
            consent_status: Some(true),
            is_valid: true,
            approval_status: ApprovalStatus::Validated,
            source_updated_at: None,
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.status(), ApprovalStatus::Validated);
    assert!(updated.is_valid);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reconcile_round_trip_through_postgres(pool: PgPool) {
    let (church_id, participant_id) = seed(&pool).await;
    let reconciler = IssueReconciler::new(PgIssueStore::new(pool.clone()));
    let first_stamp = SyncTimestamp::parse("2025-05-01 09:00:00").unwrap();

    let stats = reconciler
        .reconcile(
            participant_id,
            church_id,
            &[missing_birthdate(), missing_photo()],
            &first_stamp,
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(stats.created, 2);

    // Rows were written after the participant's stamp: a rerun writes nothing.
    let again = reconciler
        .reconcile(
            participant_id,
            church_id,
            &[missing_birthdate(), missing_photo()],
            &first_stamp,
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(again.created + again.updated + again.resolved, 0);

    let resolved_at = Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap();
    let later = SyncTimestamp::parse("2099-01-01 00:00:00").unwrap();
    let cleared = reconciler
        .reconcile(participant_id, church_id, &[missing_photo()], &later, resolved_at)
        .await
        .unwrap();
    assert_eq!(cleared.resolved, 1);

    let rows = ValidationIssueRepo::list_for_participant(&pool, participant_id)
        .await
        .unwrap();
    let birthdate = rows.iter().find(|r| r.issue_type == "missing_birthdate").unwrap();
    assert_eq!(birthdate.status, IssueStatus::Resolved.as_str());
    assert_eq!(birthdate.resolved_at, Some(resolved_at));
    assert_eq!(birthdate.rule_level, "INDIVIDUAL");

    let open = ValidationIssueRepo::list_open_for_church(&pool, church_id).await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].rule_code.as_deref(), Some("PHOTO_REQUIRED"));
}
