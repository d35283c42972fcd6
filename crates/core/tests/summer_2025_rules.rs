use std::path::PathBuf;

use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use sportsfest_core::validation::{
    EligibilityValidator, IssueType, RuleStore, RuleType, Severity, ValidationOutcome,
};

fn rules_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../rules")
}

fn validator() -> EligibilityValidator {
    EligibilityValidator::from_collection(&RuleStore::new(rules_dir()), "SUMMER_2025")
        .expect("shipped collection loads")
}

fn participant(extra: Value) -> Map<String, Value> {
    let mut base = json!({
        "chmeetings_id": "2001",
        "first_name": "Sam",
        "last_name": "Nguyen",
        "gender": "Female",
        "birthdate": "2000-01-01",
        "primary_sport": "Tennis",
        "photo_url": "https://example.com/sam.jpg",
        "consent_status": true,
    });
    if let (Value::Object(base), Value::Object(extra)) = (&mut base, extra) {
        base.extend(extra);
    }
    match base {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn codes(outcome: &ValidationOutcome) -> Vec<&str> {
    outcome
        .issues
        .iter()
        .filter_map(|i| i.rule_code.as_deref())
        .collect()
}

#[test]
fn test_shipped_collection_covers_every_check() {
    let v = validator();
    for rule_type in [RuleType::Age, RuleType::Gender, RuleType::Photo, RuleType::Consent] {
        assert!(v.rules().by_type(rule_type).count() > 0, "no {rule_type:?} rules");
    }
    assert_eq!(v.event_date(), NaiveDate::from_ymd_opt(2025, 7, 19).unwrap());
}

#[test]
fn test_unconfigured_sport_inherits_default_band() {
    let outcome = validator().validate(&participant(json!({})));
    assert!(outcome.is_valid);
    assert!(outcome.issues.is_empty(), "{:?}", outcome.issues);

    let old = validator().validate(&participant(json!({"birthdate": "1990-07-19"})));
    assert!(!old.is_valid);
    assert_eq!(codes(&old), ["MAX_AGE_DEFAULT"]);
}

#[test]
fn test_age_35_plus_category_rejects_25_year_old() {
    let outcome = validator().validate(&participant(json!({"primary_sport": "Pickleball 35+"})));
    assert!(!outcome.is_valid);
    assert_eq!(outcome.issues.len(), 1);
    assert_eq!(outcome.issues[0].issue_type, IssueType::AgeRestriction);
    assert!(outcome.issues[0].description.contains("below minimum age 35"));
    assert_eq!(codes(&outcome), ["MIN_AGE_PICKLEBALL_35"]);
}

#[test]
fn test_sport_override_replaces_default_maximum() {
    // 40-year-old: too old for the default band, fine for Tug-of-war.
    let outcome = validator().validate(&participant(json!({
        "birthdate": "1985-01-01",
        "primary_sport": "Tug-of-war",
    })));
    assert!(outcome.is_valid, "{:?}", outcome.issues);
}

#[test]
fn test_scripture_lowers_the_minimum_age() {
    let outcome = validator().validate(&participant(json!({
        "birthdate": "2014-01-01",
        "primary_sport": "Scripture Memorization",
        "consent_status": true,
    })));
    assert!(outcome.is_valid, "{:?}", outcome.issues);
}

#[test]
fn test_women_on_men_team_is_gender_mismatch() {
    let outcome = validator().validate(&participant(json!({
        "primary_sport": "Volleyball - Men Team",
    })));
    assert!(!outcome.is_valid);
    assert_eq!(outcome.issues.len(), 1);
    let issue = &outcome.issues[0];
    assert_eq!(issue.issue_type, IssueType::GenderMismatch);
    assert_eq!(issue.sport.as_deref(), Some("Volleyball"));
    assert_eq!(issue.rule_code.as_deref(), Some("GENDER_VOLLEYBALL_MEN"));

    let womens = validator().validate(&participant(json!({
        "primary_sport": "Volleyball - Women Team",
    })));
    assert!(womens.is_valid);
}

#[test]
fn test_missing_photo_and_consent_only_warn() {
    let outcome = validator().validate(&participant(json!({
        "photo_url": "",
        "consent_status": false,
    })));
    assert!(outcome.is_valid);
    assert_eq!(codes(&outcome), ["PHOTO_REQUIRED", "CONSENT_REQUIRED"]);
    assert!(outcome.issues.iter().all(|i| i.severity == Severity::Warning));
}

#[test]
fn test_minor_without_consent_is_blocked() {
    let outcome = validator().validate(&participant(json!({
        "birthdate": "2010-03-15",
        "consent_status": null,
    })));
    assert!(!outcome.is_valid);
    assert_eq!(outcome.errors().count(), 1);
    assert_eq!(outcome.errors().next().map(|i| i.issue_type), Some(IssueType::MissingConsent));
}

#[test]
fn test_missing_collection_is_configuration_error() {
    let err = EligibilityValidator::from_collection(&RuleStore::new(rules_dir()), "WINTER_1999")
        .unwrap_err();
    assert!(err.to_string().contains("WINTER_1999"), "{err}");
}
