//! Eligibility evaluator: pure logic, no database access.
//!
//! Four independent checks run in a fixed order (age, gender, photo,
//! consent) and their issues are concatenated. A participant is valid unless
//! some issue has ERROR severity. Business-rule violations never surface as
//! errors; only a structurally malformed record short-circuits, and even
//! that is reported as a single `invalid_data` issue.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::age::{
    age_on, approximate_age_on, default_event_date, parse_birthdate, ADULT_AGE,
};
use super::issues::{Issue, IssueType, ValidationOutcome};
use super::matcher::RuleMatcher;
use super::participant::Participant;
use super::photo::{is_valid_photo_url, PhotoProbe, ProbeError, ProbeResponse};
use super::rules::{Rule, RuleKind, RuleType, Severity};
use super::store::{RuleSet, RuleStore};
use crate::error::CoreError;
use crate::sport::DEFAULT_SPORT;

/// Validates participants against one immutable rule collection.
///
/// Construct once and share by reference; `validate` takes `&self` and
/// keeps no state between calls.
#[derive(Debug, Clone)]
pub struct EligibilityValidator {
    rules: RuleSet,
    event_date: NaiveDate,
}

impl EligibilityValidator {
    /// Use the collection's `event_date` rule, falling back to the default
    /// event date.
    pub fn new(rules: RuleSet) -> Self {
        let event_date = rules.event_date().unwrap_or_else(default_event_date);
        Self { rules, event_date }
    }

    /// Load `collection` from `store`.
    pub fn from_collection(store: &RuleStore, collection: &str) -> Result<Self, CoreError> {
        Ok(Self::new(store.load(collection)?))
    }

    /// Anchor all age calculations to `event_date` instead of the rules' date.
    pub fn with_event_date(mut self, event_date: NaiveDate) -> Self {
        self.event_date = event_date;
        self
    }

    pub fn event_date(&self) -> NaiveDate {
        self.event_date
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    fn matcher(&self) -> RuleMatcher<'_> {
        RuleMatcher::new(&self.rules)
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Validate a raw record without network access. A well-formed photo URL
    /// is accepted without being fetched.
    pub fn validate(&self, record: &Map<String, Value>) -> ValidationOutcome {
        match Participant::from_record(record) {
            Ok(participant) => self.validate_participant(&participant),
            Err(message) => invalid_data(message),
        }
    }

    pub fn validate_participant(&self, participant: &Participant) -> ValidationOutcome {
        let photo = self.check_photo_format(participant).err().unwrap_or_default();
        self.assemble(participant, photo)
    }

    /// Validate a raw record, additionally probing a well-formed photo URL.
    ///
    /// Probe failures become WARNING-level issues (or the photo rule's
    /// configured severity); they never abort validation.
    pub async fn validate_live<P: PhotoProbe>(
        &self,
        record: &Map<String, Value>,
        probe: &P,
    ) -> ValidationOutcome {
        let participant = match Participant::from_record(record) {
            Ok(p) => p,
            Err(message) => return invalid_data(message),
        };

        let photo = match self.check_photo_format(&participant) {
            Ok(Some(url)) => self.photo_probe_issues(probe.head(url).await),
            Ok(None) => Vec::new(),
            Err(issues) => issues,
        };
        self.assemble(&participant, photo)
    }

    /// Age, gender, photo, consent: always in this order.
    fn assemble(&self, participant: &Participant, photo: Vec<Issue>) -> ValidationOutcome {
        let mut issues = self.check_age(participant);
        issues.extend(self.check_gender(participant));
        issues.extend(photo);
        issues.extend(self.check_consent(participant));
        ValidationOutcome::from_issues(issues)
    }

    // -----------------------------------------------------------------------
    // Age
    // -----------------------------------------------------------------------

    fn check_age(&self, participant: &Participant) -> Vec<Issue> {
        let Some(raw) = participant.birthdate.as_deref() else {
            return vec![Issue::new(
                IssueType::MissingBirthdate,
                Severity::Error,
                "Birthdate required for age validation",
            )];
        };
        let Some(birth) = parse_birthdate(raw) else {
            return vec![Issue::new(
                IssueType::InvalidBirthdate,
                Severity::Error,
                "Invalid birthdate format",
            )];
        };

        let age = age_on(birth, self.event_date);
        let mut sports: Vec<&str> = participant.all_sports().iter().map(|s| s.sport).collect();
        if sports.is_empty() {
            sports.push(DEFAULT_SPORT);
        }

        let mut issues = Vec::new();
        for sport in sports {
            for rule in self.matcher().rules_for(sport, None) {
                match rule.kind {
                    RuleKind::MinAge(min) if age < i64::from(min) => issues.push(
                        rule_issue(
                            IssueType::AgeRestriction,
                            rule,
                            Severity::Error,
                            format!("Age {age} is below minimum age {min} for {sport}"),
                        )
                        .with_sport(sport),
                    ),
                    RuleKind::MaxAge(max) if age >= i64::from(max) => issues.push(
                        rule_issue(
                            IssueType::AgeRestriction,
                            rule,
                            Severity::Error,
                            format!("Age {age} exceeds maximum age {max} for {sport}"),
                        )
                        .with_sport(sport),
                    ),
                    _ => {}
                }
            }
        }
        issues
    }

    // -----------------------------------------------------------------------
    // Gender
    // -----------------------------------------------------------------------

    fn check_gender(&self, participant: &Participant) -> Vec<Issue> {
        let Some(gender) = participant.gender.as_deref() else {
            return vec![Issue::new(
                IssueType::MissingGender,
                Severity::Error,
                "Gender required for validation",
            )];
        };
        let gender = gender.trim().to_lowercase();

        let mut issues = Vec::new();
        for label in participant.selected_sports() {
            for rule in self.matcher().rules_for(label.sport, label.parameter) {
                let RuleKind::GenderRestriction(required) = &rule.kind else {
                    continue;
                };
                let required = required.to_lowercase();
                if gender != required {
                    let mut issue = rule_issue(
                        IssueType::GenderMismatch,
                        rule,
                        Severity::Error,
                        format!("{} requires {required} gender", label.label),
                    )
                    .with_sport(label.sport);
                    if let Some(format) = label.parameter {
                        issue = issue.with_sport_format(format);
                    }
                    issues.push(issue);
                }
            }
        }
        issues
    }

    // -----------------------------------------------------------------------
    // Photo
    // -----------------------------------------------------------------------

    fn photo_rules(&self) -> Vec<&Rule> {
        self.rules
            .by_type(RuleType::Photo)
            .filter(|r| matches!(r.kind, RuleKind::PhotoRequired(true)))
            .collect()
    }

    /// `Ok(Some(url))` when a photo is required and the URL is well formed,
    /// `Ok(None)` when no photo rule is active, `Err(issues)` otherwise.
    fn check_photo_format<'p>(
        &self,
        participant: &'p Participant,
    ) -> Result<Option<&'p str>, Vec<Issue>> {
        let rules = self.photo_rules();
        if rules.is_empty() {
            return Ok(None);
        }

        let Some(url) = participant.photo_url.as_deref().map(str::trim) else {
            return Err(rules
                .iter()
                .map(|rule| {
                    rule_issue(
                        IssueType::MissingPhoto,
                        rule,
                        Severity::Warning,
                        "No profile photo provided",
                    )
                })
                .collect());
        };

        if !is_valid_photo_url(url) {
            return Err(rules
                .iter()
                .map(|rule| {
                    rule_issue(
                        IssueType::InvalidPhotoUrl,
                        rule,
                        Severity::Warning,
                        format!("Invalid photo URL format: {url}"),
                    )
                })
                .collect());
        }

        Ok(Some(url))
    }

    fn photo_probe_issues(&self, response: Result<ProbeResponse, ProbeError>) -> Vec<Issue> {
        let rules = self.photo_rules();
        let mut issues = Vec::new();
        match response {
            Ok(response) => {
                if !response.is_ok() {
                    issues.extend(rules.iter().map(|rule| {
                        rule_issue(
                            IssueType::InaccessiblePhoto,
                            rule,
                            Severity::Warning,
                            format!("Photo URL returned status code {}", response.status),
                        )
                    }));
                }
                if !response.is_image() {
                    let content_type = response.content_type.as_deref().unwrap_or("");
                    issues.extend(rules.iter().map(|rule| {
                        rule_issue(
                            IssueType::NonImagePhoto,
                            rule,
                            Severity::Warning,
                            format!("Photo URL content type is {content_type}, not an image"),
                        )
                    }));
                }
            }
            Err(err) => issues.extend(rules.iter().map(|rule| {
                rule_issue(
                    IssueType::PhotoRequestFailed,
                    rule,
                    Severity::Warning,
                    format!("Failed to access photo URL: {err}"),
                )
            })),
        }
        issues
    }

    // -----------------------------------------------------------------------
    // Consent
    // -----------------------------------------------------------------------

    fn check_consent(&self, participant: &Participant) -> Vec<Issue> {
        if participant.consent_status == Some(true) {
            return Vec::new();
        }

        let age = participant
            .birthdate
            .as_deref()
            .and_then(parse_birthdate)
            .map(|birth| approximate_age_on(birth, self.event_date));
        let severity = match age {
            Some(age) if age < ADULT_AGE => Severity::Error,
            _ => Severity::Warning,
        };

        self.rules
            .by_type(RuleType::Consent)
            .filter(|r| matches!(r.kind, RuleKind::ConsentRequired(true)))
            .map(|rule| {
                Issue::new(
                    IssueType::MissingConsent,
                    severity,
                    "Consent form status unknown or not provided",
                )
                .with_rule_code(&rule.rule_code)
            })
            .collect()
    }
}

fn rule_issue(
    issue_type: IssueType,
    rule: &Rule,
    default_severity: Severity,
    description: impl Into<String>,
) -> Issue {
    Issue::new(issue_type, rule.severity_or(default_severity), description)
        .with_rule_code(&rule.rule_code)
}

fn invalid_data(message: String) -> ValidationOutcome {
    ValidationOutcome::from_issues(vec![Issue::new(
        IssueType::InvalidData,
        Severity::Error,
        message,
    )])
}
