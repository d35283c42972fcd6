//! Validation issue and outcome types.

use serde::{Deserialize, Serialize};

use super::rules::Severity;

/// What kind of problem an [`Issue`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    AgeRestriction,
    GenderMismatch,
    MissingPhoto,
    InvalidPhotoUrl,
    InaccessiblePhoto,
    NonImagePhoto,
    PhotoRequestFailed,
    MissingConsent,
    MissingBirthdate,
    InvalidBirthdate,
    MissingGender,
    InvalidData,
}

impl IssueType {
    /// Stable string representation matching serde's `rename_all = "snake_case"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AgeRestriction => "age_restriction",
            Self::GenderMismatch => "gender_mismatch",
            Self::MissingPhoto => "missing_photo",
            Self::InvalidPhotoUrl => "invalid_photo_url",
            Self::InaccessiblePhoto => "inaccessible_photo",
            Self::NonImagePhoto => "non_image_photo",
            Self::PhotoRequestFailed => "photo_request_failed",
            Self::MissingConsent => "missing_consent",
            Self::MissingBirthdate => "missing_birthdate",
            Self::InvalidBirthdate => "invalid_birthdate",
            Self::MissingGender => "missing_gender",
            Self::InvalidData => "invalid_data",
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single eligibility problem found for a participant.
///
/// Issues are plain values; they gain an identity only once persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_code: Option<String>,
    pub severity: Severity,
    /// The sport that triggered the issue, for sport-scoped checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sport: Option<String>,
    /// Category parameter of the sport label (e.g. "Men Team"), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sport_format: Option<String>,
}

impl Issue {
    /// An issue not tied to any rule.
    pub fn new(issue_type: IssueType, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            issue_type,
            description: description.into(),
            rule_code: None,
            severity,
            sport: None,
            sport_format: None,
        }
    }

    pub fn with_rule_code(mut self, rule_code: impl Into<String>) -> Self {
        self.rule_code = Some(rule_code.into());
        self
    }

    pub fn with_sport(mut self, sport: impl Into<String>) -> Self {
        self.sport = Some(sport.into());
        self
    }

    pub fn with_sport_format(mut self, sport_format: impl Into<String>) -> Self {
        self.sport_format = Some(sport_format.into());
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Result of validating one participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub issues: Vec<Issue>,
}

impl ValidationOutcome {
    /// Build an outcome; valid unless some issue has ERROR severity.
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        Self {
            is_valid: !issues.iter().any(Issue::is_blocking),
            issues,
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }
}
