//! Eligibility rule types.
//!
//! Rule files store loosely-typed records ([`RuleRecord`]); they are checked
//! once at load time and converted into [`Rule`] values whose [`RuleKind`]
//! carries the typed payload for each `(rule_type, category)` pair.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// How strongly an issue affects eligibility.
///
/// Only [`Severity::Error`] blocks a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[serde(alias = "error")]
    Error,
    #[serde(alias = "warning")]
    Warning,
    #[serde(alias = "info")]
    Info,
}

impl Severity {
    /// Stable string representation matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }

    /// Parse a stored severity, accepting either case.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s.to_ascii_uppercase().as_str() {
            "ERROR" => Ok(Self::Error),
            "WARNING" => Ok(Self::Warning),
            "INFO" => Ok(Self::Info),
            _ => Err(format!(
                "Invalid severity '{s}'. Must be one of: ERROR, WARNING, INFO"
            )),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Rule type / category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    Age,
    Gender,
    Photo,
    Consent,
    EventDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Min,
    Max,
    Restriction,
    Required,
    /// Used by `event_date` rules, which have no meaningful category.
    #[serde(alias = "date", alias = "")]
    Value,
}

// ---------------------------------------------------------------------------
// Raw record
// ---------------------------------------------------------------------------

/// A rule as written in a collection file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleRecord {
    pub rule_type: RuleType,
    #[serde(default = "default_category")]
    pub category: RuleCategory,
    pub sport_event: String,
    #[serde(default)]
    pub parameter: Option<String>,
    pub value: Value,
    pub rule_code: String,
    #[serde(default)]
    pub severity: Option<Severity>,
}

fn default_category() -> RuleCategory {
    RuleCategory::Value
}

// ---------------------------------------------------------------------------
// Typed rule
// ---------------------------------------------------------------------------

/// The typed payload of a rule, one variant per supported concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// Inclusive minimum age.
    MinAge(u32),
    /// Exclusive maximum age: a participant exactly this old fails.
    MaxAge(u32),
    /// Required gender label, compared case-insensitively.
    GenderRestriction(String),
    PhotoRequired(bool),
    ConsentRequired(bool),
    EventDate(NaiveDate),
}

impl RuleKind {
    /// The `(rule_type, category)` concern this kind belongs to.
    pub fn concern(&self) -> (RuleType, RuleCategory) {
        match self {
            Self::MinAge(_) => (RuleType::Age, RuleCategory::Min),
            Self::MaxAge(_) => (RuleType::Age, RuleCategory::Max),
            Self::GenderRestriction(_) => (RuleType::Gender, RuleCategory::Restriction),
            Self::PhotoRequired(_) => (RuleType::Photo, RuleCategory::Required),
            Self::ConsentRequired(_) => (RuleType::Consent, RuleCategory::Required),
            Self::EventDate(_) => (RuleType::EventDate, RuleCategory::Value),
        }
    }
}

/// A validated, immutable eligibility rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub sport_event: String,
    pub parameter: Option<String>,
    pub rule_code: String,
    /// Configured severity; checks apply their own default when absent.
    pub severity: Option<Severity>,
    pub kind: RuleKind,
}

impl Rule {
    pub fn rule_type(&self) -> RuleType {
        self.kind.concern().0
    }

    pub fn category(&self) -> RuleCategory {
        self.kind.concern().1
    }

    /// The configured severity, or `default` when the rule has none.
    pub fn severity_or(&self, default: Severity) -> Severity {
        self.severity.unwrap_or(default)
    }
}

impl TryFrom<RuleRecord> for Rule {
    type Error = String;

    fn try_from(record: RuleRecord) -> Result<Self, Self::Error> {
        let code = record.rule_code.trim();
        if code.is_empty() {
            return Err("rule_code must not be empty".to_string());
        }
        if record.sport_event.trim().is_empty() {
            return Err(format!("rule {code}: sport_event must not be empty"));
        }

        let kind = match (record.rule_type, record.category) {
            (RuleType::Age, RuleCategory::Min) => RuleKind::MinAge(value_as_age(code, &record.value)?),
            (RuleType::Age, RuleCategory::Max) => RuleKind::MaxAge(value_as_age(code, &record.value)?),
            (RuleType::Gender, RuleCategory::Restriction) => {
                RuleKind::GenderRestriction(value_as_string(code, &record.value)?)
            }
            (RuleType::Photo, RuleCategory::Required) => {
                RuleKind::PhotoRequired(value_as_bool(code, &record.value)?)
            }
            (RuleType::Consent, RuleCategory::Required) => {
                RuleKind::ConsentRequired(value_as_bool(code, &record.value)?)
            }
            (RuleType::EventDate, _) => {
                let raw = value_as_string(code, &record.value)?;
                let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| {
                    format!("rule {code}: invalid event date '{raw}' (expected YYYY-MM-DD): {e}")
                })?;
                RuleKind::EventDate(date)
            }
            (rule_type, category) => {
                return Err(format!(
                    "rule {code}: unsupported category {category:?} for rule type {rule_type:?}"
                ))
            }
        };

        Ok(Self {
            sport_event: record.sport_event.trim().to_string(),
            parameter: record
                .parameter
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            rule_code: code.to_string(),
            severity: record.severity,
            kind,
        })
    }
}

fn value_as_age(code: &str, value: &Value) -> Result<u32, String> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| format!("rule {code}: age value must be a non-negative integer, got {value}"))
}

fn value_as_string(code: &str, value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(format!("rule {code}: value must be a non-empty string, got {value}")),
    }
}

fn value_as_bool(code: &str, value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(format!("rule {code}: expected \"true\" or \"false\", got {value}")),
        },
        _ => Err(format!("rule {code}: expected a boolean, got {value}")),
    }
}
