//! Rule collections and the file-backed rule store.
//!
//! A collection named `SUMMER_2025` lives at `<rules_dir>/Summer_2025.json`
//! with the shape `{"rules": [ ... ]}`. Loading fails loudly: a missing file,
//! invalid JSON, a malformed rule or an empty rule list are all
//! [`CoreError::Configuration`] errors, because running with zero rules would
//! pass every participant.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Deserialize;

use super::rules::{Rule, RuleKind, RuleRecord, RuleType};
use crate::error::CoreError;

/// On-disk shape of a collection file.
#[derive(Debug, Deserialize)]
struct CollectionFile {
    rules: Vec<RuleRecord>,
}

// ---------------------------------------------------------------------------
// RuleSet
// ---------------------------------------------------------------------------

/// An immutable, ordered collection of rules.
///
/// Rules keep their source order.
#[derive(Debug, Clone)]
pub struct RuleSet {
    name: String,
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Build a rule set from already-typed rules. Fails if `rules` is empty.
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Result<Self, CoreError> {
        let name = name.into();
        if rules.is_empty() {
            return Err(CoreError::Configuration(format!(
                "Rule collection '{name}' contains no rules"
            )));
        }
        Ok(Self { name, rules })
    }

    /// Parse a collection from its JSON text.
    pub fn from_json_str(name: &str, json: &str) -> Result<Self, CoreError> {
        let file: CollectionFile = serde_json::from_str(json).map_err(|e| {
            CoreError::Configuration(format!("Rule collection '{name}' is malformed: {e}"))
        })?;

        let rules = file
            .rules
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                Rule::try_from(record).map_err(|e| {
                    CoreError::Configuration(format!(
                        "Rule collection '{name}', rule #{index}: {e}"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(name, rules)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules of one type, regardless of sport.
    pub fn by_type(&self, rule_type: RuleType) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |r| r.rule_type() == rule_type)
    }

    /// The first `event_date` rule's date, if any.
    pub fn event_date(&self) -> Option<NaiveDate> {
        self.rules.iter().find_map(|r| match r.kind {
            RuleKind::EventDate(date) => Some(date),
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// RuleStore
// ---------------------------------------------------------------------------

/// Resolves collection names to rule files under a directory.
#[derive(Debug, Clone)]
pub struct RuleStore {
    rules_dir: PathBuf,
}

impl RuleStore {
    pub fn new(rules_dir: impl Into<PathBuf>) -> Self {
        Self {
            rules_dir: rules_dir.into(),
        }
    }

    /// Path of the file backing `collection`.
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.rules_dir
            .join(format!("{}.json", title_case(collection)))
    }

    /// Load a named collection.
    pub fn load(&self, collection: &str) -> Result<RuleSet, CoreError> {
        let path = self.collection_path(collection);
        let json = std::fs::read_to_string(&path).map_err(|e| {
            CoreError::Configuration(format!(
                "Cannot read rule collection '{collection}' from {}: {e}",
                path.display()
            ))
        })?;
        let set = RuleSet::from_json_str(collection, &json)?;
        tracing::info!(
            collection,
            path = %path.display(),
            rules = set.len(),
            "Loaded rule collection"
        );
        Ok(set)
    }
}

/// Title-case a collection name: the first letter of every alphabetic run is
/// uppercased, the rest lowercased (`SUMMER_2025` -> `Summer_2025`).
fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_alpha = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert_matches::assert_matches;

    use super::*;

    const SMALL: &str = r#"{
        "rules": [
            {"rule_type": "event_date", "sport_event": "default", "value": "2025-07-19", "rule_code": "EVENT_DATE"},
            {"rule_type": "age", "category": "min", "sport_event": "default", "value": 13, "rule_code": "AGE_MIN_DEFAULT"},
            {"rule_type": "photo", "category": "required", "sport_event": "default", "value": "true", "rule_code": "PHOTO_REQUIRED", "severity": "WARNING"}
        ]
    }"#;

    #[test]
    fn title_case_matches_collection_file_names() {
        assert_eq!(title_case("SUMMER_2025"), "Summer_2025");
        assert_eq!(title_case("winter_retreat_2026"), "Winter_Retreat_2026");
        assert_eq!(title_case("x1y"), "X1Y");
    }

    #[test]
    fn parses_rules_in_source_order() {
        let set = RuleSet::from_json_str("TEST", SMALL).unwrap();
        assert_eq!(set.len(), 3);
        let codes: Vec<_> = set.rules().iter().map(|r| r.rule_code.as_str()).collect();
        assert_eq!(codes, ["EVENT_DATE", "AGE_MIN_DEFAULT", "PHOTO_REQUIRED"]);
        assert_eq!(set.event_date(), NaiveDate::from_ymd_opt(2025, 7, 19));
        assert_eq!(set.by_type(RuleType::Photo).count(), 1);
    }

    #[test]
    fn empty_collection_is_a_configuration_error() {
        let result = RuleSet::from_json_str("EMPTY", r#"{"rules": []}"#);
        assert_matches!(result, Err(CoreError::Configuration(msg)) if msg.contains("no rules"));
    }

    #[test]
    fn invalid_json_is_a_configuration_error() {
        let result = RuleSet::from_json_str("BAD", "{ not json");
        assert_matches!(result, Err(CoreError::Configuration(_)));
    }

    #[test]
    fn malformed_rule_names_its_index() {
        let json = r#"{"rules": [
            {"rule_type": "age", "category": "min", "sport_event": "default", "value": "old", "rule_code": "AGE_MIN"}
        ]}"#;
        let result = RuleSet::from_json_str("BAD", json);
        assert_matches!(result, Err(CoreError::Configuration(msg)) if msg.contains("rule #0"));
    }

    #[test]
    fn missing_collection_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuleStore::new(dir.path());
        assert_matches!(store.load("SUMMER_2025"), Err(CoreError::Configuration(_)));
    }

    #[test]
    fn loads_collection_from_title_cased_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("Summer_2025.json")).unwrap();
        file.write_all(SMALL.as_bytes()).unwrap();

        let store = RuleStore::new(dir.path());
        let set = store.load("SUMMER_2025").unwrap();
        assert_eq!(set.name(), "SUMMER_2025");
        assert_eq!(set.len(), 3);
    }
}
