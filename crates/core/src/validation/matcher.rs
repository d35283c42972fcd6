//! Two-tier rule resolution: sport-specific rules first, then `default`.

use super::rules::Rule;
use super::store::RuleSet;
use crate::sport::DEFAULT_SPORT;

/// Resolves the rules that apply to a sport within one [`RuleSet`].
#[derive(Debug, Clone, Copy)]
pub struct RuleMatcher<'a> {
    rules: &'a RuleSet,
}

impl<'a> RuleMatcher<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Rules applicable to `sport_event`, optionally narrowed by `parameter`.
    ///
    /// With no `parameter`, rules match regardless of their own parameter;
    /// with one, only rules carrying exactly that parameter match. Rules
    /// under the `default` sport are appended unless a rule with the same
    /// `(rule_type, category)` is already selected, so a sport-specific rule
    /// always overrides the default for that concern and a concern is never
    /// represented twice by defaults.
    pub fn rules_for(&self, sport_event: &str, parameter: Option<&str>) -> Vec<&'a Rule> {
        let all = self.rules.rules();
        let mut selected: Vec<&'a Rule> = all
            .iter()
            .filter(|r| r.sport_event == sport_event && parameter_matches(r, parameter))
            .collect();

        if sport_event != DEFAULT_SPORT {
            for rule in all
                .iter()
                .filter(|r| r.sport_event == DEFAULT_SPORT && parameter_matches(r, parameter))
            {
                let concern = rule.kind.concern();
                if !selected.iter().any(|s| s.kind.concern() == concern) {
                    selected.push(rule);
                }
            }
        }

        selected
    }
}

fn parameter_matches(rule: &Rule, parameter: Option<&str>) -> bool {
    match parameter {
        None => true,
        Some(p) => rule.parameter.as_deref() == Some(p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules::{RuleKind, Severity};

    fn rule(sport: &str, parameter: Option<&str>, code: &str, kind: RuleKind) -> Rule {
        Rule {
            sport_event: sport.to_string(),
            parameter: parameter.map(str::to_string),
            rule_code: code.to_string(),
            severity: Some(Severity::Error),
            kind,
        }
    }

    fn fixture() -> RuleSet {
        RuleSet::new(
            "TEST",
            vec![
                rule("default", None, "AGE_MIN_DEFAULT", RuleKind::MinAge(13)),
                rule("default", None, "AGE_MAX_DEFAULT", RuleKind::MaxAge(35)),
                rule("Scripture Memorization", None, "AGE_MIN_SCRIPTURE", RuleKind::MinAge(10)),
                rule("Scripture Memorization", None, "AGE_MAX_SCRIPTURE", RuleKind::MaxAge(99)),
                rule("Pickleball 35+", None, "AGE_MIN_PB35", RuleKind::MinAge(35)),
                rule(
                    "Basketball",
                    Some("Men Team"),
                    "GENDER_BASKETBALL_MEN",
                    RuleKind::GenderRestriction("Male".into()),
                ),
            ],
        )
        .unwrap()
    }

    fn codes(rules: &[&Rule]) -> Vec<String> {
        rules.iter().map(|r| r.rule_code.clone()).collect()
    }

    #[test]
    fn unconfigured_sport_inherits_defaults() {
        let set = fixture();
        let matched = RuleMatcher::new(&set).rules_for("Tennis", None);
        assert_eq!(codes(&matched), ["AGE_MIN_DEFAULT", "AGE_MAX_DEFAULT"]);
    }

    #[test]
    fn specific_rules_override_defaults_of_same_concern() {
        let set = fixture();
        let matched = RuleMatcher::new(&set).rules_for("Scripture Memorization", None);
        assert_eq!(codes(&matched), ["AGE_MIN_SCRIPTURE", "AGE_MAX_SCRIPTURE"]);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let set = fixture();
        let matched = RuleMatcher::new(&set).rules_for("Pickleball 35+", None);
        assert_eq!(codes(&matched), ["AGE_MIN_PB35", "AGE_MAX_DEFAULT"]);
    }

    #[test]
    fn no_parameter_matches_parameterised_rules() {
        let set = fixture();
        let matched = RuleMatcher::new(&set).rules_for("Basketball", None);
        assert_eq!(
            codes(&matched),
            ["GENDER_BASKETBALL_MEN", "AGE_MIN_DEFAULT", "AGE_MAX_DEFAULT"]
        );
    }

    #[test]
    fn parameter_narrows_both_tiers() {
        let set = fixture();
        let matched = RuleMatcher::new(&set).rules_for("Basketball", Some("Men Team"));
        assert_eq!(codes(&matched), ["GENDER_BASKETBALL_MEN"]);

        let other = RuleMatcher::new(&set).rules_for("Basketball", Some("Women Team"));
        assert!(other.is_empty());
    }

    #[test]
    fn default_sport_is_not_doubled() {
        let set = fixture();
        let matched = RuleMatcher::new(&set).rules_for(DEFAULT_SPORT, None);
        assert_eq!(codes(&matched), ["AGE_MIN_DEFAULT", "AGE_MAX_DEFAULT"]);
    }

    #[test]
    fn duplicate_default_concerns_collapse_to_first() {
        let set = RuleSet::new(
            "DUP",
            vec![
                rule("default", None, "AGE_MIN_A", RuleKind::MinAge(13)),
                rule("default", None, "AGE_MIN_B", RuleKind::MinAge(16)),
            ],
        )
        .unwrap();
        let matched = RuleMatcher::new(&set).rules_for("Tennis", None);
        assert_eq!(codes(&matched), ["AGE_MIN_A"]);
    }
}
