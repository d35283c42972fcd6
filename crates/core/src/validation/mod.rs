//! Participant eligibility validation.
//!
//! Rules are loaded once per collection ([`store`]), selected per sport with
//! a two-tier merge ([`matcher`]) and applied by the [`evaluator`].

pub mod age;
pub mod evaluator;
pub mod issues;
pub mod matcher;
pub mod participant;
pub mod photo;
pub mod rules;
pub mod store;

pub use evaluator::EligibilityValidator;
pub use issues::{Issue, IssueType, ValidationOutcome};
pub use participant::Participant;
pub use photo::{PhotoProbe, ProbeError, ProbeResponse};
pub use rules::{Rule, RuleKind, RuleType, Severity};
pub use store::{RuleSet, RuleStore};
