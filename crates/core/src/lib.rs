//! Domain logic for Sports Fest registration sync.
//!
//! Everything in this crate is free of database and network dependencies:
//! rule loading, eligibility validation, approval status derivation and the
//! issue reconciliation plan all operate on plain values. Persistence and
//! HTTP are supplied by callers through the [`reconcile::IssueStore`] and
//! [`validation::photo::PhotoProbe`] seams.

pub mod approval;
pub mod error;
pub mod reconcile;
pub mod sport;
pub mod types;
pub mod validation;
