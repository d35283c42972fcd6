//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod church_repo;
pub mod participant_repo;
pub mod validation_issue_repo;

pub use church_repo::ChurchRepo;
pub use participant_repo::ParticipantRepo;
pub use validation_issue_repo::ValidationIssueRepo;
