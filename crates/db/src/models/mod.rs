pub mod church;
pub mod participant;
pub mod validation_issue;
