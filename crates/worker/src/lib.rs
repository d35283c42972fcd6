//! Sports Fest sync worker: configuration, HTTP photo probe and the runner
//! that validates participants and reconciles their issues.

pub mod config;
pub mod probe;
pub mod runner;

pub use config::{ConfigError, SyncConfig};
pub use probe::HttpPhotoProbe;
pub use runner::{ChurchStats, ParticipantStats, SyncRunner, SyncStats};
