#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A rule collection (or other static configuration) is missing or malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),
}
