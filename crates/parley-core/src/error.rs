/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur when reading or writing state snapshots.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The snapshot could not be encoded or decoded.
    #[error("invalid state snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// A flag assignment string was not of the form `name=value`.
    #[error("invalid flag assignment: \"{0}\"")]
    InvalidAssignment(String),
}
