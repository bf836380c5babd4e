//! Error types for save/load operations

use crate::platform::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Stored document is not valid JSON
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    /// Imported file is not a valid report
    #[error("Parse error: {0}")]
    Parse(String),
}
