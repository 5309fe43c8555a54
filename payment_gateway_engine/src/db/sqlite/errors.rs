use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Could not encode order notes: {0}")]
    NotesEncoding(#[from] serde_json::Error),
    #[error("Row {0} could not be read back after insert")]
    InsertReadback(String),
}
