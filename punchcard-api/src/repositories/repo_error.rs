use thiserror::Error;

use crate::domain::TimeTrackingError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<RepositoryError> for TimeTrackingError {
    fn from(err: RepositoryError) -> Self {
        TimeTrackingError::store(err.to_string())
    }
}
