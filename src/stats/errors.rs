use thiserror::Error;

use crate::shared::AppError;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<StatsError> for AppError {
    fn from(err: StatsError) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}
