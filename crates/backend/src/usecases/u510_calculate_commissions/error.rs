use contracts::usecases::common::UseCaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommissionError {
    /// Bad trigger input; rejected before any work starts
    #[error("{0}")]
    Validation(String),

    /// Missing or inconsistent rate configuration; aborts the run
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("a commission run for {0} is in progress")]
    RunInProgress(String),

    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("calculation failed: {0}")]
    Computation(#[from] anyhow::Error),
}

impl CommissionError {
    pub fn validation(message: impl Into<String>) -> Self {
        CommissionError::Validation(message.into())
    }
}

impl From<&CommissionError> for UseCaseError {
    fn from(err: &CommissionError) -> Self {
        match err {
            CommissionError::Validation(msg) => UseCaseError::validation(msg.clone()),
            CommissionError::Configuration(msg) => UseCaseError::configuration(msg.clone()),
            CommissionError::RunInProgress(_) => UseCaseError::conflict(err.to_string()),
            CommissionError::NotFound(msg) => UseCaseError::not_found(msg.clone()),
            CommissionError::Database(e) => {
                UseCaseError::internal("Database error").with_details(e.to_string())
            }
            CommissionError::Computation(e) => {
                UseCaseError::internal("Calculation failed").with_details(format!("{:#}", e))
            }
        }
    }
}
