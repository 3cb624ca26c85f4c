pub mod p910_commission_records;
pub mod p911_commission_summary;
pub mod p913_calculation_log;
pub mod u510_calculate_commissions;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::usecases::common::UseCaseError;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::usecases::u510_calculate_commissions::error::CommissionError;
use crate::usecases::u510_calculate_commissions::executor::CommissionExecutor;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub executor: Arc<CommissionExecutor>,
}

impl CommissionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CommissionError::Validation(_) => StatusCode::BAD_REQUEST,
            CommissionError::RunInProgress(_) => StatusCode::CONFLICT,
            CommissionError::NotFound(_) => StatusCode::NOT_FOUND,
            CommissionError::Configuration(_)
            | CommissionError::Database(_)
            | CommissionError::Computation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CommissionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(UseCaseError::from(&self))).into_response()
    }
}
