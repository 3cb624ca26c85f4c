use axum::extract::{Path, State};
use axum::Json;
use contracts::projections::p911_commission_summary::dto::{
    MonthlySummaryDto, RecalculateSummaryRequest,
};
use contracts::usecases::u510_calculate_commissions::{
    CalcProgress, CalculateCommissionsRequest, CalculationStartResponse, DeleteMonthRequest,
    DeleteMonthResponse,
};

use super::AppState;
use crate::usecases::u510_calculate_commissions::error::CommissionError;

/// POST /api/u510/calculate
pub async fn start_calculation(
    State(state): State<AppState>,
    Json(request): Json<CalculateCommissionsRequest>,
) -> Result<Json<CalculationStartResponse>, CommissionError> {
    let response = state.executor.trigger(request).await?;
    Ok(Json(response))
}

/// GET /api/u510/progress/:calc_id
pub async fn get_progress(
    State(state): State<AppState>,
    Path(calc_id): Path<String>,
) -> Result<Json<CalcProgress>, CommissionError> {
    Ok(Json(state.executor.get_progress(&calc_id).await?))
}

/// POST /api/u510/delete-month
pub async fn delete_month(
    State(state): State<AppState>,
    Json(request): Json<DeleteMonthRequest>,
) -> Result<Json<DeleteMonthResponse>, CommissionError> {
    Ok(Json(state.executor.delete_month(request).await?))
}

/// POST /api/u510/recalculate-summary
pub async fn recalculate_summary(
    State(state): State<AppState>,
    Json(request): Json<RecalculateSummaryRequest>,
) -> Result<Json<MonthlySummaryDto>, CommissionError> {
    Ok(Json(state.executor.recalculate_summary(request).await?))
}
