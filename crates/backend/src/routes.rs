use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{self, AppState};
use crate::shared::format::format_number;

/// All application routes
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // U510 commission calculation
        .route(
            "/api/u510/calculate",
            post(handlers::u510_calculate_commissions::start_calculation),
        )
        .route(
            "/api/u510/progress/:calc_id",
            get(handlers::u510_calculate_commissions::get_progress),
        )
        .route(
            "/api/u510/delete-month",
            post(handlers::u510_calculate_commissions::delete_month),
        )
        .route(
            "/api/u510/recalculate-summary",
            post(handlers::u510_calculate_commissions::recalculate_summary),
        )
        // P910 commission records
        .route(
            "/api/p910/commissions",
            get(handlers::p910_commission_records::list),
        )
        .route(
            "/api/p910/commissions/export",
            get(handlers::p910_commission_records::export_csv),
        )
        .route(
            "/api/p910/commissions/:id/adjust",
            post(handlers::p910_commission_records::adjust),
        )
        // P911 monthly summaries
        .route(
            "/api/p911/summaries",
            get(handlers::p911_commission_summary::list),
        )
        // P913 calculation logs
        .route("/api/p913/logs", get(handlers::p913_calculation_log::list))
        .with_state(state)
}

/// Logs method, path, status, latency and body size of every request
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(
                "{} {} {} | {}ms | body error: {}",
                parts.status.as_u16(),
                method,
                uri.path(),
                start.elapsed().as_millis(),
                e
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    tracing::info!(
        "{} {} {} | {}ms | {} bytes",
        parts.status.as_u16(),
        method,
        uri.path(),
        start.elapsed().as_millis(),
        format_number(bytes.len())
    );
    Response::from_parts(parts, Body::from(bytes))
}
