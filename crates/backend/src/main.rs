#![allow(clippy::too_many_arguments, clippy::type_complexity)]

pub mod domain;
pub mod handlers;
pub mod projections;
pub mod routes;
pub mod shared;
pub mod system;
pub mod usecases;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, Method};
use axum::middleware;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower_http::cors::{Any, CorsLayer};

use handlers::AppState;
use usecases::u510_calculate_commissions::executor::CommissionExecutor;
use usecases::u510_calculate_commissions::worker::CalcJobWorker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = shared::config::load_config()?;
    let db_path = shared::config::get_database_path(&config)?;
    shared::data::db::initialize_database(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;
    let db = shared::data::db::get_connection()?.clone();

    let wake = Arc::new(Notify::new());
    let executor = Arc::new(CommissionExecutor::new(
        db.clone(),
        config.commission.clone(),
        wake.clone(),
    ));

    let worker = CalcJobWorker::new(db.clone(), config.commission.clone(), wake);
    worker.recover_interrupted().await?;
    tokio::spawn(async move {
        worker.run_loop().await;
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = routes::configure_routes(AppState { db, executor })
        .layer(middleware::from_fn(routes::request_logger))
        .layer(cors);

    let port = config.server.port;
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Port {} is already in use. Please ensure no other process is using this port.",
                    port
                );
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", port, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
