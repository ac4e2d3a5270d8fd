use axum::{routing::get, Router};
use service_core::{config::ServiceConfig, observability::init_tracing, AppError};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use billing_service::handlers::general::{health_handler, metrics_handler, root_handler};
use billing_service::routes::api_routes;
use billing_service::services::{init_metrics, Database};
use billing_service::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = ServiceConfig::load()?;
    init_tracing("billing-service", &config.log_level);
    init_metrics();

    let addr = config.server_addr();

    let db = Database::new(
        &config.database_url,
        config.max_connections,
        config.min_connections,
    )
    .await?;
    db.run_migrations().await?;
    info!("Database connected and migrations applied");

    let state = AppState::new(db, config);

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    info!("billing-service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
