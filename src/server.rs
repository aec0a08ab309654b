use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::{
    calculators::{CellCostCalculator, PackCostCalculator},
    config::Config,
    handlers::{self, AppState},
    metrics,
    signals::setup_signal_handlers,
};

/// Field maps are tiny; anything larger is not a form submission
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Start the HTTP service
///
/// Serves until SIGINT/SIGTERM. On unix, SIGHUP reloads `config_path`
/// into the shared configuration snapshot.
pub async fn start_server(config: Config, config_path: PathBuf) -> Result<()> {
    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        match metrics::init_metrics() {
            Ok(handle) => Some(Arc::new(handle)),
            Err(e) => {
                warn!("Metrics disabled, recorder could not be installed: {}", e);
                None
            }
        }
    } else {
        None
    };

    let state = AppState::new(config.clone());

    let (shutdown_tx, signal_handle) = setup_signal_handlers(state.config.clone(), config_path);
    let mut shutdown_rx = shutdown_tx.subscribe();

    let app = create_router(state, metrics_handle);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting battery cost service on {}", addr);
    info!(
        "Presets: {} cell, {} pack; metrics {}",
        config.presets.cell.len(),
        config.presets.pack.len(),
        if config.metrics.enabled { "enabled" } else { "disabled" }
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Build the router with all routes and middleware
pub fn create_router(state: AppState, metrics_handle: Option<Arc<PrometheusHandle>>) -> Router {
    let metrics_endpoint = state.config.load().metrics.endpoint.clone();

    let api_routes = Router::new()
        .route("/v1/fields", get(handlers::fields::list_fields))
        .route(
            "/v1/cell-cost",
            post(handlers::calculate::calculate::<CellCostCalculator>),
        )
        .route(
            "/v1/pack-cost",
            post(handlers::calculate::calculate::<PackCostCalculator>),
        )
        .with_state(state);

    let mut app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(api_routes);

    if let Some(handle) = metrics_handle {
        let metrics_routes = Router::new()
            .route(&metrics_endpoint, get(handlers::metrics_handler::prometheus_metrics))
            .with_state(handle);
        app = app.merge(metrics_routes);
    }

    app.layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
