//! Axum-based HTTP server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::RpcError;
use crate::handlers;
use crate::metrics::ApiMetrics;
use crate::state::AppState;

/// Build the API router with CORS, request tracing and per-route metrics.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/seeds-balance", get(handlers::balance))
        .route("/api/seeds-mint", post(handlers::mint))
        .route("/api/seeds-transfer", post(handlers::transfer))
        .route("/api/seeds-burn", post(handlers::burn))
        .route("/api/seeds-transactions", get(handlers::transactions))
        .route("/api/seeds-analytics", get(handlers::analytics))
        .route("/api/admin-info", get(handlers::admin_info))
        .route("/health", get(handlers::health))
        .route_layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_requests,
        ))
        // Scrapes are not counted as API traffic.
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn track_requests(
    State(metrics): State<Arc<ApiMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());
    let response = next.run(request).await;
    let status = response.status();
    metrics.record_request(
        &endpoint,
        status.is_client_error() || status.is_server_error(),
    );
    response
}

pub struct RpcServer {
    pub addr: SocketAddr,
    state: AppState,
}

impl RpcServer {
    pub fn new(addr: SocketAddr, state: AppState) -> Self {
        Self { addr, state }
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn start<F>(self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "SEEDS API listening");
        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown)
            .await?;
        tracing::info!("SEEDS API stopped");
        Ok(())
    }
}
