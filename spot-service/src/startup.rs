use crate::config::SpotConfig;
use crate::handlers;
use crate::services::{MongoSpotStore, SpotStore};
use axum::{
    extract::Request,
    middleware::from_fn,
    routing::{delete, get},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    cors_layer, metrics_middleware, request_id_middleware, security_headers_middleware,
    REQUEST_ID_HEADER,
};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SpotStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn SpotStore>) -> Self {
        Self { store }
    }
}

pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/spot", get(handlers::list_spots).post(handlers::create_spot))
        .route("/spot/:id", get(handlers::get_spot))
        .route("/spot/delete/:id", delete(handlers::delete_spot))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route_layer(from_fn(metrics_middleware))
        .route("/", get(handlers::index))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");

            tracing::info_span!(
                "http_request",
                request_id = %request_id,
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        }))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    /// Connects to MongoDB, confirms it answers a ping, then binds the
    /// listener. Any failure aborts startup.
    pub async fn build(config: SpotConfig) -> Result<Self, AppError> {
        let store = MongoSpotStore::connect(&config.mongodb).await?;

        store
            .ping()
            .await
            .map_err(|e| AppError::database("MongoDB ping failed", e))?;
        tracing::info!(database = %config.mongodb.database, "Pinged MongoDB successfully");

        Self::build_with_store(config, Arc::new(store)).await
    }

    pub async fn build_with_store(
        config: SpotConfig,
        store: Arc<dyn SpotStore>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(store);
        let app = build_router(state.clone(), &config.cors_allowed_origins);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port, "Server is running on port {} for Wander Quest", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn store(&self) -> Arc<dyn SpotStore> {
        self.state.store.clone()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }

    /// Serves until `shutdown` resolves, then drops in-flight requests and
    /// closes the store.
    pub async fn run_until_interrupted<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let store = self.state.store;

        tokio::select! {
            result = self.server => {
                if let Err(e) = &result {
                    tracing::error!("HTTP server error: {}", e);
                }
                result?;
            }
            _ = shutdown => {
                tracing::info!("Closing MongoDB connection");
                store.close().await;
                tracing::info!("MongoDB connection closed. Server shutting down");
            }
        }

        Ok(())
    }
}
