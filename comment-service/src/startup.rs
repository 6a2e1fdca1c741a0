//! Application startup and lifecycle management.

use crate::config::CommentConfig;
use crate::handlers::{comment::create_comment, health::health_check, not_found};
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::TextProvider;
use crate::services::CommentService;
use axum::http::Method;
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{http_trace_layer, request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub comment_service: CommentService,
    pub environment: String,
}

impl AppState {
    pub fn new(provider: Arc<dyn TextProvider>, environment: impl Into<String>) -> Self {
        Self {
            comment_service: CommentService::new(provider),
            environment: environment.into(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/ai/yorum", post(create_comment))
        .route("/health", get(health_check))
        .fallback(not_found)
        .layer(cors)
        .layer(http_trace_layer())
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
    heartbeat_interval: Option<Duration>,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: CommentConfig) -> Result<Self, AppError> {
        let gemini_config = GeminiConfig {
            model: config.gemini.model.clone(),
            api_base: config.gemini.api_base.clone(),
            timeout: Duration::from_secs(config.gemini.timeout_secs),
        };
        let provider = GeminiTextProvider::new(gemini_config).map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to create HTTP client: {}", e))
        })?;

        tracing::info!(
            model = %config.gemini.model,
            timeout_secs = config.gemini.timeout_secs,
            "Initialized Gemini text provider"
        );

        let state = AppState::new(Arc::new(provider), config.environment.clone());

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            environment = %config.environment,
            "Comment service listening, health check at /health"
        );

        let heartbeat_interval = match config.heartbeat_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            port,
            listener,
            state,
            heartbeat_interval,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until SIGINT/SIGTERM, then stop accepting connections and
    /// drain in-flight requests.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_with_shutdown(shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let heartbeat = self.heartbeat_interval.map(spawn_heartbeat);
        let router = build_router(self.state);

        let result = axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown)
            .await;

        if let Some(handle) = heartbeat {
            handle.abort();
        }

        match result {
            Ok(()) => {
                tracing::info!("Server stopped");
                Ok(())
            }
            Err(e) => {
                tracing::error!("HTTP server error: {}", e);
                Err(std::io::Error::other(format!("HTTP server error: {}", e)))
            }
        }
    }
}

fn spawn_heartbeat(period: Duration) -> JoinHandle<()> {
    let started = Instant::now();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            tracing::info!(uptime_secs = started.elapsed().as_secs(), "heartbeat");
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}
