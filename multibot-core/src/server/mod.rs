//! HTTP API backing the dashboard and the embedded chat frame.

mod bots;
mod chat;
mod error;

pub use error::ApiError;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, warn, Level};

use crate::completion::CompletionProvider;
use crate::config::ServerSettings;
use crate::error::{MultibotError, MultibotResult};
use crate::repo::BotStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BotStore>,
    pub completion: Arc<dyn CompletionProvider>,
}

impl AppState {
    pub fn new(store: Arc<dyn BotStore>, completion: Arc<dyn CompletionProvider>) -> Self {
        Self { store, completion }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    // Widgets are embedded on arbitrary customer sites.
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn router(state: AppState, settings: &ServerSettings) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/bots", get(bots::list_bots).post(bots::create_bot))
        .route(
            "/api/bots/{id}",
            get(bots::get_bot)
                .put(bots::update_bot)
                .delete(bots::delete_bot),
        )
        .route("/api/chat", axum::routing::post(chat::chat))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&settings.cors_origins))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// A running API server. Dropping it without calling [`MultibotServer::stop`]
/// leaves the server task running until the runtime shuts down.
pub struct MultibotServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
    pub local_addr: SocketAddr,
}

impl MultibotServer {
    pub async fn start(state: AppState, settings: &ServerSettings) -> MultibotResult<Self> {
        let listener = TcpListener::bind(format!("{}:{}", settings.host, settings.port)).await?;
        Self::start_on(listener, state, settings)
    }

    /// Serve on an already-bound listener (port 0 in tests).
    pub fn start_on(
        listener: TcpListener,
        state: AppState,
        settings: &ServerSettings,
    ) -> MultibotResult<Self> {
        let local_addr = listener.local_addr()?;
        let app = router(state, settings);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        info!("Multibot API listening on http://{}", local_addr);

        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                warn!("API server exited with error: {}", e);
            }
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
            local_addr,
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    /// Run until ctrl-c, then shut down gracefully.
    pub async fn run_until_ctrl_c(mut self) -> MultibotResult<()> {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| MultibotError::Internal(format!("failed to listen for ctrl-c: {}", e)))?;
        info!("Shutting down API server");
        self.stop().await;
        Ok(())
    }
}
