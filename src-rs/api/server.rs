use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::handlers::{
    handle_create, handle_delete, handle_health, handle_list, handle_prioritize,
    handle_prioritize_status, handle_reset_timer, handle_stats, handle_toggle_status,
    handle_toggle_timer,
};
use crate::app::ScholarFlow;

pub struct FlowServer {
    pub port: u16,
    pub flow: Arc<ScholarFlow>,
}

pub fn router(flow: Arc<ScholarFlow>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/tasks", get(handle_list).post(handle_create))
        .route("/tasks/:id", delete(handle_delete))
        .route("/tasks/:id/status", post(handle_toggle_status))
        .route("/tasks/:id/timer", post(handle_toggle_timer))
        .route("/tasks/:id/timer/reset", post(handle_reset_timer))
        .route("/prioritize", get(handle_prioritize_status).post(handle_prioritize))
        .route("/stats", get(handle_stats))
        .with_state(flow)
}

impl FlowServer {
    pub fn new(flow: Arc<ScholarFlow>) -> Self {
        Self {
            port: flow.config.port,
            flow,
        }
    }

    /// Serves until the process is interrupted; the task timer runs alongside
    /// and is stopped on the way out.
    pub async fn start(&self) -> Result<(), String> {
        let cancel = CancellationToken::new();
        let timer = self.flow.start_timer(cancel.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!(%addr, "scholarflow listening");
        let served = axum::Server::bind(&addr)
            .serve(router(self.flow.clone()).into_make_service())
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
            .map_err(|err| err.to_string());

        cancel.cancel();
        let _ = timer.await;
        served
    }
}
