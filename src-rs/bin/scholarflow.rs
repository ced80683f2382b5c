use std::sync::Arc;

use scholarflow_rs::api::server::FlowServer;
use scholarflow_rs::{FlowConfig, ScholarFlow};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scholarflow=info,scholarflow_rs=info")),
        )
        .init();

    let config = FlowConfig::from_env();
    let flow = match ScholarFlow::new(config) {
        Ok(flow) => Arc::new(flow),
        Err(err) => {
            error!(error = %err, "could not start scholarflow");
            std::process::exit(1);
        }
    };

    let server = FlowServer::new(flow);
    if let Err(err) = server.start().await {
        error!(error = %err, "server error");
        std::process::exit(1);
    }
}
