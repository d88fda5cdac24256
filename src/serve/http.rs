// src/serve/http.rs

use std::path::PathBuf;

use axum::Router;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tracing::{error, info};

/// Spawn the static file server for the output directory.
///
/// Serving runs on the shared runtime; a bind failure is logged and the
/// process keeps building and watching without a server.
pub fn spawn_http(host: String, port: u16, root: PathBuf) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = serve(&host, port, root).await {
            error!(error = %e, "dev server stopped");
        }
    })
}

async fn serve(host: &str, port: u16, root: PathBuf) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;

    info!(url = %format!("http://{host}:{port}/"), root = %root.display(), "dev server listening");

    let router = Router::new().fallback_service(ServeDir::new(root));

    axum::serve(listener, router).await?;

    Ok(())
}
