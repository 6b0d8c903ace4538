// Web boundary: upload form, candidate report and export downloads

mod handlers;
mod router;
mod state;
mod templates;

pub use router::app_router;
pub use state::AppState;

use std::net::SocketAddr;
use tracing::info;

use crate::error::Result;

/// Bind and serve the web app until the process is stopped
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let app = app_router(state);
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    let addr: SocketAddr = listener.local_addr()?;

    info!("Web server listening on http://{}", addr);
    info!("Candidate report: http://{}/report", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
