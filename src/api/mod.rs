//! HTTP service
//!
//! Three endpoints over the policy, trading and agent components:
//!
//! | Route | Purpose |
//! |---|---|
//! | `GET /health` | configuration summary |
//! | `POST /agent/run` | one plan/review run |
//! | `POST /trade/intent` | paper trade evaluation |

mod routes;
mod state;

pub use routes::{api_router, ApiError, HealthResponse};
pub use state::AppState;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Router with state and middleware applied
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api_router().layer(cors).with_state(state)
}

/// Serve on an already bound listener until Ctrl-C
pub async fn serve(listener: TcpListener, state: AppState) -> crate::Result<()> {
    let addr = listener.local_addr()?;
    info!(
        addr = %addr,
        app_name = %state.settings.app_name,
        environment = %state.settings.environment,
        "listening"
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
