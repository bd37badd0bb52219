//! # Audit Report Service
//!
//! An HTTP backend that turns a business's contact details into a structured
//! digital-marketing audit generated by Gemini.
//!
//! ## Request flow
//!
//! `POST /submit` → field validation → submissions log → prompt → Gemini
//! `generateContent` → report extraction → session slot → JSON response.
//!
//! - **Submission**: website URL, email and phone (plus optional category,
//!   owner and social handles). Validated before anything leaves the process.
//! - **Report**: the ten-field audit. Extracted from free-form model output
//!   with a strict decode first and a bounded set of repairs second; a report
//!   missing any field is an error, never a partial answer.
//! - **Session**: the last report is kept server-side for `GET /result`, keyed
//!   by the `audit_session` cookie, for the configured TTL.
//!
//! ## Endpoints
//!
//! | route | purpose |
//! |---|---|
//! | `GET /` | liveness probe |
//! | `POST /submit` | generate a report |
//! | `GET /result` | report stored for the caller's session |
//!
//! ## Running
//!
//! ```sh
//! GEMINI_API_KEY=... ALLOWED_ORIGINS=https://app.example RUST_LOG=info cargo run
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use audit_report_service::*;
//!
//! let config = ServiceConfig::load()?;
//! let state = AppState::in_memory(config)?;
//! let app = build_router(state);
//! ```

use std::{any::Any, sync::Arc, time::Duration};

use axum::{
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{error, info};
use tokio::{net::TcpListener, signal};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub mod config;
pub mod cors;
pub mod error;
pub mod extraction;
pub mod llm;
pub mod prompts;
pub mod routes;
pub mod schema;
pub mod session;
pub mod state;
pub mod submissions;
pub mod validation;

pub use config::ServiceConfig;
pub use error::{AuditError, ErrorBody, Result};
pub use extraction::{extract_object, extract_report, RepairPass};
pub use llm::GeminiClient;
pub use schema::{Report, Score, Submission};
pub use session::{MemorySessionStore, SessionStore};
pub use state::AppState;

use cors::{cors_layer, reject_unknown_preflight};
use routes::{index_handler, result_handler, submit_handler};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(index_handler))
        .route("/submit", post(submit_handler))
        .route("/result", get(result_handler))
        .layer(cors)
        .layer(from_fn_with_state(state.clone(), reject_unknown_preflight))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

fn handle_panic(_err: Box<dyn Any + Send + 'static>) -> Response {
    error!("Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new("Internal server error")),
    )
        .into_response()
}

pub async fn start_server(config: ServiceConfig) -> Result<()> {
    let sessions = Arc::new(MemorySessionStore::new());
    let state = AppState::new(config, sessions.clone())?;

    tokio::spawn(sweep_sessions(sessions));

    info!(
        "Allowed origins: {}",
        state.config.allowed_origins.join(", ")
    );
    let app = build_router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn sweep_sessions(sessions: Arc<MemorySessionStore>) {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        let purged = sessions.purge_expired();
        if purged > 0 {
            info!("Purged {purged} expired sessions");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
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
}
