use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Request, State},
    http::{
        header::{ACCESS_CONTROL_REQUEST_METHOD, CONTENT_TYPE, ORIGIN},
        HeaderValue, Method,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::warn;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{config::ServiceConfig, error::AuditError, state::AppState};

/// Credentialed CORS for the configured origins only. Never answers with `*`.
pub fn cors_layer(config: &ServiceConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Skipping unusable origin {origin:?}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

fn is_preflight(request: &Request) -> bool {
    request.method() == Method::OPTIONS
        && request.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD)
}

/// Turns preflights from unknown origins into a 403 before the CORS layer sees them.
pub async fn reject_unknown_preflight(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if is_preflight(&request) {
        let origin = request
            .headers()
            .get(ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if !state.config.is_allowed_origin(origin) {
            warn!("Rejected preflight from origin {origin:?}");
            return AuditError::OriginNotAllowed(origin.to_string()).into_response();
        }
    }

    next.run(request).await
}
