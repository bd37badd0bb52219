use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use log::{debug, info, warn};
use serde_json::{json, Value};

use crate::{
    error::{AuditError, Result},
    extraction::extract_report,
    prompts::build_audit_prompt,
    schema::SuccessBody,
    session::{new_session_id, session_cookie, session_id_from_headers},
    state::AppState,
    validation::parse_submission,
};

pub const SERVICE_NAME: &str = "audit-report-service";

pub async fn index_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let submission = parse_submission(&body)?;
    info!("Accepted submission for {}", submission.url);

    if let Err(e) = state.submissions.append(&submission).await {
        warn!(
            "Failed to log submission to {}: {e}",
            state.submissions.path().display()
        );
    }

    let gemini = state.gemini.as_ref().ok_or(AuditError::MissingApiKey)?;
    let prompt = build_audit_prompt(&submission);
    let text = gemini.generate_text(&prompt).await?;

    let report = extract_report(&text).inspect_err(|_| {
        debug!("Unparseable model output: {text}");
    })?;

    let session_id = session_id_from_headers(&headers).unwrap_or_else(new_session_id);
    state.sessions.set(
        &session_id,
        serde_json::to_value(&report)?,
        state.config.session_ttl,
    );
    let cookie = session_cookie(
        &session_id,
        state.config.session_ttl,
        state.config.cookie_secure,
    );

    info!("Report ready for {}", report.client);
    Ok(([(SET_COOKIE, cookie)], Json(SuccessBody::new(report))).into_response())
}

pub async fn result_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SuccessBody<Value>>> {
    let report = session_id_from_headers(&headers)
        .and_then(|id| state.sessions.get(&id))
        .ok_or(AuditError::NoReport)?;

    Ok(Json(SuccessBody::new(report)))
}
