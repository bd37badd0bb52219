use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Request body is required")]
    EmptyBody,

    #[error("Request body must be a JSON object")]
    InvalidBody,

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("No report found. Please submit the form first.")]
    NoReport,

    #[error("Origin not allowed: {0}")]
    OriginNotAllowed(String),

    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,

    #[error("Upstream request failed: {0}")]
    UpstreamTransport(#[from] reqwest::Error),

    #[error("Upstream returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Malformed upstream payload: {0}")]
    UpstreamPayload(String),

    #[error("Could not parse report: {0}")]
    ReportParse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AuditError>;

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            missing: None,
        }
    }
}

impl AuditError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuditError::EmptyBody
            | AuditError::InvalidBody
            | AuditError::MissingFields(_)
            | AuditError::InvalidUrl(_)
            | AuditError::NoReport => StatusCode::BAD_REQUEST,
            AuditError::OriginNotAllowed(_) => StatusCode::FORBIDDEN,
            AuditError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
            AuditError::UpstreamTransport(_)
            | AuditError::UpstreamStatus { .. }
            | AuditError::UpstreamPayload(_) => StatusCode::BAD_GATEWAY,
            AuditError::ReportParse(_)
            | AuditError::Config(_)
            | AuditError::Serialization(_)
            | AuditError::Io(_)
            | AuditError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message a client is allowed to see. Server-side details stay in the logs.
    fn body(&self) -> ErrorBody {
        match self {
            AuditError::EmptyBody
            | AuditError::InvalidBody
            | AuditError::InvalidUrl(_)
            | AuditError::NoReport => ErrorBody::new(self.to_string()),
            AuditError::MissingFields(fields) => ErrorBody {
                error: "Missing required fields".to_string(),
                missing: Some(fields.clone()),
            },
            AuditError::OriginNotAllowed(_) => ErrorBody::new("Origin not allowed"),
            AuditError::MissingApiKey => ErrorBody::new("Report service is not configured"),
            AuditError::UpstreamTransport(_)
            | AuditError::UpstreamStatus { .. }
            | AuditError::UpstreamPayload(_) => ErrorBody::new("Upstream service unavailable"),
            AuditError::ReportParse(_) => ErrorBody::new("Could not parse report"),
            AuditError::Config(_)
            | AuditError::Serialization(_)
            | AuditError::Io(_)
            | AuditError::Internal(_) => ErrorBody::new("Internal server error"),
        }
    }
}

impl IntoResponse for AuditError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{self}");
        }

        (status, Json(self.body())).into_response()
    }
}
