use reqwest::Url;
use serde_json::{Map, Value};

use crate::error::{AuditError, Result};
use crate::schema::{Submission, OPTIONAL_SUBMISSION_FIELDS, REQUIRED_SUBMISSION_FIELDS};

/// Turns a raw `/submit` body into a checked [`Submission`].
///
/// Fails on an empty body, a body that is not a JSON object, missing required
/// fields (all of them reported at once), or a URL without scheme or host.
pub fn parse_submission(body: &[u8]) -> Result<Submission> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AuditError::EmptyBody);
    }

    let value: Value = serde_json::from_slice(body).map_err(|_| AuditError::InvalidBody)?;
    let Value::Object(fields) = value else {
        return Err(AuditError::InvalidBody);
    };

    let normalized = normalize_fields(&fields);
    let missing = missing_fields(&normalized);
    if !missing.is_empty() {
        return Err(AuditError::MissingFields(missing));
    }

    let submission: Submission = serde_json::from_value(Value::Object(normalized))?;
    validate_url(&submission.url)?;

    Ok(submission)
}

/// Maps every accepted alias onto its canonical key, keeping only usable values.
fn normalize_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    let mut normalized = Map::new();

    for (canonical, aliases) in REQUIRED_SUBMISSION_FIELDS
        .iter()
        .chain(OPTIONAL_SUBMISSION_FIELDS.iter())
    {
        let found = aliases
            .iter()
            .find_map(|alias| fields.get(*alias).and_then(field_text));
        if let Some(text) = found {
            normalized.insert(canonical.to_string(), Value::String(text));
        }
    }

    normalized
}

/// Non-blank strings are kept trimmed; numbers (phone numbers sent unquoted) are stringified.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn missing_fields(normalized: &Map<String, Value>) -> Vec<String> {
    REQUIRED_SUBMISSION_FIELDS
        .iter()
        .filter(|(canonical, _)| !normalized.contains_key(*canonical))
        .map(|(canonical, _)| canonical.to_string())
        .collect()
}

pub fn validate_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| AuditError::InvalidUrl(format!("{raw} ({e})")))?;

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(AuditError::InvalidUrl(format!("{raw} has no host"))),
    }
}
