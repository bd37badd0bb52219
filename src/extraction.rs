//! Pulls the report object out of free-form model output.
//!
//! The model is asked to answer with `const reportData = { ... }`, but what
//! comes back is only *near* JSON: keys are often bare identifiers and lists
//! end with a dangling comma. Extraction therefore runs in two stages:
//!
//! 1. strict `serde_json` decode of the candidate span;
//! 2. if that fails, every [`RepairPass`] is applied in order and the
//!    decode is retried once.
//!
//! The candidate span runs from the first `{` after the declaration marker
//! (or the start of the text when there is no marker) to the *last* `}` in
//! the text. Nested objects are not part of the report schema, so this
//! framing is enough, but several unrelated objects in one response are not
//! told apart.

use log::debug;
use serde_json::{Map, Value};

use crate::error::{AuditError, Result};
use crate::schema::{Report, REPORT_FIELDS};

/// Name the prompt template declares the object under.
pub const DECLARATION_MARKER: &str = "reportData";

/// A bounded text rewrite applied before the tolerant decode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairPass {
    /// `{client: "x"}` becomes `{"client": "x"}`.
    QuoteBareKeys,
    /// `["a", "b",]` becomes `["a", "b"]`.
    StripTrailingCommas,
}

pub const REPAIR_PASSES: [RepairPass; 2] =
    [RepairPass::QuoteBareKeys, RepairPass::StripTrailingCommas];

impl RepairPass {
    pub fn apply(&self, text: &str) -> String {
        match self {
            RepairPass::QuoteBareKeys => quote_bare_keys(text),
            RepairPass::StripTrailingCommas => strip_trailing_commas(text),
        }
    }
}

/// Extracts and validates the report from model output.
pub fn extract_report(text: &str) -> Result<Report> {
    let object = extract_object(text)?;
    serde_json::from_value(Value::Object(object))
        .map_err(|e| AuditError::ReportParse(format!("Report has unexpected shape: {e}")))
}

/// Extracts the raw field map, requiring every report key to be present and non-null.
pub fn extract_object(text: &str) -> Result<Map<String, Value>> {
    let candidate = locate_candidate(text)
        .ok_or_else(|| AuditError::ReportParse("No object literal found in response".into()))?;

    let Value::Object(object) = decode_candidate(candidate)? else {
        return Err(AuditError::ReportParse("Decoded value is not an object".into()));
    };

    let missing: Vec<&str> = REPORT_FIELDS
        .iter()
        .copied()
        .filter(|field| object.get(*field).map_or(true, Value::is_null))
        .collect();

    if !missing.is_empty() {
        return Err(AuditError::ReportParse(format!(
            "Report is missing fields: {}",
            missing.join(", ")
        )));
    }

    Ok(object)
}

/// The span from the first relevant `{` to the last `}`, inclusive.
pub fn locate_candidate(text: &str) -> Option<&str> {
    let search_from = text
        .find(DECLARATION_MARKER)
        .map(|idx| idx + DECLARATION_MARKER.len())
        .unwrap_or(0);

    let start = text[search_from..].find('{')? + search_from;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }

    Some(&text[start..=end])
}

/// Strict decode, then one retry after all repair passes.
pub fn decode_candidate(candidate: &str) -> Result<Value> {
    let strict_err = match serde_json::from_str::<Value>(candidate) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    debug!("Strict decode failed ({strict_err}), applying repair passes");

    let repaired = REPAIR_PASSES
        .iter()
        .fold(candidate.to_string(), |text, pass| pass.apply(&text));

    serde_json::from_str::<Value>(&repaired).map_err(|e| {
        AuditError::ReportParse(format!(
            "Strict decode failed ({strict_err}); repaired decode failed ({e})"
        ))
    })
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn quote_bare_keys(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_string = false;
    let mut escaped = false;
    let mut prev_significant: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
                prev_significant = Some('"');
            }
            i += 1;
            continue;
        }

        if c == '"' {
            in_string = true;
            out.push(c);
            i += 1;
            continue;
        }

        if is_ident_start(c) && matches!(prev_significant, Some('{') | Some(',')) {
            let start = i;
            while i < chars.len() && is_ident_char(chars[i]) {
                i += 1;
            }
            let ident: String = chars[start..i].iter().collect();

            let mut next = i;
            while next < chars.len() && chars[next].is_whitespace() {
                next += 1;
            }

            if next < chars.len() && chars[next] == ':' {
                out.push('"');
                out.push_str(&ident);
                out.push('"');
            } else {
                out.push_str(&ident);
            }
            prev_significant = ident.chars().last();
            continue;
        }

        if !c.is_whitespace() {
            prev_significant = Some(c);
        }
        out.push(c);
        i += 1;
    }

    out
}

fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let closes = chars[i + 1..]
                    .iter()
                    .find(|next| !next.is_whitespace())
                    .is_some_and(|next| *next == '}' || *next == ']');
                if !closes {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}
