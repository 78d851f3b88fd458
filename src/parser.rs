//! Validation of classification engine replies.
//!
//! The engine is a black box; its reply is checked at this boundary before
//! anything downstream trusts it. Two failure kinds are kept apart:
//!
//! - [`ParseError::ContractViolation`]: the reply is a JSON object but its
//!   label is missing or outside the taxonomy. Recovered by [`normalize`],
//!   which yields `Unclassified` and logs the raw label.
//! - [`ParseError::MalformedOutput`]: no JSON object could be read at all.
//!   This is an engine-level failure and is surfaced to the caller.

use serde_json::Value;
use thiserror::Error;

use crate::models::{ClassificationResult, ContentType};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("contract violation: {reason}")]
    ContractViolation {
        reason: String,
        /// Raw label as sent by the engine, when there was one.
        label: Option<String>,
        thought_process: Option<String>,
    },

    #[error("malformed classification output: {0}")]
    MalformedOutput(String),
}

/// Parse a raw reply into a validated result.
///
/// The reply may wrap the JSON object in prose or a fenced code block; the
/// outermost `{ ... }` span is decoded.
pub fn parse_payload(raw: &str) -> Result<ClassificationResult, ParseError> {
    let object_text = extract_object(raw)
        .ok_or_else(|| ParseError::MalformedOutput("no JSON object in reply".to_string()))?;

    let value: Value = serde_json::from_str(object_text)
        .map_err(|e| ParseError::MalformedOutput(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| ParseError::MalformedOutput("reply is not a JSON object".to_string()))?;

    let thought_process = object
        .get("ThoughtProcess")
        .and_then(Value::as_str)
        .map(str::to_string);

    let label = match object.get("ContentType") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(ParseError::ContractViolation {
                reason: "ContentType is not a string".to_string(),
                label: Some(other.to_string()),
                thought_process,
            })
        }
        None => {
            return Err(ParseError::ContractViolation {
                reason: "missing ContentType".to_string(),
                label: None,
                thought_process,
            })
        }
    };

    let content_type = match label.parse::<ContentType>() {
        Ok(ct) => ct,
        Err(e) => {
            return Err(ParseError::ContractViolation {
                reason: e.to_string(),
                label: Some(label),
                thought_process,
            })
        }
    };

    let thought_process = thought_process.ok_or_else(|| ParseError::ContractViolation {
        reason: "missing ThoughtProcess".to_string(),
        label: Some(label.clone()),
        thought_process: None,
    })?;

    Ok(ClassificationResult {
        thought_process,
        content_type,
    })
}

/// Parse a reply and fold contract violations into `Unclassified`.
///
/// The raw label only ever appears in the log, never in the result.
pub fn normalize(raw: &str) -> Result<ClassificationResult, ParseError> {
    match parse_payload(raw) {
        Ok(result) => Ok(result),
        Err(ParseError::ContractViolation {
            reason,
            label,
            thought_process,
        }) => {
            tracing::warn!(
                raw_label = label.as_deref().unwrap_or("<none>"),
                "classification reply violated the contract ({}); using Unclassified",
                reason
            );
            Ok(ClassificationResult {
                thought_process: thought_process.unwrap_or_default(),
                content_type: ContentType::Unclassified,
            })
        }
        Err(e) => Err(e),
    }
}

fn extract_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}
