//! Prompt construction and reply parsing for the classifier.

use crate::analysis::domain::{Confidence, Judgement, Severity};
use crate::log_record::domain::LogRecord;
use serde_json::{Map, Value};
use thiserror::Error;

/// System instruction sent with every classification request.
pub const SYSTEM_PROMPT: &str = "You are a senior site reliability engineer triaging \
application errors. Answer only with a single JSON object and no prose.";

const MESSAGE_LIMIT: usize = 500;
const STACK_TRACE_LIMIT: usize = 1000;
const TRUNCATION_MARKER: &str = "... (truncated)";
const RESPONSE_FORMAT: &str = "Respond with a JSON object with exactly these fields:
- severity: one of \"low\", \"medium\", \"high\", \"critical\"
- is_actionable: boolean, true if a developer should act on it
- summary: one sentence describing the problem
- root_cause: the most likely cause
- recommended_action: what a developer should do
- confidence: number between 0 and 1";

/// Errors raised while interpreting a provider reply.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JudgementError {
    /// The reply is not a JSON object.
    #[error("reply is not a JSON object: {0}")]
    InvalidJson(String),

    /// A required field is absent or has the wrong type.
    #[error("reply field '{0}' is missing or has the wrong type")]
    MissingField(&'static str),

    /// A field has an out-of-range value.
    #[error("reply field '{field}' is invalid: {reason}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Validation failure.
        reason: String,
    },
}

/// Builds the user prompt describing `record`.
#[must_use]
pub fn build_prompt(record: &LogRecord) -> String {
    let (message, _) = truncate_chars(record.message(), MESSAGE_LIMIT);
    let mut lines = vec![
        "Analyze the following log entry.".to_owned(),
        String::new(),
        format!("Level: {}", record.level()),
        format!("Logger: {}", record.logger()),
        format!("Timestamp: {}", record.timestamp().to_rfc3339()),
        format!("Message: {message}"),
    ];

    let exception = record.exception();
    if !exception.exception_type.is_empty() {
        lines.push(format!(
            "Exception: {}: {}",
            exception.exception_type, exception.exception_value
        ));
    }
    if !exception.stack_trace.is_empty() {
        let (trace, truncated) = truncate_chars(&exception.stack_trace, STACK_TRACE_LIMIT);
        lines.push("Stack trace:".to_owned());
        lines.push(trace);
        if truncated {
            lines.push(TRUNCATION_MARKER.to_owned());
        }
    }

    lines.push(String::new());
    lines.push(RESPONSE_FORMAT.to_owned());
    lines.join("\n")
}

/// Parses a provider reply into a [`Judgement`].
///
/// Markdown code fences around the JSON object, with or without a language
/// tag, are ignored.
///
/// # Errors
///
/// Returns [`JudgementError`] when the reply is not a JSON object, a field
/// is missing or mistyped, the severity is unknown, or the confidence lies
/// outside `[0, 1]`.
pub fn parse_judgement(reply: &str) -> Result<Judgement, JudgementError> {
    let body = strip_code_fence(reply);
    let value: Value =
        serde_json::from_str(body).map_err(|err| JudgementError::InvalidJson(err.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(JudgementError::InvalidJson(
            "top-level value is not an object".to_owned(),
        ));
    };

    let severity = Severity::try_from(string_field(&fields, "severity")?).map_err(|err| {
        JudgementError::InvalidField {
            field: "severity",
            reason: err.to_string(),
        }
    })?;
    let is_actionable = fields
        .get("is_actionable")
        .and_then(Value::as_bool)
        .ok_or(JudgementError::MissingField("is_actionable"))?;
    let raw_confidence = fields
        .get("confidence")
        .and_then(Value::as_f64)
        .ok_or(JudgementError::MissingField("confidence"))?;
    let confidence =
        Confidence::new(raw_confidence).map_err(|err| JudgementError::InvalidField {
            field: "confidence",
            reason: err.to_string(),
        })?;

    Ok(Judgement {
        severity,
        is_actionable,
        summary: string_field(&fields, "summary")?.trim().to_owned(),
        root_cause: string_field(&fields, "root_cause")?.trim().to_owned(),
        recommended_action: string_field(&fields, "recommended_action")?.trim().to_owned(),
        confidence,
    })
}

fn string_field<'a>(
    fields: &'a Map<String, Value>,
    name: &'static str,
) -> Result<&'a str, JudgementError> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .ok_or(JudgementError::MissingField(name))
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(opened) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = opened.strip_suffix("```").unwrap_or(opened);
    let tag_len = inner
        .find(|ch: char| !ch.is_ascii_alphanumeric())
        .unwrap_or(inner.len());
    inner.get(tag_len..).unwrap_or(inner).trim()
}

fn truncate_chars(text: &str, limit: usize) -> (String, bool) {
    let mut chars = text.chars();
    let kept: String = chars.by_ref().take(limit).collect();
    (kept, chars.next().is_some())
}
