//! Normalisation of raw tracker events into log records.
//!
//! Events arrive as loosely structured JSON. Every accessor here tolerates
//! missing or mistyped fields; a structurally unusable event yields `None`.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::Value;

use crate::log_record::domain::{ExceptionDetails, LogLevel, LogRecord, NewLogRecord};

/// Converts one raw event into a remote log record.
///
/// Returns `None` when the event is not an object or lacks an event id or a
/// parseable `dateCreated` timestamp. Callers must check before persisting.
#[must_use]
pub fn normalize_event(event: &Value, issue_id: Option<&str>, clock: &impl Clock) -> Option<LogRecord> {
    let object = event.as_object()?;

    let event_id = ["eventID", "id"]
        .iter()
        .find_map(|key| non_empty_str(object.get(*key)))?;
    let timestamp = non_empty_str(object.get("dateCreated"))
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))?;

    let level = non_empty_str(object.get("level"))
        .or_else(|| tag_value(event, "level"))
        .map_or(LogLevel::Error, LogLevel::from_remote);
    let logger = non_empty_str(object.get("logger"))
        .or_else(|| tag_value(event, "logger"))
        .unwrap_or("unknown");
    let message = event
        .pointer("/metadata/title")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .or_else(|| non_empty_str(object.get("message")))
        .or_else(|| non_empty_str(object.get("title")))
        .unwrap_or_default();

    let mut data = NewLogRecord::remote(timestamp, level, logger, message, event_id)
        .with_exception(exception_details(event));
    if let Some(group) = non_empty_str(object.get("groupID")).or(issue_id) {
        data = data.with_remote_issue_id(group);
    }

    LogRecord::new(data, clock).ok()
}

/// Renders stack frames in Python traceback style.
///
/// Each frame becomes `File "<name>", line <n>, in <function>` followed by
/// its source context lines, indented.
#[must_use]
pub fn render_frames(frames: &[Value]) -> String {
    let mut lines = Vec::new();
    for frame in frames {
        let filename = ["filename", "absPath", "module"]
            .iter()
            .find_map(|key| non_empty_str(frame.get(*key)))
            .unwrap_or("?");
        let line_no = frame
            .get("lineNo")
            .and_then(Value::as_u64)
            .map_or_else(|| "?".to_owned(), |number| number.to_string());
        let function = non_empty_str(frame.get("function")).unwrap_or("?");
        lines.push(format!(
            "File \"{filename}\", line {line_no}, in {function}"
        ));

        let context = frame
            .get("context")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for entry in context {
            if let Some(code) = entry.get(1).and_then(Value::as_str) {
                lines.push(format!("    {code}"));
            }
        }
    }
    lines.join("\n")
}

fn exception_details(event: &Value) -> ExceptionDetails {
    let Some(first) = first_exception(event) else {
        return ExceptionDetails::default();
    };
    let frames = first
        .pointer("/stacktrace/frames")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    ExceptionDetails {
        exception_type: non_empty_str(first.get("type")).unwrap_or_default().to_owned(),
        exception_value: non_empty_str(first.get("value")).unwrap_or_default().to_owned(),
        stack_trace: render_frames(frames),
    }
}

fn first_exception(event: &Value) -> Option<&Value> {
    event
        .get("entries")
        .and_then(Value::as_array)?
        .iter()
        .find(|entry| entry.get("type").and_then(Value::as_str) == Some("exception"))?
        .pointer("/data/values")
        .and_then(Value::as_array)?
        .first()
}

fn tag_value<'a>(event: &'a Value, key: &str) -> Option<&'a str> {
    event
        .get("tags")
        .and_then(Value::as_array)?
        .iter()
        .find(|tag| tag.get("key").and_then(Value::as_str) == Some(key))
        .and_then(|tag| non_empty_str(tag.get("value")))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}
