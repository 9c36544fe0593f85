//! Task text derived from an analysed log record.

use crate::analysis::domain::ErrorAnalysis;
use crate::log_record::domain::{LogRecord, LogSource};
use crate::tag::domain::{TagDomainError, TagName};
use minijinja::Environment;
use serde_json::{Map, Value};
use thiserror::Error;

const TITLE_PREFIX: &str = "🐛";
const SUMMARY_TITLE_LIMIT: usize = 100;
const MESSAGE_TITLE_LIMIT: usize = 80;
const STACK_TRACE_LIMIT: usize = 2000;
const TRUNCATION_MARKER: &str = "... (truncated)";

const DESCRIPTION_TEMPLATE: &str = r"## 🐛 Automatically detected error

{{ summary }}

### Error details

| Field | Value |
|-------|-------|
| Severity | {{ severity }} |
| Source | {{ source }} |
| Level | {{ level }} |
| Logger | `{{ logger }}` |
| Timestamp | {{ timestamp }} |
| Confidence | {{ confidence }}% |

### AI analysis

**Summary:** {{ summary }}

**Root cause:** {{ root_cause }}

### Recommended actions

{{ recommended_action }}

### Original message

```
{{ message }}
```
{% if exception_type %}
### Exception details

**Type:** `{{ exception_type }}`

**Value:** {{ exception_value }}
{% if stack_trace %}
```
{{ stack_trace }}
```
{% endif %}{% endif %}
---

Log record: `{{ record_id }}` | Analysis: `{{ analysis_id }}`
";

/// Errors raised while rendering task text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The description template failed to render.
    #[error("failed to render task description: {reason}")]
    Template {
        /// Rendering failure detail.
        reason: String,
    },

    /// A generated tag name was rejected.
    #[error(transparent)]
    Tag(#[from] TagDomainError),
}

/// Builds the task title.
///
/// The analysis summary is preferred when it is short enough. Otherwise the
/// exception type is used, and failing that the head of the log message.
#[must_use]
pub fn task_title(analysis: &ErrorAnalysis, record: &LogRecord) -> String {
    let summary = analysis.judgement().summary.trim();
    if !summary.is_empty() && summary.chars().count() < SUMMARY_TITLE_LIMIT {
        return format!("{TITLE_PREFIX} {summary}");
    }

    let exception_type = record.exception().exception_type.trim();
    if !exception_type.is_empty() {
        return format!("{TITLE_PREFIX} Fix {exception_type}");
    }

    let (head, truncated) = truncate_chars(record.message().trim(), MESSAGE_TITLE_LIMIT);
    if truncated {
        format!("{TITLE_PREFIX} {head}…")
    } else {
        format!("{TITLE_PREFIX} {head}")
    }
}

/// Renders the Markdown task description.
///
/// # Errors
///
/// Returns [`RenderError::Template`] when rendering fails.
pub fn task_description(analysis: &ErrorAnalysis, record: &LogRecord) -> Result<String, RenderError> {
    let environment = Environment::new();
    let context = description_context(analysis, record);
    environment
        .render_str(DESCRIPTION_TEMPLATE, context)
        .map_err(|error| RenderError::Template {
            reason: error.to_string(),
        })
}

/// Derives the tags attached to a generated task.
///
/// Every task carries `bug` and `auto-generated`. Urgent severities add
/// `urgent` and remote records add `sentry`.
///
/// # Errors
///
/// Returns [`RenderError::Tag`] when a tag name is rejected.
pub fn task_tags(analysis: &ErrorAnalysis, record: &LogRecord) -> Result<Vec<TagName>, RenderError> {
    let mut names = vec!["bug", "auto-generated"];
    if analysis.judgement().severity.is_urgent() {
        names.push("urgent");
    }
    if record.source() == LogSource::Remote {
        names.push("sentry");
    }
    names
        .into_iter()
        .map(|name| TagName::new(name).map_err(RenderError::from))
        .collect()
}

fn description_context(analysis: &ErrorAnalysis, record: &LogRecord) -> Map<String, Value> {
    let judgement = analysis.judgement();
    let exception = record.exception();
    let mut context = Map::new();

    let mut insert = |key: &str, value: String| {
        context.insert(key.to_owned(), Value::String(value));
    };
    insert("summary", judgement.summary.clone());
    insert("root_cause", judgement.root_cause.clone());
    insert("recommended_action", judgement.recommended_action.clone());
    insert("severity", judgement.severity.as_str().to_ascii_uppercase());
    insert("confidence", judgement.confidence.as_percent().to_string());
    insert("source", record.source().as_str().to_owned());
    insert("level", record.level().to_string());
    insert("logger", record.logger().to_owned());
    insert("timestamp", record.timestamp().to_rfc3339());
    insert("message", record.message().to_owned());
    insert("exception_type", exception.exception_type.clone());
    insert("exception_value", exception.exception_value.clone());
    insert("stack_trace", capped_stack_trace(&exception.stack_trace));
    insert("record_id", record.id().to_string());
    insert("analysis_id", analysis.id().to_string());
    context
}

fn capped_stack_trace(stack_trace: &str) -> String {
    let (head, truncated) = truncate_chars(stack_trace, STACK_TRACE_LIMIT);
    if truncated {
        format!("{head}\n{TRUNCATION_MARKER}")
    } else {
        head
    }
}

fn truncate_chars(text: &str, limit: usize) -> (String, bool) {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(limit).collect();
    (head, chars.next().is_some())
}
