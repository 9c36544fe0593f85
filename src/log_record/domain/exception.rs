//! Association of trailing stack-trace lines with an error line.

use super::{ExceptionDetails, is_log_line};

/// Collects the exception block that follows the line at `index`.
///
/// Lines after `index` are gathered until the end of input or the next line
/// matching the log grammar, which is left for the caller. Blank lines are
/// skipped. The collected lines form the stack trace.
///
/// The exception type and value come from the first collected line that
/// contains a colon and does not start with `File`. That heuristic misfires
/// on incidental colons; callers must tolerate empty or odd values.
#[must_use]
pub fn extract_exception<S: AsRef<str>>(lines: &[S], index: usize) -> ExceptionDetails {
    let collected: Vec<&str> = lines
        .iter()
        .skip(index.saturating_add(1))
        .map(AsRef::as_ref)
        .take_while(|line| !is_log_line(line))
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect();

    if index >= lines.len() || collected.is_empty() {
        return ExceptionDetails::default();
    }

    let (exception_type, exception_value) = collected
        .iter()
        .map(|line| line.trim())
        .find(|line| line.contains(':') && !line.starts_with("File"))
        .and_then(|line| line.split_once(':'))
        .map(|(kind, value)| (kind.trim().to_owned(), value.trim().to_owned()))
        .unwrap_or_default();

    ExceptionDetails {
        exception_type,
        exception_value,
        stack_trace: collected.join("\n"),
    }
}
