//! Structured judgement returned by the reasoning provider.

use super::{Confidence, Severity};
use serde::{Deserialize, Serialize};

/// Classifier verdict for a single log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgement {
    /// Assessed severity.
    pub severity: Severity,
    /// Whether a developer should act on the record.
    pub is_actionable: bool,
    /// One-line summary of the problem.
    pub summary: String,
    /// Probable root cause.
    pub root_cause: String,
    /// Suggested remediation.
    pub recommended_action: String,
    /// Classifier confidence.
    pub confidence: Confidence,
}
