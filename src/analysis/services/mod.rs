//! Application services for log record classification.

mod classifier;
mod prompt;

pub use classifier::{
    ClassifierError, ClassifierResult, ClassifierService, ClassifyOutcome, ClassifyReport,
};
pub use prompt::{JudgementError, SYSTEM_PROMPT, build_prompt, parse_judgement};
