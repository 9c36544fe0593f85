//! Application services turning error analyses into tasks.

mod materializer;
mod render;

pub use materializer::{
    MaterializeError, MaterializeOutcome, MaterializePolicy, MaterializeReport,
    MaterializeResult, MaterializerService,
};
pub use render::{RenderError, task_description, task_tags, task_title};
