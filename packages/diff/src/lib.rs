//! Line-level text diff for comparing two versions of a template.

mod engine;
mod types;

pub use engine::{calculate_diff, group_into_hunks, CONTEXT_LINES, MAX_DIFF_LINES};
pub use types::{DiffHunk, DiffLine, DiffResult, DiffStats, LineKind};
