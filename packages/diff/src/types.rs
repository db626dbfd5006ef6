use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Add,
    Remove,
    Unchanged,
}

impl LineKind {
    /// Unified-diff prefix character
    pub fn marker(self) -> char {
        match self {
            LineKind::Add => '+',
            LineKind::Remove => '-',
            LineKind::Unchanged => ' ',
        }
    }
}

/// One classified line. Added lines have no old number, removed lines no
/// new number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffLine {
    #[serde(rename = "type")]
    pub kind: LineKind,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_line_number: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_line_number: Option<usize>,
}

impl DiffLine {
    pub fn unchanged(content: &str, old: usize, new: usize) -> Self {
        Self {
            kind: LineKind::Unchanged,
            content: content.to_string(),
            old_line_number: Some(old),
            new_line_number: Some(new),
        }
    }

    pub fn add(content: &str, new: usize) -> Self {
        Self {
            kind: LineKind::Add,
            content: content.to_string(),
            old_line_number: None,
            new_line_number: Some(new),
        }
    }

    pub fn remove(content: &str, old: usize) -> Self {
        Self {
            kind: LineKind::Remove,
            content: content.to_string(),
            old_line_number: Some(old),
            new_line_number: None,
        }
    }

    pub fn is_change(&self) -> bool {
        self.kind != LineKind::Unchanged
    }
}

/// Changed lines with their surrounding context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffHunk {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    /// Build a hunk, deriving the ranges from the lines it holds
    pub fn from_lines(lines: Vec<DiffLine>) -> Self {
        let old_count = lines.iter().filter(|l| l.kind != LineKind::Add).count();
        let new_count = lines.iter().filter(|l| l.kind != LineKind::Remove).count();
        let old_start = lines.iter().find_map(|l| l.old_line_number).unwrap_or(1);
        let new_start = lines.iter().find_map(|l| l.new_line_number).unwrap_or(1);
        Self {
            old_start,
            old_count,
            new_start,
            new_count,
            lines,
        }
    }

    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_count, self.new_start, self.new_count
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub additions: usize,
    pub deletions: usize,
    pub unchanged: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub hunks: Vec<DiffHunk>,
    pub stats: DiffStats,
    pub has_diff: bool,
}

impl DiffResult {
    /// Unified-diff text: one header per hunk, then its prefixed lines
    pub fn to_unified(&self) -> String {
        let mut out = String::new();
        for hunk in &self.hunks {
            let _ = writeln!(out, "{}", hunk.header());
            for line in &hunk.lines {
                let _ = writeln!(out, "{}{}", line.kind.marker(), line.content);
            }
        }
        out
    }
}
