//! Line diff via a longest-common-subsequence table.

use crate::types::{DiffHunk, DiffLine, DiffResult, DiffStats, LineKind};
use tracing::{debug, instrument};

/// Above this many lines on either side the table is skipped
pub const MAX_DIFF_LINES: usize = 1000;

/// Unchanged lines kept on each side of a change
pub const CONTEXT_LINES: usize = 3;

/// Diff two texts line by line.
#[instrument(skip_all, fields(old_len = old.len(), new_len = new.len()))]
pub fn calculate_diff(old: &str, new: &str) -> DiffResult {
    let old_lines: Vec<&str> = old.split('\n').collect();
    let new_lines: Vec<&str> = new.split('\n').collect();

    if old == new {
        return DiffResult {
            hunks: Vec::new(),
            stats: DiffStats {
                unchanged: old_lines.len(),
                ..DiffStats::default()
            },
            has_diff: false,
        };
    }

    if old_lines.len() > MAX_DIFF_LINES || new_lines.len() > MAX_DIFF_LINES {
        debug!(
            old_lines = old_lines.len(),
            new_lines = new_lines.len(),
            "input too large, replacing wholesale"
        );
        return wholesale_diff(&old_lines, &new_lines);
    }

    let table = lcs_table(&old_lines, &new_lines);
    let lines = backtrack(&old_lines, &new_lines, &table);
    let stats = stats(&lines);
    DiffResult {
        hunks: group_into_hunks(lines, CONTEXT_LINES),
        has_diff: stats.additions > 0 || stats.deletions > 0,
        stats,
    }
}

/// `table[i][j]` is the LCS length of `old[..i]` and `new[..j]`
fn lcs_table(old: &[&str], new: &[&str]) -> Vec<Vec<u32>> {
    let mut table = vec![vec![0u32; new.len() + 1]; old.len() + 1];
    for i in 1..=old.len() {
        for j in 1..=new.len() {
            table[i][j] = if old[i - 1] == new[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i - 1][j].max(table[i][j - 1])
            };
        }
    }
    table
}

/// Walk back from the bottom-right corner. Ties go to the insertion side.
fn backtrack(old: &[&str], new: &[&str], table: &[Vec<u32>]) -> Vec<DiffLine> {
    let mut lines = Vec::with_capacity(old.len().max(new.len()));
    let (mut i, mut j) = (old.len(), new.len());

    while i > 0 || j > 0 {
        if i > 0 && j > 0 && old[i - 1] == new[j - 1] {
            lines.push(DiffLine::unchanged(old[i - 1], i, j));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || table[i][j - 1] >= table[i - 1][j]) {
            lines.push(DiffLine::add(new[j - 1], j));
            j -= 1;
        } else {
            lines.push(DiffLine::remove(old[i - 1], i));
            i -= 1;
        }
    }

    lines.reverse();
    lines
}

fn stats(lines: &[DiffLine]) -> DiffStats {
    lines.iter().fold(DiffStats::default(), |mut stats, line| {
        match line.kind {
            LineKind::Add => stats.additions += 1,
            LineKind::Remove => stats.deletions += 1,
            LineKind::Unchanged => stats.unchanged += 1,
        }
        stats
    })
}

/// Cut the line list into hunks of changes plus `context` lines either
/// side. Changes separated by at most `2 * context` unchanged lines share
/// a hunk.
pub fn group_into_hunks(lines: Vec<DiffLine>, context: usize) -> Vec<DiffHunk> {
    let changes: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.is_change())
        .map(|(index, _)| index)
        .collect();
    let Some((&first, rest)) = changes.split_first() else {
        return Vec::new();
    };

    let last_index = lines.len() - 1;
    let mut ranges = Vec::new();
    let mut start = first.saturating_sub(context);
    let mut end = (first + context).min(last_index);
    let mut previous = first;

    for &index in rest {
        if index - previous > context * 2 + 1 {
            ranges.push((start, end));
            start = index.saturating_sub(context);
        }
        end = (index + context).min(last_index);
        previous = index;
    }
    ranges.push((start, end));

    ranges
        .into_iter()
        .map(|(start, end)| DiffHunk::from_lines(lines[start..=end].to_vec()))
        .collect()
}

/// Every old line removed, every new line added, in one hunk
fn wholesale_diff(old: &[&str], new: &[&str]) -> DiffResult {
    let lines: Vec<DiffLine> = old
        .iter()
        .enumerate()
        .map(|(i, content)| DiffLine::remove(content, i + 1))
        .chain(
            new.iter()
                .enumerate()
                .map(|(j, content)| DiffLine::add(content, j + 1)),
        )
        .collect();

    DiffResult {
        hunks: vec![DiffHunk::from_lines(lines)],
        stats: DiffStats {
            additions: new.len(),
            deletions: old.len(),
            unchanged: 0,
        },
        has_diff: true,
    }
}
