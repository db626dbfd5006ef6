//! Splits template source into text, output and tag segments.
//!
//! Handles `-` whitespace control on either delimiter and keeps the bodies
//! of `raw`, `comment` and `schema` blocks verbatim.

use crate::error::{ParseError, ParseResult};
use std::ops::Range;

/// Blocks whose body is kept as text instead of being scanned for tags
const VERBATIM_BLOCKS: [&str; 3] = ["raw", "comment", "schema"];

#[derive(Debug, Clone, PartialEq)]
pub enum SegmentKind<'src> {
    Text(&'src str),
    Output(&'src str),
    Tag { name: &'src str, markup: &'src str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment<'src> {
    pub kind: SegmentKind<'src>,
    pub span: Range<usize>,
    trim_before: bool,
    trim_after: bool,
}

impl<'src> Segment<'src> {
    pub fn text(text: &'src str, span: Range<usize>) -> Self {
        Self {
            kind: SegmentKind::Text(text),
            span,
            trim_before: false,
            trim_after: false,
        }
    }

    pub fn output(markup: &'src str, span: Range<usize>) -> Self {
        Self {
            kind: SegmentKind::Output(markup),
            span,
            trim_before: false,
            trim_after: false,
        }
    }

    pub fn tag(name: &'src str, markup: &'src str, span: Range<usize>) -> Self {
        Self {
            kind: SegmentKind::Tag { name, markup },
            span,
            trim_before: false,
            trim_after: false,
        }
    }
}

struct Delimited<'src> {
    inner: &'src str,
    inner_start: usize,
    end: usize,
    trim_before: bool,
    trim_after: bool,
}

/// Read one `{{ }}` or `{% %}` starting at `open`.
fn read_delimited<'src>(
    source: &'src str,
    open: usize,
    closer: &str,
    expected: &str,
) -> ParseResult<Delimited<'src>> {
    let body_start = open + 2;
    let close = source[body_start..]
        .find(closer)
        .map(|offset| body_start + offset)
        .ok_or_else(|| ParseError::unexpected_eof(open, expected))?;

    let mut inner = &source[body_start..close];
    let mut inner_start = body_start;
    let trim_before = inner.starts_with('-');
    if trim_before {
        inner = &inner[1..];
        inner_start += 1;
    }
    let trim_after = inner.ends_with('-');
    if trim_after {
        inner = &inner[..inner.len() - 1];
    }

    Ok(Delimited {
        inner,
        inner_start,
        end: close + closer.len(),
        trim_before,
        trim_after,
    })
}

/// Split tag markup into its name and the remaining arguments.
pub fn split_tag(inner: &str) -> (&str, &str) {
    let trimmed = inner.trim_start();
    if let Some(rest) = trimmed.strip_prefix('#') {
        return ("#", rest.trim());
    }
    match trimmed.find(|c: char| c.is_whitespace()) {
        Some(idx) => (&trimmed[..idx], trimmed[idx..].trim()),
        None => (trimmed.trim_end(), ""),
    }
}

fn next_delimiter(source: &str, from: usize) -> Option<usize> {
    let rest = &source[from..];
    let output = rest.find("{{");
    let tag = rest.find("{%");
    match (output, tag) {
        (Some(a), Some(b)) => Some(from + a.min(b)),
        (Some(a), None) => Some(from + a),
        (None, Some(b)) => Some(from + b),
        (None, None) => None,
    }
}

/// Find the tag that closes a verbatim block. Comments nest; `raw` ends at
/// the first `endraw`. Returns the body end and the closing tag.
fn find_verbatim_end<'src>(
    source: &'src str,
    from: usize,
    block: &str,
) -> ParseResult<(usize, Delimited<'src>)> {
    let closer = format!("end{}", block);
    let mut depth = 0usize;
    let mut cursor = from;

    while let Some(open) = source[cursor..].find("{%").map(|offset| cursor + offset) {
        let delimited = read_delimited(source, open, "%}", "'%}'")?;
        let (name, _) = split_tag(delimited.inner);
        if name == block && block == "comment" {
            depth += 1;
        } else if name == closer {
            if depth == 0 {
                return Ok((open, delimited));
            }
            depth -= 1;
        }
        cursor = delimited.end;
    }

    Err(ParseError::unclosed_tag(from, block))
}

/// Scan a template into segments with whitespace control applied.
pub fn scan(source: &str) -> ParseResult<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut pos = 0;

    while pos < source.len() {
        let Some(open) = next_delimiter(source, pos) else {
            segments.push(Segment::text(&source[pos..], pos..source.len()));
            break;
        };

        if open > pos {
            segments.push(Segment::text(&source[pos..open], pos..open));
        }

        if source[open..].starts_with("{{") {
            let delimited = read_delimited(source, open, "}}", "'}}'")?;
            let mut segment = Segment::output(delimited.inner.trim(), open..delimited.end);
            segment.trim_before = delimited.trim_before;
            segment.trim_after = delimited.trim_after;
            segments.push(segment);
            pos = delimited.end;
            continue;
        }

        let delimited = read_delimited(source, open, "%}", "'%}'")?;
        let (name, markup) = split_tag(delimited.inner);
        let mut segment = Segment::tag(name, markup, open..delimited.end);
        segment.trim_before = delimited.trim_before;
        segment.trim_after = delimited.trim_after;
        segments.push(segment);
        pos = delimited.end;

        if VERBATIM_BLOCKS.contains(&name) {
            let (body_end, closing) = find_verbatim_end(source, pos, name)
                .map_err(|_| ParseError::unclosed_tag(open, name))?;
            if body_end > pos {
                segments.push(Segment::text(&source[pos..body_end], pos..body_end));
            }
            let (closing_name, closing_markup) = split_tag(closing.inner);
            let mut end_segment =
                Segment::tag(closing_name, closing_markup, body_end..closing.end);
            end_segment.trim_before = closing.trim_before;
            end_segment.trim_after = closing.trim_after;
            segments.push(end_segment);
            pos = closing.end;
        }
    }

    apply_whitespace_control(&mut segments);
    Ok(segments)
}

fn apply_whitespace_control(segments: &mut [Segment<'_>]) {
    for idx in 0..segments.len() {
        let SegmentKind::Text(text) = segments[idx].kind else {
            continue;
        };

        let mut trimmed = text;
        if idx > 0 && segments[idx - 1].trim_after {
            trimmed = trimmed.trim_start();
        }
        if idx + 1 < segments.len() && segments[idx + 1].trim_before {
            trimmed = trimmed.trim_end();
        }
        segments[idx].kind = SegmentKind::Text(trimmed);
    }
}
