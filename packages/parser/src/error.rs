//! Error types for the template parser

use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse error with the byte offset it was found at
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token at {pos}: expected {expected}, found {found}")]
    UnexpectedToken {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of input at {pos}: expected {expected}")]
    UnexpectedEof { pos: usize, expected: String },

    #[error("Tag '{tag}' opened at {pos} was never closed (expected '{{% end{tag} %}}')")]
    UnclosedTag { pos: usize, tag: String },

    #[error("Unknown tag '{tag}' at {pos}")]
    UnknownTag { pos: usize, tag: String },

    #[error("Unexpected '{tag}' at {pos}: no open block accepts it")]
    UnexpectedTag { pos: usize, tag: String },

    #[error("Invalid syntax at {pos}: {message}")]
    InvalidSyntax { pos: usize, message: String },

    #[error("Lexer error at {pos}: unexpected '{found}'")]
    LexerError { pos: usize, found: String },
}

impl ParseError {
    pub fn unexpected_token(pos: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::UnexpectedToken {
            pos,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(pos: usize, expected: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            pos,
            expected: expected.into(),
        }
    }

    pub fn unclosed_tag(pos: usize, tag: impl Into<String>) -> Self {
        Self::UnclosedTag { pos, tag: tag.into() }
    }

    pub fn unknown_tag(pos: usize, tag: impl Into<String>) -> Self {
        Self::UnknownTag { pos, tag: tag.into() }
    }

    pub fn unexpected_tag(pos: usize, tag: impl Into<String>) -> Self {
        Self::UnexpectedTag { pos, tag: tag.into() }
    }

    pub fn invalid_syntax(pos: usize, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            pos,
            message: message.into(),
        }
    }

    pub fn lexer_error(pos: usize, found: impl Into<String>) -> Self {
        Self::LexerError {
            pos,
            found: found.into(),
        }
    }

    /// Byte offset in the template source
    pub fn pos(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { pos, .. }
            | ParseError::UnexpectedEof { pos, .. }
            | ParseError::UnclosedTag { pos, .. }
            | ParseError::UnknownTag { pos, .. }
            | ParseError::UnexpectedTag { pos, .. }
            | ParseError::InvalidSyntax { pos, .. }
            | ParseError::LexerError { pos, .. } => *pos,
        }
    }

    /// Name of the tag the error is about, if any
    pub fn tag(&self) -> Option<&str> {
        match self {
            ParseError::UnclosedTag { tag, .. }
            | ParseError::UnknownTag { tag, .. }
            | ParseError::UnexpectedTag { tag, .. } => Some(tag),
            _ => None,
        }
    }
}

/// Pretty-print an error with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_error(source: &str, filename: &str, error: &ParseError) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let start = error.pos().min(source.len());
    let end = (start + 1).min(source.len()).max(start);

    let label = match error {
        ParseError::UnexpectedToken { expected, .. } | ParseError::UnexpectedEof { expected, .. } => {
            format!("expected {}", expected)
        }
        ParseError::UnclosedTag { tag, .. } => format!("'{}' opened here", tag),
        ParseError::UnknownTag { tag, .. } => format!("'{}' is not a known tag", tag),
        ParseError::UnexpectedTag { tag, .. } => format!("stray '{}'", tag),
        ParseError::InvalidSyntax { message, .. } => message.clone(),
        ParseError::LexerError { .. } => "unexpected character".to_string(),
    };

    let mut output = Vec::new();
    let written = Report::build(ReportKind::Error, filename, start)
        .with_message(error.to_string())
        .with_label(
            Label::new((filename, start..end))
                .with_color(Color::Red)
                .with_message(label),
        )
        .finish()
        .write((filename, Source::from(source)), &mut output);

    match written {
        Ok(()) => String::from_utf8(output).unwrap_or_else(|_| error.to_string()),
        Err(_) => error.to_string(),
    }
}
