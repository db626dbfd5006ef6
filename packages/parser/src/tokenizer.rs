use logos::Logos;
use std::fmt;

/// Tokens inside `{{ ... }}` and `{% ... %}` markup
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token<'src> {
    // Identifiers may carry dashes and a trailing '?', as in `empty?`
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*\??", |lex| lex.slice())]
    Ident(&'src str),

    #[regex(r#""[^"]*""#, |lex| lex.slice())]
    #[regex(r"'[^']*'", |lex| lex.slice())]
    String(&'src str),

    #[regex(r"-?[0-9]+", |lex| lex.slice())]
    Integer(&'src str),

    #[regex(r"-?[0-9]+\.[0-9]+", |lex| lex.slice())]
    Float(&'src str),

    #[token("==")]
    Eq,

    #[token("!=")]
    #[token("<>")]
    NotEq,

    #[token("<=")]
    LtEq,

    #[token(">=")]
    GtEq,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("=")]
    Assign,

    #[token("|")]
    Pipe,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token("..")]
    DotDot,

    #[token(".")]
    Dot,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,
}

impl<'src> Token<'src> {
    /// String literal contents without the surrounding quotes
    pub fn unquote(raw: &str) -> &str {
        raw.get(1..raw.len().saturating_sub(1)).unwrap_or("")
    }
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::String(s) => write!(f, "string {}", s),
            Token::Integer(n) | Token::Float(n) => write!(f, "number {}", n),
            Token::Eq => write!(f, "=="),
            Token::NotEq => write!(f, "!="),
            Token::LtEq => write!(f, "<="),
            Token::GtEq => write!(f, ">="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Assign => write!(f, "="),
            Token::Pipe => write!(f, "|"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::DotDot => write!(f, ".."),
            Token::Dot => write!(f, "."),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

/// Tokenize markup, reporting the offset of the first character no token
/// accepts. `base` is added to every span so offsets point into the
/// whole template.
pub fn tokenize(
    markup: &str,
    base: usize,
) -> Result<Vec<(Token<'_>, std::ops::Range<usize>)>, (usize, String)> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(markup);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => tokens.push((token, base + span.start..base + span.end)),
            Err(()) => return Err((base + span.start, lexer.slice().to_string())),
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(markup: &str) -> Vec<Token<'_>> {
        tokenize(markup, 0).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_paths_and_filters() {
        let tokens = kinds("product.title | upcase");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("product"),
                Token::Dot,
                Token::Ident("title"),
                Token::Pipe,
                Token::Ident("upcase"),
            ]
        );
    }

    #[test]
    fn test_range_literal() {
        let tokens = kinds("(1..5)");
        assert_eq!(
            tokens,
            vec![
                Token::LParen,
                Token::Integer("1"),
                Token::DotDot,
                Token::Integer("5"),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_strings_and_numbers() {
        let tokens = kinds(r#"'single' "double" 42 3.14 -2"#);
        assert_eq!(tokens[0], Token::String("'single'"));
        assert_eq!(tokens[1], Token::String("\"double\""));
        assert_eq!(tokens[2], Token::Integer("42"));
        assert_eq!(tokens[3], Token::Float("3.14"));
        assert_eq!(tokens[4], Token::Integer("-2"));
        assert_eq!(Token::unquote("'single'"), "single");
    }

    #[test]
    fn test_comparison_operators() {
        let tokens = kinds("a == b != c <> d <= e >= f < g > h");
        assert!(tokens.contains(&Token::Eq));
        assert_eq!(tokens.iter().filter(|t| **t == Token::NotEq).count(), 2);
        assert!(tokens.contains(&Token::LtEq));
        assert!(tokens.contains(&Token::GtEq));
    }

    #[test]
    fn test_offsets_are_shifted_by_base() {
        let tokens = tokenize("x", 10).unwrap();
        assert_eq!(tokens[0].1, 10..11);
    }

    #[test]
    fn test_reports_unknown_character() {
        let err = tokenize("a ^ b", 3).unwrap_err();
        assert_eq!(err.0, 5);
    }
}
