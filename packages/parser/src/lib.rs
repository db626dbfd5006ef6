//! Parser for Liquid-style section templates.
//!
//! Source is scanned into text, output and tag segments, then tag markup is
//! tokenized with logos and parsed by hand into an AST.

pub mod ast;
pub mod error;
pub mod expression;
pub mod parser;
pub mod scanner;
pub mod tokenizer;

pub use ast::*;
pub use error::{ParseError, ParseResult};
#[cfg(feature = "pretty-errors")]
pub use error::format_error;
pub use parser::{parse, Parser};
pub use tokenizer::{tokenize, Token};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text() {
        let template = parse("<p>hello</p>").unwrap();
        assert_eq!(template.nodes, vec![Node::Text("<p>hello</p>".to_string())]);
    }
}
