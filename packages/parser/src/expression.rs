//! Recursive-descent parser for tag and output markup.

use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::tokenizer::{tokenize, Token};
use std::ops::Range;

pub struct ExprParser<'src> {
    tokens: Vec<(Token<'src>, Range<usize>)>,
    pos: usize,
    end: usize,
}

impl<'src> ExprParser<'src> {
    /// `base` is the byte offset of `markup` within the template.
    pub fn new(markup: &'src str, base: usize) -> ParseResult<Self> {
        let tokens = tokenize(markup, base)
            .map_err(|(pos, found)| ParseError::lexer_error(pos, found))?;
        Ok(Self {
            tokens,
            pos: 0,
            end: base + markup.len(),
        })
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn peek_ahead(&self, offset: usize) -> Option<&Token<'src>> {
        self.tokens.get(self.pos + offset).map(|(token, _)| token)
    }

    fn advance(&mut self) -> Option<Token<'src>> {
        let token = self.tokens.get(self.pos).map(|(token, _)| token.clone());
        self.pos += 1;
        token
    }

    fn peek_pos(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.start)
            .unwrap_or(self.end)
    }

    fn last_end(&self) -> usize {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|(_, span)| span.end)
            .unwrap_or(self.end)
    }

    fn found(&self) -> String {
        self.peek()
            .map(|token| token.to_string())
            .unwrap_or_else(|| "end of markup".to_string())
    }

    fn check(&self, token: &Token) -> bool {
        self.peek()
            .map(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
            .unwrap_or(false)
    }

    pub fn match_token(&mut self, token: Token) -> bool {
        if self.check(&token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume an identifier with exactly this text.
    pub fn match_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(s)) if *s == keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, token: Token) -> ParseResult<()> {
        if self.check(&token) {
            self.advance();
            Ok(())
        } else if self.is_at_end() {
            Err(ParseError::unexpected_eof(self.peek_pos(), format!("'{}'", token)))
        } else {
            Err(ParseError::unexpected_token(
                self.peek_pos(),
                format!("'{}'", token),
                self.found(),
            ))
        }
    }

    pub fn expect_keyword(&mut self, keyword: &str) -> ParseResult<()> {
        if self.match_keyword(keyword) {
            Ok(())
        } else {
            Err(ParseError::unexpected_token(
                self.peek_pos(),
                format!("'{}'", keyword),
                self.found(),
            ))
        }
    }

    pub fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(Token::Ident(s)) => {
                let name = s.to_string();
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::unexpected_token(
                self.peek_pos(),
                "identifier",
                self.found(),
            )),
        }
    }

    /// Identifier or quoted string, as used by `capture` and `cycle` groups.
    pub fn expect_name(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(Token::String(s)) => {
                let name = Token::unquote(s).to_string();
                self.advance();
                Ok(name)
            }
            _ => self.expect_ident(),
        }
    }

    pub fn expect_end(&self) -> ParseResult<()> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(ParseError::unexpected_token(
                self.peek_pos(),
                "end of markup",
                self.found(),
            ))
        }
    }

    /// `expr | filter: arg, key: value | ...`
    pub fn parse_filtered(&mut self) -> ParseResult<FilteredExpr> {
        let start = self.peek_pos();
        let expr = if self.is_at_end() {
            Expr::nil()
        } else {
            self.parse_expr()?
        };

        let mut filters = Vec::new();
        while self.match_token(Token::Pipe) {
            filters.push(self.parse_filter_call()?);
        }

        Ok(FilteredExpr {
            expr,
            filters,
            span: Span::new(start, self.last_end()),
        })
    }

    fn parse_filter_call(&mut self) -> ParseResult<FilterCall> {
        let start = self.peek_pos();
        let name = self.expect_ident()?;
        let mut args = Vec::new();
        let mut kwargs = Vec::new();

        if self.match_token(Token::Colon) {
            loop {
                let is_keyword = matches!(self.peek(), Some(Token::Ident(_)))
                    && matches!(self.peek_ahead(1), Some(Token::Colon));
                if is_keyword {
                    let key = self.expect_ident()?;
                    self.expect(Token::Colon)?;
                    kwargs.push((key, self.parse_expr()?));
                } else {
                    args.push(self.parse_expr()?);
                }

                if !self.match_token(Token::Comma) {
                    break;
                }
            }
        }

        Ok(FilterCall {
            name,
            args,
            kwargs,
            span: Span::new(start, self.last_end()),
        })
    }

    pub fn parse_expr(&mut self) -> ParseResult<Expr> {
        let pos = self.peek_pos();
        match self.advance() {
            Some(Token::String(s)) => Ok(Expr::Literal(Literal::String(Token::unquote(s).to_string()))),
            Some(Token::Integer(n)) => n
                .parse::<i64>()
                .map(|v| Expr::Literal(Literal::Integer(v)))
                .map_err(|_| ParseError::invalid_syntax(pos, format!("integer out of range: {}", n))),
            Some(Token::Float(n)) => n
                .parse::<f64>()
                .map(|v| Expr::Literal(Literal::Float(v)))
                .map_err(|_| ParseError::invalid_syntax(pos, format!("invalid number: {}", n))),
            Some(Token::LParen) => {
                let start = self.parse_expr()?;
                self.expect(Token::DotDot)?;
                let end = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(Expr::Range {
                    start: Box::new(start),
                    end: Box::new(end),
                })
            }
            Some(Token::LBracket) => {
                // `["key"]` at the root reads a variable by computed name
                let key = self.parse_expr()?;
                self.expect(Token::RBracket)?;
                let root = match key {
                    Expr::Literal(Literal::String(s)) => s,
                    _ => return Err(ParseError::invalid_syntax(pos, "expected a quoted variable name")),
                };
                let path = self.parse_path_segments()?;
                Ok(Expr::Variable { root, path })
            }
            Some(Token::Ident(name)) => {
                let literal = match name {
                    "nil" | "null" => Some(Literal::Nil),
                    "true" => Some(Literal::Bool(true)),
                    "false" => Some(Literal::Bool(false)),
                    "empty" => Some(Literal::Empty),
                    "blank" => Some(Literal::Blank),
                    _ => None,
                };
                if let Some(literal) = literal {
                    if !self.check(&Token::Dot) && !self.check(&Token::LBracket) {
                        return Ok(Expr::Literal(literal));
                    }
                }
                let root = name.to_string();
                let path = self.parse_path_segments()?;
                Ok(Expr::Variable { root, path })
            }
            Some(token) => Err(ParseError::unexpected_token(pos, "expression", token.to_string())),
            None => Err(ParseError::unexpected_eof(pos, "expression")),
        }
    }

    fn parse_path_segments(&mut self) -> ParseResult<Vec<PathSegment>> {
        let mut path = Vec::new();
        loop {
            if self.match_token(Token::Dot) {
                path.push(PathSegment::Key(self.expect_ident()?));
            } else if self.match_token(Token::LBracket) {
                let index = self.parse_expr()?;
                self.expect(Token::RBracket)?;
                path.push(PathSegment::Index(index));
            } else {
                return Ok(path);
            }
        }
    }

    /// Conditions chain right to left: `a or b and c` is `a or (b and c)`.
    pub fn parse_condition(&mut self) -> ParseResult<Condition> {
        let left = self.parse_comparison()?;
        if self.match_keyword("and") {
            let right = self.parse_condition()?;
            Ok(Condition::And(Box::new(left), Box::new(right)))
        } else if self.match_keyword("or") {
            let right = self.parse_condition()?;
            Ok(Condition::Or(Box::new(left), Box::new(right)))
        } else {
            Ok(left)
        }
    }

    fn parse_comparison(&mut self) -> ParseResult<Condition> {
        let left = self.parse_expr()?;
        let op = match self.peek() {
            Some(Token::Eq) => CompareOp::Eq,
            Some(Token::NotEq) => CompareOp::NotEq,
            Some(Token::Lt) => CompareOp::Lt,
            Some(Token::Gt) => CompareOp::Gt,
            Some(Token::LtEq) => CompareOp::LtEq,
            Some(Token::GtEq) => CompareOp::GtEq,
            Some(Token::Ident("contains")) => CompareOp::Contains,
            _ => return Ok(Condition::Value(left)),
        };
        self.advance();
        let right = self.parse_expr()?;
        Ok(Condition::Compare { left, op, right })
    }

    /// Trailing `name: expr` and bare-word options of `for`/`tablerow`.
    pub fn parse_loop_options(&mut self) -> ParseResult<LoopOptions> {
        let mut options = LoopOptions::default();
        while !self.is_at_end() {
            // Options may be separated by commas
            if self.match_token(Token::Comma) {
                continue;
            }
            let pos = self.peek_pos();
            let name = self.expect_ident()?;
            if name == "reversed" {
                options.reversed = true;
                continue;
            }
            self.expect(Token::Colon)?;
            let value = self.parse_expr()?;
            match name.as_str() {
                "limit" => options.limit = Some(value),
                "offset" => options.offset = Some(value),
                "cols" => options.cols = Some(value),
                other => {
                    return Err(ParseError::invalid_syntax(pos, format!("unknown loop option '{}'", other)))
                }
            }
        }
        Ok(options)
    }
}

#[derive(Debug, Default)]
pub struct LoopOptions {
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
    pub cols: Option<Expr>,
    pub reversed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filtered(markup: &str) -> FilteredExpr {
        ExprParser::new(markup, 0).unwrap().parse_filtered().unwrap()
    }

    #[test]
    fn test_variable_path_with_index() {
        let expr = filtered("product.images[0].src").expr;
        assert_eq!(
            expr,
            Expr::Variable {
                root: "product".to_string(),
                path: vec![
                    PathSegment::Key("images".to_string()),
                    PathSegment::Index(Expr::Literal(Literal::Integer(0))),
                    PathSegment::Key("src".to_string()),
                ],
            }
        );
    }

    #[test]
    fn test_filter_positional_and_keyword_args() {
        let parsed = filtered("image | image_url: width: 300 | image_tag: 'x', class: 'hero'");
        assert_eq!(parsed.filters.len(), 2);
        assert_eq!(parsed.filters[0].name, "image_url");
        assert_eq!(parsed.filters[0].kwargs[0].0, "width");
        assert_eq!(parsed.filters[1].args.len(), 1);
        assert_eq!(parsed.filters[1].kwargs[0].0, "class");
    }

    #[test]
    fn test_literals() {
        assert_eq!(filtered("nil").expr, Expr::Literal(Literal::Nil));
        assert_eq!(filtered("true").expr, Expr::Literal(Literal::Bool(true)));
        assert_eq!(filtered("'a'").expr, Expr::Literal(Literal::String("a".to_string())));
        assert_eq!(filtered("1.5").expr, Expr::Literal(Literal::Float(1.5)));
        assert_eq!(filtered("empty").expr, Expr::Literal(Literal::Empty));
    }

    #[test]
    fn test_empty_markup_is_nil() {
        assert_eq!(filtered("").expr, Expr::nil());
    }

    #[test]
    fn test_condition_is_right_associative() {
        let condition = ExprParser::new("a or b and c", 0)
            .unwrap()
            .parse_condition()
            .unwrap();
        match condition {
            Condition::Or(left, right) => {
                assert_eq!(*left, Condition::Value(Expr::variable("a")));
                assert!(matches!(*right, Condition::And(_, _)));
            }
            other => panic!("unexpected condition {:?}", other),
        }
    }

    #[test]
    fn test_contains_comparison() {
        let condition = ExprParser::new("product.tags contains 'sale'", 0)
            .unwrap()
            .parse_condition()
            .unwrap();
        assert!(matches!(
            condition,
            Condition::Compare { op: CompareOp::Contains, .. }
        ));
    }

    #[test]
    fn test_loop_options() {
        let mut parser = ExprParser::new("limit: 2 offset: 1 reversed", 0).unwrap();
        let options = parser.parse_loop_options().unwrap();
        assert!(options.reversed);
        assert_eq!(options.limit, Some(Expr::Literal(Literal::Integer(2))));
        assert_eq!(options.offset, Some(Expr::Literal(Literal::Integer(1))));
    }
}
