use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::expression::ExprParser;
use crate::scanner::{scan, split_tag, Segment, SegmentKind};
use crate::tokenizer::Token;
use tracing::debug;

/// Tag that stopped a body: the end-tag or an intermediate like `else`
struct Boundary<'src> {
    name: &'src str,
    markup: &'src str,
    pos: usize,
}

/// Parser for section templates
pub struct Parser<'src> {
    source: &'src str,
    segments: Vec<Segment<'src>>,
    pos: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> ParseResult<Self> {
        Ok(Self {
            source,
            segments: scan(source)?,
            pos: 0,
        })
    }

    fn from_segments(source: &'src str, segments: Vec<Segment<'src>>) -> Self {
        Self {
            source,
            segments,
            pos: 0,
        }
    }

    /// Parse the whole template
    pub fn parse_template(&mut self) -> ParseResult<Template> {
        let (nodes, boundary) = self.parse_body(&[])?;
        if let Some(boundary) = boundary {
            return Err(ParseError::unexpected_tag(boundary.pos, boundary.name));
        }
        Ok(Template { nodes })
    }

    /// Byte offset of a markup slice inside the source.
    fn offset_of(&self, slice: &str) -> usize {
        let base = self.source.as_ptr() as usize;
        let ptr = slice.as_ptr() as usize;
        if ptr >= base && ptr <= base + self.source.len() {
            ptr - base
        } else {
            0
        }
    }

    fn markup_parser(&self, markup: &'src str) -> ParseResult<ExprParser<'src>> {
        ExprParser::new(markup, self.offset_of(markup))
    }

    /// Collect nodes until one of `terminators` (or the end of input).
    fn parse_body(
        &mut self,
        terminators: &[&str],
    ) -> ParseResult<(Vec<Node>, Option<Boundary<'src>>)> {
        let mut nodes = Vec::new();

        while let Some(segment) = self.segments.get(self.pos).cloned() {
            self.pos += 1;
            match segment.kind {
                SegmentKind::Text(text) => {
                    if !text.is_empty() {
                        nodes.push(Node::Text(text.to_string()));
                    }
                }
                SegmentKind::Output(markup) => {
                    let mut parser = self.markup_parser(markup)?;
                    let expr = parser.parse_filtered()?;
                    parser.expect_end()?;
                    nodes.push(Node::Output(expr));
                }
                SegmentKind::Tag { name, markup } => {
                    if terminators.contains(&name) {
                        return Ok((
                            nodes,
                            Some(Boundary {
                                name,
                                markup,
                                pos: segment.span.start,
                            }),
                        ));
                    }
                    let span = Span::new(segment.span.start, segment.span.end);
                    if let Some(tag) = self.parse_tag(name, markup, span)? {
                        nodes.push(Node::Tag(tag, span));
                    }
                }
            }
        }

        Ok((nodes, None))
    }

    /// Body up to the block's end-tag; an exhausted input names the block.
    fn parse_block_body(&mut self, tag: &str, open: usize) -> ParseResult<Vec<Node>> {
        let end_tag = format!("end{}", tag);
        let (body, boundary) = self.parse_body(&[end_tag.as_str()])?;
        match boundary {
            Some(_) => Ok(body),
            None => Err(ParseError::unclosed_tag(open, tag)),
        }
    }

    fn parse_tag(&mut self, name: &'src str, markup: &'src str, span: Span) -> ParseResult<Option<Tag>> {
        let open = span.start;
        let tag = match name {
            "if" => self.parse_conditional("if", markup, open, false)?,
            "unless" => self.parse_conditional("unless", markup, open, true)?,
            "case" => self.parse_case(markup, open)?,
            "for" => Tag::For(self.parse_for(markup, open)?),
            "tablerow" => Tag::Tablerow(self.parse_tablerow(markup, open)?),
            "break" => Tag::Break,
            "continue" => Tag::Continue,
            "assign" => {
                let mut parser = self.markup_parser(markup)?;
                let name = parser.expect_ident()?;
                parser.expect(Token::Assign)?;
                let value = parser.parse_filtered()?;
                parser.expect_end()?;
                Tag::Assign { name, value }
            }
            "capture" => {
                let name = self.markup_parser(markup)?.expect_name()?;
                let body = self.parse_block_body("capture", open)?;
                Tag::Capture { name, body }
            }
            "increment" | "decrement" => {
                let variable = self.markup_parser(markup)?.expect_ident()?;
                if name == "increment" {
                    Tag::Increment(variable)
                } else {
                    Tag::Decrement(variable)
                }
            }
            "cycle" => self.parse_cycle(markup)?,
            "echo" => {
                let mut parser = self.markup_parser(markup)?;
                let expr = parser.parse_filtered()?;
                parser.expect_end()?;
                Tag::Echo(expr)
            }
            "raw" => {
                let body = self.parse_block_body("raw", open)?;
                let text = body
                    .into_iter()
                    .filter_map(|node| match node {
                        Node::Text(text) => Some(text),
                        _ => None,
                    })
                    .collect();
                Tag::Raw(text)
            }
            "comment" | "schema" => {
                self.parse_block_body(name, open)?;
                return Ok(None);
            }
            "#" => return Ok(None),
            "liquid" => Tag::Liquid(self.parse_liquid(markup)?),
            "style" => Tag::Style(self.parse_block_body("style", open)?),
            "stylesheet" => Tag::Stylesheet(self.parse_block_body("stylesheet", open)?),
            "javascript" => Tag::Javascript(self.parse_block_body("javascript", open)?),
            "form" => {
                let form_type = quoted_name(markup).unwrap_or("generic").to_string();
                let body = self.parse_block_body("form", open)?;
                Tag::Form { form_type, body }
            }
            "paginate" => {
                let (collection, page_size) = self.parse_paginate_markup(markup);
                let body = self.parse_block_body("paginate", open)?;
                Tag::Paginate {
                    collection,
                    page_size,
                    body,
                }
            }
            "content_for" => Tag::ContentFor(self.parse_block_body("content_for", open)?),
            "section" => placeholder(PlaceholderKind::Section, quoted_name(markup).unwrap_or("unknown")),
            "render" => placeholder(PlaceholderKind::Render, quoted_name(markup).unwrap_or("unknown")),
            "include" => placeholder(PlaceholderKind::Include, quoted_name(markup).unwrap_or("unknown")),
            "sections" => placeholder(PlaceholderKind::Sections, quoted_name(markup).unwrap_or("main")),
            "layout" => {
                let name = if markup.contains("none") {
                    "none"
                } else {
                    quoted_name(markup).unwrap_or("theme")
                };
                placeholder(PlaceholderKind::Layout, name)
            }
            other if is_intermediate_or_end(other) => {
                return Err(ParseError::unexpected_tag(open, other));
            }
            other => return Err(ParseError::unknown_tag(open, other)),
        };

        Ok(Some(tag))
    }

    fn parse_conditional(
        &mut self,
        tag: &str,
        markup: &'src str,
        open: usize,
        negate: bool,
    ) -> ParseResult<Tag> {
        let end_tag = format!("end{}", tag);
        let terminators = ["elsif", "else", end_tag.as_str()];

        let mut branches = Vec::new();
        let mut otherwise = None;
        let mut condition = self.parse_condition_markup(markup)?;

        loop {
            let (body, boundary) = self.parse_body(&terminators)?;
            let boundary = boundary.ok_or_else(|| ParseError::unclosed_tag(open, tag))?;
            branches.push(ConditionalBranch { condition, body });

            match boundary.name {
                "elsif" => {
                    condition = self.parse_condition_markup(boundary.markup)?;
                }
                "else" => {
                    otherwise = Some(self.parse_block_body(tag, open)?);
                    break;
                }
                _ => break,
            }
        }

        Ok(Tag::Conditional {
            negate,
            branches,
            otherwise,
        })
    }

    fn parse_condition_markup(&self, markup: &'src str) -> ParseResult<Condition> {
        let mut parser = self.markup_parser(markup)?;
        let condition = parser.parse_condition()?;
        parser.expect_end()?;
        Ok(condition)
    }

    fn parse_case(&mut self, markup: &'src str, open: usize) -> ParseResult<Tag> {
        let mut parser = self.markup_parser(markup)?;
        let subject = parser.parse_expr()?;
        parser.expect_end()?;

        let terminators = ["when", "else", "endcase"];
        // Anything before the first `when` is ignored
        let (_, mut boundary) = self.parse_body(&terminators)?;

        let mut whens = Vec::new();
        let mut otherwise = None;

        loop {
            let current = boundary.ok_or_else(|| ParseError::unclosed_tag(open, "case"))?;
            match current.name {
                "when" => {
                    let values = self.parse_when_values(current.markup)?;
                    let (body, next) = self.parse_body(&terminators)?;
                    whens.push(WhenBranch { values, body });
                    boundary = next;
                }
                "else" => {
                    otherwise = Some(self.parse_block_body("case", open)?);
                    break;
                }
                _ => break,
            }
        }

        Ok(Tag::Case {
            subject,
            whens,
            otherwise,
        })
    }

    fn parse_when_values(&self, markup: &'src str) -> ParseResult<Vec<Expr>> {
        let mut parser = self.markup_parser(markup)?;
        let mut values = vec![parser.parse_expr()?];
        while parser.match_token(Token::Comma) || parser.match_keyword("or") {
            values.push(parser.parse_expr()?);
        }
        parser.expect_end()?;
        Ok(values)
    }

    fn parse_for(&mut self, markup: &'src str, open: usize) -> ParseResult<ForLoop> {
        let mut parser = self.markup_parser(markup)?;
        let variable = parser.expect_ident()?;
        parser.expect_keyword("in")?;
        let iterable = parser.parse_expr()?;
        let options = parser.parse_loop_options()?;

        let (body, boundary) = self.parse_body(&["else", "endfor"])?;
        let boundary = boundary.ok_or_else(|| ParseError::unclosed_tag(open, "for"))?;
        let otherwise = if boundary.name == "else" {
            Some(self.parse_block_body("for", open)?)
        } else {
            None
        };

        Ok(ForLoop {
            variable,
            iterable,
            limit: options.limit,
            offset: options.offset,
            reversed: options.reversed,
            body,
            otherwise,
        })
    }

    fn parse_tablerow(&mut self, markup: &'src str, open: usize) -> ParseResult<TablerowLoop> {
        let mut parser = self.markup_parser(markup)?;
        let variable = parser.expect_ident()?;
        parser.expect_keyword("in")?;
        let iterable = parser.parse_expr()?;
        let options = parser.parse_loop_options()?;
        let body = self.parse_block_body("tablerow", open)?;

        Ok(TablerowLoop {
            variable,
            iterable,
            cols: options.cols,
            limit: options.limit,
            offset: options.offset,
            body,
        })
    }

    fn parse_cycle(&self, markup: &'src str) -> ParseResult<Tag> {
        let mut parser = self.markup_parser(markup)?;
        let first = parser.parse_expr()?;

        let (group, first_value) = if parser.match_token(Token::Colon) {
            (Some(first), parser.parse_expr()?)
        } else {
            (None, first)
        };

        let mut values = vec![first_value];
        while parser.match_token(Token::Comma) {
            values.push(parser.parse_expr()?);
        }
        parser.expect_end()?;

        Ok(Tag::Cycle { group, values })
    }

    /// `collection by size`; an unreadable argument leaves both unset.
    fn parse_paginate_markup(&self, markup: &'src str) -> (Option<Expr>, Option<Expr>) {
        let parsed = self.markup_parser(markup).and_then(|mut parser| {
            let collection = parser.parse_expr()?;
            let page_size = if parser.match_keyword("by") {
                Some(parser.parse_expr()?)
            } else {
                None
            };
            Ok((collection, page_size))
        });

        match parsed {
            Ok((collection, page_size)) => (Some(collection), page_size),
            Err(err) => {
                debug!(error = %err, "paginate arguments ignored");
                (None, None)
            }
        }
    }

    /// Lower the statement lines of `{% liquid %}` into segments and parse
    /// them like ordinary template content.
    fn parse_liquid(&self, markup: &'src str) -> ParseResult<Vec<Node>> {
        let mut segments = Vec::new();
        let mut comment_depth = 0usize;

        for line in markup.lines() {
            let statement = line.trim();
            if statement.is_empty() || statement.starts_with('#') {
                continue;
            }
            let start = self.offset_of(statement);
            let span = start..start + statement.len();
            let (name, args) = split_tag(statement);

            // Comment bodies are skipped rather than parsed as statements
            match name {
                "comment" => {
                    comment_depth += 1;
                    continue;
                }
                "endcomment" if comment_depth > 0 => {
                    comment_depth -= 1;
                    continue;
                }
                _ if comment_depth > 0 => continue,
                _ => {}
            }

            if name == "echo" {
                segments.push(Segment::output(args, span));
            } else {
                segments.push(Segment::tag(name, args, span));
            }
        }

        let mut parser = Parser::from_segments(self.source, segments);
        let template = parser.parse_template()?;
        Ok(template.nodes)
    }
}

fn placeholder(kind: PlaceholderKind, name: &str) -> Tag {
    Tag::Placeholder {
        kind,
        name: name.to_string(),
    }
}

/// First single- or double-quoted word in tag arguments.
fn quoted_name(markup: &str) -> Option<&str> {
    let start = markup.find(['\'', '"'])?;
    let quote = markup[start..].chars().next()?;
    let rest = &markup[start + 1..];
    let end = rest.find(quote)?;
    let name = &rest[..end];
    (!name.is_empty()).then_some(name)
}

fn is_intermediate_or_end(name: &str) -> bool {
    name.starts_with("end") || matches!(name, "else" | "elsif" | "when")
}

/// Parse a template source into an AST
pub fn parse(source: &str) -> ParseResult<Template> {
    Parser::new(source)?.parse_template()
}
