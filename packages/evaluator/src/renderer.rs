//! Tree-walking interpreter over the parsed template.

use crate::context::RenderContext;
use crate::drops::{ForloopDrop, PaginateDrop, TablerowloopDrop};
use crate::error::{EvalError, EvalResult};
use crate::filters::{self, FilterArgs};
use crate::value::Value;
use blocksmith_parser::{
    CompareOp, Condition, Expr, FilterCall, FilteredExpr, ForLoop, Literal, Node, PathSegment,
    PlaceholderKind, TablerowLoop, Tag, Template,
};
use std::collections::BTreeMap;
use std::fmt::Write;
use tracing::{debug, instrument};

/// Longest `(a..b)` range a loop may walk
pub const MAX_RANGE: i64 = 100_000;

/// Deepest nesting of block tags
pub const MAX_DEPTH: usize = 100;

/// How a body finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Normal,
    Break,
    Continue,
}

pub struct Renderer {
    context: RenderContext,
}

impl Renderer {
    pub fn new(context: RenderContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut RenderContext {
        &mut self.context
    }

    /// Render a whole template. A stray `break` outside a loop ends output.
    #[instrument(skip(self, template), fields(nodes = template.nodes.len()))]
    pub fn render(&mut self, template: &Template) -> EvalResult<String> {
        let mut out = String::new();
        self.render_nodes(&template.nodes, &mut out)?;
        Ok(out)
    }

    fn render_nodes(&mut self, nodes: &[Node], out: &mut String) -> EvalResult<Flow> {
        for node in nodes {
            let flow = match node {
                Node::Text(text) => {
                    out.push_str(text);
                    Flow::Normal
                }
                Node::Output(expr) => {
                    let value = self.eval_filtered(expr)?;
                    out.push_str(&value.render());
                    Flow::Normal
                }
                Node::Tag(tag, _) => self.render_tag(tag, out)?,
            };
            if flow != Flow::Normal {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    /// Render nested content one level deeper.
    fn render_nested(&mut self, nodes: &[Node], out: &mut String) -> EvalResult<Flow> {
        if self.context.enter() > MAX_DEPTH {
            self.context.leave();
            return Err(EvalError::TooDeep { max: MAX_DEPTH });
        }
        let result = self.render_nodes(nodes, out);
        self.context.leave();
        result
    }

    /// Render nested content into its own buffer, discarding loop control.
    fn render_to_string(&mut self, nodes: &[Node]) -> EvalResult<String> {
        let mut buf = String::new();
        self.render_nested(nodes, &mut buf)?;
        Ok(buf)
    }

    fn render_tag(&mut self, tag: &Tag, out: &mut String) -> EvalResult<Flow> {
        match tag {
            Tag::Conditional {
                negate,
                branches,
                otherwise,
            } => {
                for (i, branch) in branches.iter().enumerate() {
                    let mut hit = self.eval_condition(&branch.condition)?;
                    if i == 0 && *negate {
                        hit = !hit;
                    }
                    if hit {
                        return self.render_nested(&branch.body, out);
                    }
                }
                match otherwise {
                    Some(body) => self.render_nested(body, out),
                    None => Ok(Flow::Normal),
                }
            }
            Tag::Case {
                subject,
                whens,
                otherwise,
            } => {
                let subject = self.eval_expr(subject)?;
                let mut matched = false;
                for when in whens {
                    let mut hit = false;
                    for value in &when.values {
                        if self.eval_expr(value)?.loose_eq(&subject) {
                            hit = true;
                            break;
                        }
                    }
                    if hit {
                        matched = true;
                        let flow = self.render_nested(&when.body, out)?;
                        if flow != Flow::Normal {
                            return Ok(flow);
                        }
                    }
                }
                match otherwise {
                    Some(body) if !matched => self.render_nested(body, out),
                    _ => Ok(Flow::Normal),
                }
            }
            Tag::For(for_loop) => self.render_for(for_loop, out),
            Tag::Tablerow(tablerow) => self.render_tablerow(tablerow, out),
            Tag::Break => Ok(Flow::Break),
            Tag::Continue => Ok(Flow::Continue),
            Tag::Assign { name, value } => {
                let value = self.eval_filtered(value)?;
                self.context.assign(name.clone(), value);
                Ok(Flow::Normal)
            }
            Tag::Capture { name, body } => {
                let captured = self.render_to_string(body)?;
                self.context.assign(name.clone(), Value::Str(captured));
                Ok(Flow::Normal)
            }
            Tag::Increment(name) => {
                let n = self.context.increment(name);
                let _ = write!(out, "{}", n);
                Ok(Flow::Normal)
            }
            Tag::Decrement(name) => {
                let n = self.context.decrement(name);
                let _ = write!(out, "{}", n);
                Ok(Flow::Normal)
            }
            Tag::Cycle { group, values } => {
                if values.is_empty() {
                    return Ok(Flow::Normal);
                }
                let key = match group {
                    Some(group) => self.eval_expr(group)?.render(),
                    None => format!("{:?}", values),
                };
                let position = self.context.cycle(key, values.len());
                let value = self.eval_expr(&values[position])?;
                out.push_str(&value.render());
                Ok(Flow::Normal)
            }
            Tag::Echo(expr) => {
                let value = self.eval_filtered(expr)?;
                out.push_str(&value.render());
                Ok(Flow::Normal)
            }
            Tag::Raw(text) => {
                out.push_str(text);
                Ok(Flow::Normal)
            }
            Tag::Liquid(nodes) => self.render_nodes(nodes, out),
            Tag::Style(body) => {
                let inner = self.render_to_string(body)?;
                let _ = write!(out, "<style data-shopify-style>{}</style>", inner);
                Ok(Flow::Normal)
            }
            Tag::Stylesheet(body) => {
                let inner = self.render_to_string(body)?;
                let _ = write!(out, "<style>{}</style>", inner);
                Ok(Flow::Normal)
            }
            Tag::Javascript(body) => {
                let inner = self.render_to_string(body)?;
                let _ = write!(out, "<script>{}</script>", inner);
                Ok(Flow::Normal)
            }
            Tag::Form { form_type, body } => {
                let form = Value::object([
                    ("errors", Value::Array(Vec::new())),
                    ("posted_successfully", Value::Bool(false)),
                    ("id", Value::string(format!("form-{}-preview", form_type))),
                ]);
                let scope = BTreeMap::from([("form".to_string(), form)]);
                self.context.push(scope);
                let inner = self.render_to_string(body);
                self.context.pop();
                let _ = write!(
                    out,
                    "<form method=\"post\" class=\"shopify-form shopify-form-{}\" data-preview=\"true\">\n{}\n</form>",
                    form_type, inner?
                );
                Ok(Flow::Normal)
            }
            Tag::Paginate {
                collection,
                page_size,
                body,
            } => {
                let total = match collection {
                    Some(expr) => self.eval_expr(expr)?.iter_items().len() as i64,
                    None => 0,
                };
                let size = match page_size {
                    Some(expr) => self.eval_expr(expr)?.as_i64().unwrap_or(12),
                    None => 12,
                };
                let scope = BTreeMap::from([(
                    "paginate".to_string(),
                    Value::drop(PaginateDrop::new(1, size, total)),
                )]);
                self.context.push(scope);
                let inner = self.render_to_string(body);
                self.context.pop();
                let _ = write!(
                    out,
                    "<!-- Paginated section (preview shows first page) -->\n{}\n<!-- End pagination -->",
                    inner?
                );
                Ok(Flow::Normal)
            }
            Tag::ContentFor(body) => {
                let inner = self.render_to_string(body)?;
                let _ = write!(out, "<!-- content_for block -->{}<!-- end content_for -->", inner);
                Ok(Flow::Normal)
            }
            Tag::Placeholder { kind, name } => {
                out.push_str(&placeholder_comment(*kind, name));
                Ok(Flow::Normal)
            }
        }
    }

    fn render_for(&mut self, for_loop: &ForLoop, out: &mut String) -> EvalResult<Flow> {
        let iterable = self.eval_expr(&for_loop.iterable)?;
        let mut items = iterable.iter_items();

        let offset = self.eval_count(for_loop.offset.as_ref())?.unwrap_or(0);
        items = items.into_iter().skip(offset).collect();
        if let Some(limit) = self.eval_count(for_loop.limit.as_ref())? {
            items.truncate(limit);
        }
        if for_loop.reversed {
            items.reverse();
        }

        if items.is_empty() {
            return match &for_loop.otherwise {
                Some(body) => self.render_nested(body, out),
                None => Ok(Flow::Normal),
            };
        }

        let parent = self.context.get("forloop");
        let name = format!("{}-{}", for_loop.variable, expr_label(&for_loop.iterable));
        let len = items.len();
        for (i, item) in items.into_iter().enumerate() {
            let scope = BTreeMap::from([
                (for_loop.variable.clone(), item),
                (
                    "forloop".to_string(),
                    Value::drop(ForloopDrop::new(i, len, name.clone(), parent.clone())),
                ),
            ]);
            self.context.push(scope);
            let flow = self.render_nested(&for_loop.body, out);
            self.context.pop();
            if flow? == Flow::Break {
                break;
            }
        }
        Ok(Flow::Normal)
    }

    fn render_tablerow(&mut self, tablerow: &TablerowLoop, out: &mut String) -> EvalResult<Flow> {
        let iterable = self.eval_expr(&tablerow.iterable)?;
        // Only real sequences produce a table
        let Value::Array(items) = iterable else {
            return Ok(Flow::Normal);
        };

        let offset = self.eval_count(tablerow.offset.as_ref())?.unwrap_or(0);
        let mut items: Vec<Value> = items.into_iter().skip(offset).collect();
        if let Some(limit) = self.eval_count(tablerow.limit.as_ref())? {
            items.truncate(limit);
        }
        if items.is_empty() {
            return Ok(Flow::Normal);
        }

        let len = items.len();
        let cols = self
            .eval_count(tablerow.cols.as_ref())?
            .filter(|cols| *cols > 0)
            .unwrap_or(len)
            .max(1);

        let mut row = 1;
        let mut col = 0;
        out.push_str("<tr class=\"row1\">\n");
        for (i, item) in items.into_iter().enumerate() {
            col += 1;
            let scope = BTreeMap::from([
                (tablerow.variable.clone(), item),
                (
                    "tablerowloop".to_string(),
                    Value::drop(TablerowloopDrop::new(i, len, col, cols, row)),
                ),
                (
                    "forloop".to_string(),
                    Value::drop(ForloopDrop::new(i, len, tablerow.variable.clone(), Value::Nil)),
                ),
            ]);
            self.context.push(scope);
            let cell = self.render_to_string(&tablerow.body);
            self.context.pop();
            let _ = write!(out, "<td class=\"col{}\">{}</td>", col, cell?);

            if col >= cols && i + 1 < len {
                row += 1;
                col = 0;
                let _ = write!(out, "</tr>\n<tr class=\"row{}\">", row);
            }
        }
        out.push_str("</tr>\n");
        Ok(Flow::Normal)
    }

    /// Non-negative count from an optional `limit:`/`offset:`/`cols:` value
    fn eval_count(&mut self, expr: Option<&Expr>) -> EvalResult<Option<usize>> {
        match expr {
            Some(expr) => Ok(self.eval_expr(expr)?.as_i64().map(|n| n.max(0) as usize)),
            None => Ok(None),
        }
    }

    pub fn eval_filtered(&mut self, expr: &FilteredExpr) -> EvalResult<Value> {
        let mut value = self.eval_expr(&expr.expr)?;
        for call in &expr.filters {
            value = self.apply_filter(call, value)?;
        }
        Ok(value)
    }

    fn apply_filter(&mut self, call: &FilterCall, input: Value) -> EvalResult<Value> {
        let mut args = FilterArgs::default();
        for arg in &call.args {
            args.positional.push(self.eval_expr(arg)?);
        }
        for (key, arg) in &call.kwargs {
            args.keyword.insert(key.clone(), self.eval_expr(arg)?);
        }
        filters::apply(&call.name, input, &args, &self.context)
    }

    pub fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                Literal::Nil => Value::Nil,
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Integer(n) => Value::Int(*n),
                Literal::Float(f) => Value::Float(*f),
                Literal::String(s) => Value::string(s),
                // Bare `empty`/`blank` only mean something in comparisons
                Literal::Empty | Literal::Blank => Value::string(""),
            }),
            Expr::Variable { root, path } => {
                let mut value = self.context.get(root);
                for segment in path {
                    value = match segment {
                        PathSegment::Key(key) => value.get(key),
                        PathSegment::Index(index) => {
                            let index = self.eval_expr(index)?;
                            value.index(&index)
                        }
                    };
                }
                Ok(value)
            }
            Expr::Range { start, end } => {
                let start = self.eval_expr(start)?.as_i64().unwrap_or(0);
                let end = self.eval_expr(end)?.as_i64().unwrap_or(0);
                let len = i64::try_from(i128::from(end) - i128::from(start) + 1).unwrap_or(i64::MAX);
                if len > MAX_RANGE {
                    return Err(EvalError::RangeTooLarge {
                        len,
                        max: MAX_RANGE,
                    });
                }
                Ok(Value::Array((start..=end).map(Value::Int).collect()))
            }
        }
    }

    pub fn eval_condition(&mut self, condition: &Condition) -> EvalResult<bool> {
        match condition {
            Condition::Value(expr) => Ok(self.eval_expr(expr)?.is_truthy()),
            Condition::Compare { left, op, right } => {
                if let Some(special) = special_literal(right) {
                    let value = self.eval_expr(left)?;
                    return Ok(compare_special(&value, special, *op));
                }
                if let Some(special) = special_literal(left) {
                    let value = self.eval_expr(right)?;
                    return Ok(compare_special(&value, special, *op));
                }
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                Ok(compare(&left, *op, &right))
            }
            Condition::And(left, right) => {
                Ok(self.eval_condition(left)? && self.eval_condition(right)?)
            }
            Condition::Or(left, right) => {
                Ok(self.eval_condition(left)? || self.eval_condition(right)?)
            }
        }
    }
}

fn special_literal(expr: &Expr) -> Option<&Literal> {
    match expr {
        Expr::Literal(literal @ (Literal::Empty | Literal::Blank)) => Some(literal),
        _ => None,
    }
}

fn compare_special(value: &Value, special: &Literal, op: CompareOp) -> bool {
    let matches = match special {
        Literal::Blank => value.is_blank(),
        _ => value.is_empty(),
    };
    match op {
        CompareOp::Eq => matches,
        CompareOp::NotEq => !matches,
        _ => false,
    }
}

fn compare(left: &Value, op: CompareOp, right: &Value) -> bool {
    use std::cmp::Ordering::*;
    match op {
        CompareOp::Eq => left.loose_eq(right),
        CompareOp::NotEq => !left.loose_eq(right),
        CompareOp::Lt => left.compare(right) == Some(Less),
        CompareOp::Gt => left.compare(right) == Some(Greater),
        CompareOp::LtEq => matches!(left.compare(right), Some(Less | Equal)),
        CompareOp::GtEq => matches!(left.compare(right), Some(Greater | Equal)),
        CompareOp::Contains => left.contains(right),
    }
}

/// Deterministic comment standing in for content a section preview cannot load
pub fn placeholder_comment(kind: PlaceholderKind, name: &str) -> String {
    debug!(?kind, name, "placeholder tag");
    match kind {
        PlaceholderKind::Section => format!("<!-- Section: {} (not rendered in preview) -->", name),
        PlaceholderKind::Render => {
            format!("<!-- Render snippet: {} (not loaded in preview) -->", name)
        }
        PlaceholderKind::Include => format!(
            "<!-- Include snippet: {} (not loaded in preview, shared scope) -->",
            name
        ),
        PlaceholderKind::Layout => {
            format!("<!-- Layout: {} (not applied in section preview) -->", name)
        }
        PlaceholderKind::Sections => format!(
            "<!-- Sections group: {} (not rendered in single section preview) -->",
            name
        ),
    }
}

/// Short name of a loop source, used for `forloop.name`
fn expr_label(expr: &Expr) -> String {
    match expr {
        Expr::Variable { root, path } => {
            let mut label = root.clone();
            for segment in path {
                if let PathSegment::Key(key) = segment {
                    label.push('.');
                    label.push_str(key);
                }
            }
            label
        }
        Expr::Range { .. } => "range".to_string(),
        Expr::Literal(_) => "literal".to_string(),
    }
}
