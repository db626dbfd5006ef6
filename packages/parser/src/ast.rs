use serde::Serialize;

/// Byte range of a node in the template source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Root of a parsed template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    Text(String),
    Output(FilteredExpr),
    Tag(Tag, Span),
}

/// An expression followed by a filter chain: `x | f: a, key: b`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredExpr {
    pub expr: Expr,
    pub filters: Vec<FilterCall>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub kwargs: Vec<(String, Expr)>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Empty,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PathSegment {
    Key(String),
    Index(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(Literal),
    Variable {
        root: String,
        path: Vec<PathSegment>,
    },
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
    },
}

impl Expr {
    pub fn nil() -> Self {
        Expr::Literal(Literal::Nil)
    }

    pub fn variable(root: impl Into<String>) -> Self {
        Expr::Variable {
            root: root.into(),
            path: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Contains,
}

/// Boolean condition of `if`, `unless` and `elsif`.
///
/// `and`/`or` bind right to left with equal precedence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Condition {
    Value(Expr),
    Compare {
        left: Expr,
        op: CompareOp,
        right: Expr,
    },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalBranch {
    pub condition: Condition,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhenBranch {
    pub values: Vec<Expr>,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForLoop {
    pub variable: String,
    pub iterable: Expr,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
    pub reversed: bool,
    pub body: Vec<Node>,
    pub otherwise: Option<Vec<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablerowLoop {
    pub variable: String,
    pub iterable: Expr,
    pub cols: Option<Expr>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
    pub body: Vec<Node>,
}

/// Placeholder tags that only name something they cannot load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaceholderKind {
    Section,
    Render,
    Include,
    Layout,
    Sections,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Tag {
    /// `if` and `unless`; `negate` flips the first branch only
    Conditional {
        negate: bool,
        branches: Vec<ConditionalBranch>,
        otherwise: Option<Vec<Node>>,
    },
    Case {
        subject: Expr,
        whens: Vec<WhenBranch>,
        otherwise: Option<Vec<Node>>,
    },
    For(ForLoop),
    Tablerow(TablerowLoop),
    Break,
    Continue,
    Assign {
        name: String,
        value: FilteredExpr,
    },
    Capture {
        name: String,
        body: Vec<Node>,
    },
    Increment(String),
    Decrement(String),
    Cycle {
        group: Option<Expr>,
        values: Vec<Expr>,
    },
    Echo(FilteredExpr),
    Raw(String),
    /// `{% liquid %}` statements, already lowered to nodes
    Liquid(Vec<Node>),
    Style(Vec<Node>),
    Stylesheet(Vec<Node>),
    Javascript(Vec<Node>),
    Form {
        form_type: String,
        body: Vec<Node>,
    },
    Paginate {
        collection: Option<Expr>,
        page_size: Option<Expr>,
        body: Vec<Node>,
    },
    ContentFor(Vec<Node>),
    Placeholder {
        kind: PlaceholderKind,
        name: String,
    },
}
