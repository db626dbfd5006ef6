use blocksmith_parser::ParseError;
use thiserror::Error;

pub type EvalResult<T> = Result<T, EvalError>;

/// Runtime failure inside a tag, filter or expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Filter '{filter}': division by zero")]
    DivisionByZero { filter: String },

    #[error("Filter '{filter}': {message}")]
    InvalidArgument { filter: String, message: String },

    #[error("Range of {len} items exceeds the limit of {max}")]
    RangeTooLarge { len: i64, max: i64 },

    #[error("Nesting deeper than {max} levels")]
    TooDeep { max: usize },
}

impl EvalError {
    pub fn division_by_zero(filter: impl Into<String>) -> Self {
        EvalError::DivisionByZero {
            filter: filter.into(),
        }
    }

    pub fn invalid_argument(filter: impl Into<String>, message: impl Into<String>) -> Self {
        EvalError::InvalidArgument {
            filter: filter.into(),
            message: message.into(),
        }
    }
}

/// Anything that aborts a render
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),
}

pub type RenderResult<T> = Result<T, RenderError>;
