//! Filter registry.
//!
//! Filters never fail on `nil` or missing input; each one has a safe
//! default. The only errors a filter raises are arithmetic ones such as
//! division by zero, which abort the render.

mod color;
mod font;
pub(crate) mod html;
mod media;
mod metafield;
mod money;
mod standard;
mod url;
mod utility;

use crate::context::RenderContext;
use crate::error::EvalResult;
use crate::value::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use tracing::debug;

pub use html::{escape_attr, escape_html};
pub use media::placeholder_image_uri;
pub use url::PLACEHOLDER_IMAGE_URL;

/// Evaluated arguments of one filter call
#[derive(Debug, Clone, Default)]
pub struct FilterArgs {
    pub positional: Vec<Value>,
    pub keyword: BTreeMap<String, Value>,
}

impl FilterArgs {
    pub fn new(positional: Vec<Value>) -> Self {
        Self {
            positional,
            keyword: BTreeMap::new(),
        }
    }

    pub fn with_keyword(mut self, key: impl Into<String>, value: Value) -> Self {
        self.keyword.insert(key.into(), value);
        self
    }

    /// Positional argument, `nil` when absent
    pub fn arg(&self, index: usize) -> Value {
        self.positional.get(index).cloned().unwrap_or_default()
    }

    /// Positional argument rendered as text
    pub fn text(&self, index: usize) -> String {
        self.arg(index).render()
    }

    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keyword.get(name).filter(|value| !value.is_nil())
    }
}

pub type FilterFn = fn(Value, &FilterArgs, &RenderContext) -> EvalResult<Value>;

type Registry = HashMap<&'static str, FilterFn>;

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut filters = Registry::new();
        standard::register(&mut filters);
        money::register(&mut filters);
        url::register(&mut filters);
        media::register(&mut filters);
        utility::register(&mut filters);
        metafield::register(&mut filters);
        font::register(&mut filters);
        color::register(&mut filters);
        filters
    })
}

pub fn is_known(name: &str) -> bool {
    registry().contains_key(name)
}

/// Apply the named filter. Unknown filters return their input unchanged.
pub fn apply(name: &str, input: Value, args: &FilterArgs, ctx: &RenderContext) -> EvalResult<Value> {
    match registry().get(name) {
        Some(filter) => filter(input, args, ctx),
        None => {
            debug!(filter = name, "unknown filter, passing value through");
            Ok(input)
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::{TimeZone, Utc};

    pub fn ctx() -> RenderContext {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        RenderContext::new(BTreeMap::new(), now)
    }

    pub fn run(name: &str, input: Value, args: Vec<Value>) -> Value {
        apply(name, input, &FilterArgs::new(args), &ctx()).expect("filter should succeed")
    }

    pub fn run_text(name: &str, input: impl Into<Value>, args: Vec<Value>) -> String {
        run(name, input.into(), args).render()
    }
}
