//! Section template interpreter.
//!
//! Rendering is a pure function of the template source, settings, blocks,
//! resolved resources and [`RenderOptions`]. Timestamps come from the
//! options' clock and every map a template can iterate is ordered, so the
//! same inputs always produce byte-identical output.

pub mod context;
pub mod drops;
pub mod error;
pub mod filters;
pub mod mock;
pub mod pipeline;
pub mod renderer;
pub mod value;

pub use context::RenderContext;
pub use drops::TemplateDrop;
pub use error::{EvalError, EvalResult, RenderError, RenderResult};
pub use mock::{MockData, PRESET_IDS};
pub use pipeline::{
    build_globals, extract_css, render_section, render_with_mock, RenderOptions, RenderOutput,
    DEFAULT_SECTION_ID,
};
pub use renderer::{placeholder_comment, Renderer, MAX_DEPTH, MAX_RANGE};
pub use value::Value;
