use super::Registry;
use crate::context::RenderContext;
use crate::error::EvalResult;
use crate::filters::FilterArgs;
use crate::value::Value;

// Colour maths is not modelled; every colour filter returns its input.
const COLOR_FILTERS: [&str; 5] = [
    "color_to_rgb",
    "color_to_hsl",
    "color_modify",
    "color_lighten",
    "color_darken",
];

fn identity(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(input)
}

pub(super) fn register(filters: &mut Registry) {
    for name in COLOR_FILTERS {
        filters.insert(name, identity);
    }
}
