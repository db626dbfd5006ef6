use super::{FilterArgs, Registry};
use crate::context::RenderContext;
use crate::error::EvalResult;
use crate::value::Value;

// Previews format every amount in the demo store's currency.
const CURRENCY_SYMBOL: &str = "$";
const CURRENCY_CODE: &str = "USD";

pub(super) fn register(filters: &mut Registry) {
    filters.insert("money", money);
    filters.insert("money_with_currency", money_with_currency);
    filters.insert("money_without_currency", money_without_currency);
    filters.insert("money_without_trailing_zeros", money_without_trailing_zeros);
}

/// Minor units to major units; `None` for non-numeric input.
fn amount(cents: &Value) -> Option<f64> {
    cents.as_f64().map(|cents| cents / 100.0)
}

fn money(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(match amount(&input) {
        Some(amount) => Value::Str(format!("{}{:.2}", CURRENCY_SYMBOL, amount)),
        None => Value::string(""),
    })
}

fn money_with_currency(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(match amount(&input) {
        Some(amount) => Value::Str(format!("{}{:.2} {}", CURRENCY_SYMBOL, amount, CURRENCY_CODE)),
        None => Value::string(""),
    })
}

fn money_without_currency(input: Value, _: &FilterArgs, _: &RenderContext) -> EvalResult<Value> {
    Ok(match amount(&input) {
        Some(amount) => Value::Str(format!("{:.2}", amount)),
        None => Value::string(""),
    })
}

fn money_without_trailing_zeros(
    input: Value,
    _: &FilterArgs,
    _: &RenderContext,
) -> EvalResult<Value> {
    Ok(match amount(&input) {
        Some(amount) if amount.fract() == 0.0 => {
            Value::Str(format!("{}{:.0}", CURRENCY_SYMBOL, amount))
        }
        Some(amount) => Value::Str(format!("{}{:.2}", CURRENCY_SYMBOL, amount)),
        None => Value::string(""),
    })
}
