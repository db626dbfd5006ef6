use crate::value::Value;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

/// Variable scopes and per-render counters.
///
/// Scope 0 holds globals and everything `assign`/`capture` write; loop
/// and tag bodies push short-lived scopes on top of it.
pub struct RenderContext {
    scopes: Vec<BTreeMap<String, Value>>,
    /// `increment`/`decrement` counters live apart from variables
    counters: HashMap<String, i64>,
    cycles: HashMap<String, usize>,
    now: DateTime<Utc>,
    depth: usize,
}

impl RenderContext {
    pub fn new(globals: BTreeMap<String, Value>, now: DateTime<Utc>) -> Self {
        Self {
            scopes: vec![globals],
            counters: HashMap::new(),
            cycles: HashMap::new(),
            now,
            depth: 0,
        }
    }

    /// The render clock
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn get(&self, name: &str) -> Value {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .cloned()
            .unwrap_or_default()
    }

    /// Assign into the outermost scope so the value outlives loops.
    pub fn assign(&mut self, name: impl Into<String>, value: Value) {
        if let Some(globals) = self.scopes.first_mut() {
            globals.insert(name.into(), value);
        }
    }

    /// Set a variable in the innermost scope only
    pub fn set_local(&mut self, name: impl Into<String>, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), value);
        }
    }

    pub fn push(&mut self, scope: BTreeMap<String, Value>) {
        self.scopes.push(scope);
    }

    /// Pop the innermost scope; the global scope is never removed.
    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Run `body` with an extra scope pushed, popping it on every path.
    pub fn with_scope<T>(
        &mut self,
        scope: BTreeMap<String, Value>,
        body: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.push(scope);
        let result = body(self);
        self.pop();
        result
    }

    /// `{% increment %}` outputs the current value, then adds one.
    pub fn increment(&mut self, name: &str) -> i64 {
        let counter = self.counters.entry(name.to_string()).or_insert(0);
        let current = *counter;
        *counter += 1;
        current
    }

    /// `{% decrement %}` subtracts one, then outputs.
    pub fn decrement(&mut self, name: &str) -> i64 {
        let counter = self.counters.entry(name.to_string()).or_insert(0);
        *counter -= 1;
        *counter
    }

    /// Next position of a `cycle` group
    pub fn cycle(&mut self, key: String, len: usize) -> usize {
        let position = self.cycles.entry(key).or_insert(0);
        let current = *position % len.max(1);
        *position = current + 1;
        current
    }

    pub(crate) fn enter(&mut self) -> usize {
        self.depth += 1;
        self.depth
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn context() -> RenderContext {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        RenderContext::new(BTreeMap::from([("x".to_string(), Value::Int(1))]), now)
    }

    #[test]
    fn test_inner_scope_shadows_and_pops() {
        let mut ctx = context();
        ctx.with_scope(BTreeMap::from([("x".to_string(), Value::Int(2))]), |ctx| {
            assert_eq!(ctx.get("x"), Value::Int(2));
        });
        assert_eq!(ctx.get("x"), Value::Int(1));
    }

    #[test]
    fn test_assign_survives_scope() {
        let mut ctx = context();
        ctx.with_scope(BTreeMap::new(), |ctx| ctx.assign("y", Value::Int(5)));
        assert_eq!(ctx.get("y"), Value::Int(5));
    }

    #[test]
    fn test_counters() {
        let mut ctx = context();
        assert_eq!(ctx.increment("n"), 0);
        assert_eq!(ctx.increment("n"), 1);
        assert_eq!(ctx.decrement("m"), -1);
    }

    #[test]
    fn test_cycle_wraps() {
        let mut ctx = context();
        let picks: Vec<usize> = (0..4).map(|_| ctx.cycle("g".to_string(), 3)).collect();
        assert_eq!(picks, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_global_scope_is_never_popped() {
        let mut ctx = context();
        ctx.pop();
        assert_eq!(ctx.get("x"), Value::Int(1));
    }
}
