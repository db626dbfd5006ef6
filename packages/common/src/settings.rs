use crate::schema::ParsedSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Template-level configuration values, keyed by setting id.
///
/// Values are plain JSON scalars. Keys the current schema does not declare
/// are tolerated and can be dropped with [`SettingsState::retain_declared`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsState(BTreeMap<String, Value>);

impl SettingsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.0.get(id)
    }

    pub fn insert(&mut self, id: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(id.into(), value.into())
    }

    pub fn remove(&mut self, id: &str) -> Option<Value> {
        self.0.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Drop every key the schema does not declare as a section setting.
    pub fn retain_declared(&mut self, schema: &ParsedSchema) {
        self.0
            .retain(|id, _| schema.settings.iter().any(|setting| setting.id == *id));
    }

    /// Overlay `other` on top of this state.
    pub fn merge(&mut self, other: &SettingsState) {
        for (id, value) in other.iter() {
            self.0.insert(id.clone(), value.clone());
        }
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

impl From<BTreeMap<String, Value>> for SettingsState {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for SettingsState {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a SettingsState {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One repeatable block placed inside a section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockInstance {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub settings: SettingsState,
}

impl BlockInstance {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            settings: SettingsState::new(),
        }
    }

    pub fn with_setting(mut self, id: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(id, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_schema;
    use serde_json::json;

    #[test]
    fn test_retain_declared_drops_unknown_keys() {
        let schema = parse_schema(
            r#"{% schema %}{"name":"Hero","settings":[{"type":"text","id":"heading"}]}{% endschema %}"#,
        )
        .unwrap();

        let mut state = SettingsState::new();
        state.insert("heading", "Hello");
        state.insert("stale", 3);
        state.retain_declared(&schema);

        assert_eq!(state.len(), 1);
        assert_eq!(state.get("heading"), Some(&json!("Hello")));
        assert!(!state.contains("stale"));
    }

    #[test]
    fn test_block_instance_deserializes_type_field() {
        let block: BlockInstance =
            serde_json::from_value(json!({"id": "b1", "type": "slide", "settings": {"title": "One"}}))
                .unwrap();

        assert_eq!(block.kind, "slide");
        assert_eq!(block.settings.get("title"), Some(&json!("One")));
    }

    #[test]
    fn test_merge_overrides_existing_values() {
        let mut base = SettingsState::new();
        base.insert("a", 1);
        base.insert("b", 2);

        let mut overlay = SettingsState::new();
        overlay.insert("b", 20);

        base.merge(&overlay);
        assert_eq!(base.get("a"), Some(&json!(1)));
        assert_eq!(base.get("b"), Some(&json!(20)));
    }
}
