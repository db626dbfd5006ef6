use super::{RawFields, TemplateDrop};
use crate::value::Value;
use blocksmith_common::BlockInstance;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// One block of the section, as seen in `{% for block in section.blocks %}`
pub struct BlockDrop {
    block: BlockInstance,
    settings: OnceLock<Value>,
    raw: RawFields,
}

impl BlockDrop {
    pub fn new(block: BlockInstance) -> Self {
        Self {
            block,
            settings: OnceLock::new(),
            raw: RawFields::default(),
        }
    }

    /// Theme-editor data attributes identifying the block
    pub fn shopify_attributes(&self) -> String {
        format!(
            r#"data-block-id="{}" data-block-type="{}""#,
            self.block.id, self.block.kind
        )
    }
}

impl TemplateDrop for BlockDrop {
    fn type_name(&self) -> &'static str {
        "block"
    }

    fn get(&self, key: &str) -> Option<Value> {
        Some(match key {
            "id" => Value::string(&self.block.id),
            "type" => Value::string(&self.block.kind),
            "settings" => self
                .settings
                .get_or_init(|| {
                    Value::Object(
                        self.block
                            .settings
                            .iter()
                            .map(|(k, v)| (k.clone(), Value::from(v)))
                            .collect(),
                    )
                })
                .clone(),
            "shopify_attributes" => Value::string(self.shopify_attributes()),
            _ => return None,
        })
    }

    fn fallback(&self, key: &str) -> Option<Value> {
        self.raw.get(&self.block, key)
    }

    fn render(&self) -> String {
        format!("[Block: {}]", self.block.kind)
    }

    fn to_json(&self) -> serde_json::Value {
        self.raw.json(&self.block)
    }
}

/// Key/value settings with no fixed surface
#[derive(Debug, Clone, Default)]
pub struct SettingsDrop {
    values: BTreeMap<String, Value>,
}

impl SettingsDrop {
    pub fn new(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl TemplateDrop for SettingsDrop {
    fn type_name(&self) -> &'static str {
        "settings"
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn to_json(&self) -> serde_json::Value {
        Value::Object(self.values.clone()).to_json()
    }
}

/// The section being rendered
pub struct SectionDrop {
    id: String,
    settings: Value,
    blocks: Vec<Value>,
    block_ids: Vec<String>,
}

impl SectionDrop {
    pub fn new(id: impl Into<String>, settings: BTreeMap<String, Value>, blocks: &[BlockInstance]) -> Self {
        Self {
            id: id.into(),
            settings: Value::drop(SettingsDrop::new(settings)),
            blocks: blocks
                .iter()
                .map(|block| Value::drop(BlockDrop::new(block.clone())))
                .collect(),
            block_ids: blocks.iter().map(|block| block.id.clone()).collect(),
        }
    }

    pub fn settings(&self) -> Value {
        self.settings.clone()
    }
}

impl TemplateDrop for SectionDrop {
    fn type_name(&self) -> &'static str {
        "section"
    }

    fn get(&self, key: &str) -> Option<Value> {
        Some(match key {
            "id" => Value::string(&self.id),
            "settings" => self.settings.clone(),
            "blocks" => Value::Array(self.blocks.clone()),
            "block_order" => Value::strings(&self.block_ids),
            "index" => Value::Int(1),
            "location" => Value::string("template"),
            _ => return None,
        })
    }
}
