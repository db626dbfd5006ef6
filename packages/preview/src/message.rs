//! Host/sandbox message protocol.
//!
//! The sandbox can report a null origin, so receivers check the shape of a
//! message rather than where it came from.

use blocksmith_evaluator::RenderOutput;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Host to sandbox: replace the displayed section
    Render { html: String, css: String },
    /// Host to sandbox: show an error in place of the section
    RenderError { error: String },
    /// Sandbox to host: content height after a render
    Resize { height: f64 },
}

impl Message {
    pub fn render(output: &RenderOutput) -> Self {
        Message::Render {
            html: output.html.clone(),
            css: output.css.clone(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Message::RenderError { error: error.into() }
    }

    /// Accept a raw JSON value only when it is an object with a string
    /// `type` naming a known message whose fields have the right types.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let kind = object.get("type")?.as_str()?;
        let message = match kind {
            "RENDER" => Message::Render {
                html: object.get("html")?.as_str()?.to_string(),
                css: object.get("css").and_then(Value::as_str).unwrap_or_default().to_string(),
            },
            "RENDER_ERROR" => Message::RenderError {
                error: object.get("error")?.as_str()?.to_string(),
            },
            "RESIZE" => {
                let height = object.get("height")?.as_f64()?;
                if !height.is_finite() || height < 0.0 {
                    return None;
                }
                Message::Resize { height }
            }
            other => {
                debug!(kind = other, "ignoring unknown message type");
                return None;
            }
        };
        Some(message)
    }

    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str::<Value>(raw)
            .ok()
            .and_then(|value| Self::from_value(&value))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let message = Message::Render {
            html: "<p>x</p>".into(),
            css: "p{}".into(),
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"type": "RENDER", "html": "<p>x</p>", "css": "p{}"})
        );
        assert_eq!(
            serde_json::to_value(Message::error("boom")).unwrap(),
            json!({"type": "RENDER_ERROR", "error": "boom"})
        );
        assert_eq!(
            serde_json::to_value(Message::Resize { height: 420.0 }).unwrap(),
            json!({"type": "RESIZE", "height": 420.0})
        );
    }

    #[test]
    fn test_shape_validation_rejects_garbage() {
        assert_eq!(Message::from_json("null"), None);
        assert_eq!(Message::from_json("\"RENDER\""), None);
        assert_eq!(Message::from_json(r#"{"type": 5}"#), None);
        assert_eq!(Message::from_json(r#"{"type": "RENDER"}"#), None);
        assert_eq!(Message::from_json(r#"{"type": "RENDER", "html": 1}"#), None);
        assert_eq!(Message::from_json(r#"{"type": "RESIZE", "height": "tall"}"#), None);
        assert_eq!(Message::from_json(r#"{"type": "RESIZE", "height": -1}"#), None);
        assert_eq!(Message::from_json(r#"{"type": "NAVIGATE", "url": "/"}"#), None);
        assert_eq!(Message::from_json("not json"), None);
    }

    #[test]
    fn test_shape_validation_accepts_well_formed() {
        assert_eq!(
            Message::from_json(r#"{"type": "RENDER", "html": "<b>hi</b>"}"#),
            Some(Message::Render {
                html: "<b>hi</b>".into(),
                css: String::new()
            })
        );
        assert_eq!(
            Message::from_json(r#"{"type": "RESIZE", "height": 300}"#),
            Some(Message::Resize { height: 300.0 })
        );
    }
}
