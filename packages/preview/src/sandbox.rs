//! The isolated document local previews render into.
//!
//! It shares nothing with the host page. The host drives it with
//! [`Message::Render`] and [`Message::RenderError`] and the document answers
//! with [`Message::Resize`] once the new content is laid out.

use crate::message::Message;
use crate::viewport::Viewport;
use blocksmith_evaluator::filters::placeholder_image_uri;
use blocksmith_evaluator::DEFAULT_SECTION_ID;

/// CSP for the sandbox document: inline script and style only, remote
/// images and fonts allowed, nothing else.
pub const SANDBOX_CSP: &str = "default-src 'none'; img-src * data: blob:; media-src * data: blob:; \
style-src 'unsafe-inline' *; font-src * data:; script-src 'unsafe-inline'";

/// Milliseconds between applying a render and measuring its height
pub const RESIZE_DELAY_MS: u32 = 50;

const BASE_STYLE: &str = "body { margin: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; }
img { max-width: 100%; height: auto; }
.preview-error { margin: 16px; padding: 12px 16px; border-radius: 8px; background: #fff4f4; color: #d72c0d; font-family: monospace; white-space: pre-wrap; }";

const SCRIPT: &str = r#"(function () {
  var styles = document.getElementById('preview-styles');
  var content = document.getElementById('preview-content');

  document.addEventListener('error', function (event) {
    var target = event.target;
    if (target && target.tagName === 'IMG' && target.src !== PLACEHOLDER) {
      target.src = PLACEHOLDER;
    }
  }, true);

  function reportHeight() {
    setTimeout(function () {
      window.parent.postMessage({ type: 'RESIZE', height: document.body.scrollHeight }, '*');
    }, RESIZE_DELAY);
  }

  function handle(data) {
    if (!data || typeof data !== 'object' || typeof data.type !== 'string') return;
    if (data.type === 'RENDER' && typeof data.html === 'string') {
      styles.textContent = typeof data.css === 'string' ? data.css : '';
      content.innerHTML = '<div id="' + SECTION_ID + '">' + data.html + '</div>';
      reportHeight();
    } else if (data.type === 'RENDER_ERROR' && typeof data.error === 'string') {
      var box = document.createElement('div');
      box.className = 'preview-error';
      box.textContent = data.error;
      content.replaceChildren(box);
      reportHeight();
    }
  }

  window.addEventListener('message', function (event) { handle(event.data); });
  if (INITIAL) handle(INITIAL);
})();"#;

/// JSON that is safe inside a `<script>` element
fn script_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace('<', "\\u003c")
}

/// Builds the sandbox HTML document.
#[derive(Debug, Clone)]
pub struct SandboxDocument {
    initial: Option<Message>,
    viewport: Option<Viewport>,
    section_id: String,
}

impl Default for SandboxDocument {
    fn default() -> Self {
        Self {
            initial: None,
            viewport: None,
            section_id: DEFAULT_SECTION_ID.to_string(),
        }
    }
}

impl SandboxDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Section id of the content wrapper, so `#shopify-section-{id}`
    /// selectors in section CSS keep matching.
    pub fn with_section_id(mut self, id: impl Into<String>) -> Self {
        self.section_id = id.into();
        self
    }

    /// Message applied as soon as the document loads, for hosts that
    /// cannot post one (a browser opening the document directly).
    pub fn with_initial(mut self, message: Message) -> Self {
        self.initial = Some(message);
        self
    }

    /// Cap the content at a logical viewport width, for documents opened
    /// outside a sized frame.
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    pub fn build(&self) -> String {
        let initial = match &self.initial {
            Some(message) => script_json(message),
            None => "null".to_string(),
        };
        let script = format!(
            "var PLACEHOLDER = {};\nvar SECTION_ID = {};\nvar RESIZE_DELAY = {};\nvar INITIAL = {};\n{}",
            script_json(placeholder_image_uri()),
            script_json(&format!("shopify-section-{}", self.section_id)),
            RESIZE_DELAY_MS,
            initial,
            SCRIPT
        );

        let width_rule = match self.viewport {
            Some(viewport) => format!(
                "\n#preview-content {{ max-width: {}px; margin: 0 auto; }}",
                viewport.width()
            ),
            None => String::new(),
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta http-equiv="Content-Security-Policy" content="{csp}">
<meta name="viewport" content="width=device-width, initial-scale=1">
<style>
{base}{width_rule}
</style>
<style id="preview-styles"></style>
</head>
<body>
<div id="preview-content"></div>
<script>
{script}
</script>
</body>
</html>
"#,
            csp = SANDBOX_CSP,
            base = BASE_STYLE,
            width_rule = width_rule,
            script = script
        )
    }
}
