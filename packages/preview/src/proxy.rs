//! Storefront side of the remote render: decode the request and wrap the
//! template so the theme engine renders it as a standalone section.

use crate::error::{TransportError, TransportResult};
use crate::limits::PreviewLimits;
use crate::request::{PreviewPayload, DEFAULT_PROXY_SECTION_ID};
use crate::token::PreviewTokenStore;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use blocksmith_common::{strip_schema, BlockInstance, SettingsState};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::OnceLock;
use tracing::{debug, instrument};

const WRAPPER_STYLE: &str = "<style>
.blocksmith-preview { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; }
.blocksmith-preview img { max-width: 100%; height: auto; }
</style>";

fn decode_text(field: &str, encoded: &str) -> TransportResult<String> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|_| TransportError::invalid(format!("Invalid base64 in {}", field)))?;
    String::from_utf8(bytes).map_err(|_| TransportError::invalid(format!("Invalid UTF-8 in {}", field)))
}

/// Decode a proxy query string into a payload.
///
/// `token=` is redeemed from `tokens`; otherwise `code` is required and
/// `settings`/`blocks` are base64 JSON.
#[instrument(skip_all)]
pub fn parse_proxy_params(
    query: &str,
    tokens: &dyn PreviewTokenStore,
    limits: &PreviewLimits,
) -> TransportResult<PreviewPayload> {
    let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    if let Some(token) = params.get("token") {
        let payload = tokens
            .redeem(token)
            .ok_or_else(|| TransportError::invalid("Preview token expired or unknown"))?;
        payload.validate(limits)?;
        debug!("redeemed preview token");
        return Ok(payload);
    }

    let encoded_code = params
        .get("code")
        .ok_or_else(|| TransportError::invalid("Missing code parameter"))?;
    let code = decode_text("code", encoded_code)?;

    let settings = match params.get("settings") {
        Some(encoded) => {
            limits.check_settings(encoded)?;
            match serde_json::from_str::<Value>(&decode_text("settings", encoded)?) {
                Ok(value @ Value::Object(_)) => serde_json::from_value::<SettingsState>(value)
                    .map_err(|e| TransportError::invalid(e.to_string()))?,
                _ => return Err(TransportError::invalid("Settings must be a JSON object")),
            }
        }
        None => SettingsState::new(),
    };

    let blocks = match params.get("blocks") {
        Some(encoded) => serde_json::from_str::<Vec<BlockInstance>>(&decode_text("blocks", encoded)?)
            .map_err(|_| TransportError::invalid("Blocks must be a JSON array"))?,
        None => Vec::new(),
    };

    let payload = PreviewPayload {
        code,
        settings,
        blocks,
        product_handle: params.get("product").filter(|h| !h.is_empty()).cloned(),
        collection_handle: params.get("collection").filter(|h| !h.is_empty()).cloned(),
        section_id: params
            .get("section_id")
            .filter(|id| !id.is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_PROXY_SECTION_ID.to_string()),
    };
    payload.validate(limits)?;
    Ok(payload)
}

/// Single-quoted template string literal
fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// `{% assign %}` lines for the resource handles and scalar settings,
/// followed by the schema-free template inside a section wrapper.
pub fn wrap_for_proxy(payload: &PreviewPayload) -> String {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    let ident = IDENT.get_or_init(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("static regex"));

    let mut assigns = String::new();
    if let Some(handle) = &payload.product_handle {
        let _ = writeln!(assigns, "{{% assign product = all_products[{}] %}}", quote(handle));
    }
    if let Some(handle) = &payload.collection_handle {
        let _ = writeln!(assigns, "{{% assign collection = collections[{}] %}}", quote(handle));
    }
    for (key, value) in payload.settings.iter() {
        if !ident.is_match(key) {
            continue;
        }
        let literal = match value {
            Value::String(s) => quote(s),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        let _ = writeln!(assigns, "{{% assign {} = {} %}}", key, literal);
    }

    format!(
        "{}\n<div class=\"blocksmith-preview\" id=\"shopify-section-{}\">\n{}\n</div>\n{}",
        assigns.trim_end(),
        payload.section_id,
        strip_schema(&payload.code).trim(),
        WRAPPER_STYLE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::RemoteConfig;
    use crate::token::MemoryTokenStore;
    use pretty_assertions::assert_eq;

    fn limits() -> PreviewLimits {
        PreviewLimits::default()
    }

    #[test]
    fn test_round_trip_through_url() {
        let tokens = MemoryTokenStore::default();
        let mut settings = SettingsState::new();
        settings.insert("heading", "It's here");
        let sent = PreviewPayload::new("<h2>{{ heading }}</h2>")
            .with_settings(settings)
            .with_blocks(vec![BlockInstance::new("block-1", "slide")])
            .with_collection("frontpage")
            .with_section_id("hero_1");
        let url = sent.build_url(&RemoteConfig::new("demo.myshopify.com"), &tokens).unwrap();

        let received = parse_proxy_params(url.query().unwrap(), &tokens, &limits()).unwrap();
        assert_eq!(received, sent);
    }

    #[test]
    fn test_token_redeemed() {
        let tokens = MemoryTokenStore::default();
        let payload = PreviewPayload::new("<p>big</p>");
        let token = tokens.issue(payload.clone());
        let parsed = parse_proxy_params(&format!("token={}", token), &tokens, &limits()).unwrap();
        assert_eq!(parsed, payload);
    }

    #[test]
    fn test_missing_code() {
        let tokens = MemoryTokenStore::default();
        let err = parse_proxy_params("section_id=x", &tokens, &limits()).unwrap_err();
        assert_eq!(err.to_string(), "Missing code parameter");
    }

    #[test]
    fn test_settings_must_be_object() {
        let tokens = MemoryTokenStore::default();
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("code", &STANDARD.encode("<p></p>"))
            .append_pair("settings", &STANDARD.encode("[1,2]"))
            .finish();
        let err = parse_proxy_params(&query, &tokens, &limits()).unwrap_err();
        assert_eq!(err.to_string(), "Settings must be a JSON object");
    }

    #[test]
    fn test_wrap_emits_assigns_and_wrapper() {
        let mut settings = SettingsState::new();
        settings.insert("title", "Rock 'n' roll");
        settings.insert("count", 3);
        settings.insert("show", true);
        settings.insert("bad-key", "skipped");
        settings.insert("list", serde_json::json!([1]));
        let payload = PreviewPayload::new(
            "<h1>{{ title }}</h1>\n{% schema %}{\"name\":\"X\"}{% endschema %}",
        )
        .with_settings(settings)
        .with_product("tee");

        let wrapped = wrap_for_proxy(&payload);
        let expected = "{% assign product = all_products['tee'] %}\n\
{% assign count = 3 %}\n\
{% assign show = true %}\n\
{% assign title = 'Rock \\'n\\' roll' %}\n\
<div class=\"blocksmith-preview\" id=\"shopify-section-preview\">\n\
<h1>{{ title }}</h1>\n\
</div>\n";
        assert!(wrapped.starts_with(expected), "{}", wrapped);
        assert!(wrapped.ends_with("</style>"));
        assert!(!wrapped.contains("schema"));
    }
}
