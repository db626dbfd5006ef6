//! Remote render request encoding.

use crate::error::{TransportError, TransportResult};
use crate::limits::{PreviewLimits, RemoteConfig};
use crate::token::PreviewTokenStore;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use blocksmith_common::{BlockInstance, SettingsState};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

pub const DEFAULT_PROXY_SECTION_ID: &str = "preview";

/// Everything the storefront needs to render one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewPayload {
    pub code: String,
    #[serde(default)]
    pub settings: SettingsState,
    #[serde(default)]
    pub blocks: Vec<BlockInstance>,
    #[serde(default)]
    pub product_handle: Option<String>,
    #[serde(default)]
    pub collection_handle: Option<String>,
    pub section_id: String,
}

impl Default for PreviewPayload {
    fn default() -> Self {
        Self {
            code: String::new(),
            settings: SettingsState::new(),
            blocks: Vec::new(),
            product_handle: None,
            collection_handle: None,
            section_id: DEFAULT_PROXY_SECTION_ID.to_string(),
        }
    }
}

impl PreviewPayload {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    pub fn with_settings(mut self, settings: SettingsState) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_blocks(mut self, blocks: Vec<BlockInstance>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn with_product(mut self, handle: impl Into<String>) -> Self {
        self.product_handle = Some(handle.into());
        self
    }

    pub fn with_collection(mut self, handle: impl Into<String>) -> Self {
        self.collection_handle = Some(handle.into());
        self
    }

    pub fn with_section_id(mut self, id: impl Into<String>) -> Self {
        self.section_id = id.into();
        self
    }

    /// Reject payloads the proxy would refuse, before any network traffic.
    pub fn validate(&self, limits: &PreviewLimits) -> TransportResult<()> {
        if self.code.trim().is_empty() {
            return Err(TransportError::invalid("Missing code parameter"));
        }
        limits.check_code(&self.code)?;
        limits.check_section_id(&self.section_id)?;
        for handle in self.product_handle.iter().chain(self.collection_handle.iter()) {
            limits.check_handle(handle)?;
        }
        Ok(())
    }

    /// Query pairs with `code`, `settings` and `blocks` base64-encoded.
    pub fn query_pairs(&self, limits: &PreviewLimits) -> TransportResult<Vec<(&'static str, String)>> {
        let mut pairs = vec![("code", STANDARD.encode(&self.code))];
        if !self.settings.is_empty() {
            let settings = STANDARD.encode(to_json(&self.settings)?);
            limits.check_settings(&settings)?;
            pairs.push(("settings", settings));
        }
        if !self.blocks.is_empty() {
            pairs.push(("blocks", STANDARD.encode(to_json(&self.blocks)?)));
        }
        if let Some(handle) = &self.product_handle {
            pairs.push(("product", handle.clone()));
        }
        if let Some(handle) = &self.collection_handle {
            pairs.push(("collection", handle.clone()));
        }
        pairs.push(("section_id", self.section_id.clone()));
        Ok(pairs)
    }

    /// Endpoint URL carrying this payload. Past the configured length the
    /// payload goes to `tokens` and only `token=` is sent.
    pub fn build_url(&self, config: &RemoteConfig, tokens: &dyn PreviewTokenStore) -> TransportResult<Url> {
        self.validate(&config.limits)?;
        let endpoint = config.endpoint()?;

        let mut url = endpoint.clone();
        url.query_pairs_mut()
            .extend_pairs(self.query_pairs(&config.limits)?);
        if url.as_str().len() <= config.url_length_threshold {
            return Ok(url);
        }

        debug!(
            length = url.as_str().len(),
            threshold = config.url_length_threshold,
            "preview url too long, sending token"
        );
        let token = tokens.issue(self.clone());
        let mut url = endpoint;
        url.query_pairs_mut().append_pair("token", &token);
        Ok(url)
    }
}

fn to_json<T: Serialize>(value: &T) -> TransportResult<String> {
    serde_json::to_string(value).map_err(|e| TransportError::invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::MemoryTokenStore;

    fn config() -> RemoteConfig {
        RemoteConfig::new("demo.myshopify.com")
    }

    fn param(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_short_payload_goes_inline() {
        let tokens = MemoryTokenStore::default();
        let mut settings = SettingsState::new();
        settings.insert("title", "Hello");
        let payload = PreviewPayload::new("<h1>{{ title }}</h1>")
            .with_settings(settings)
            .with_product("classic-tee");
        let url = payload.build_url(&config(), &tokens).unwrap();

        let code = STANDARD.decode(param(&url, "code").unwrap()).unwrap();
        assert_eq!(String::from_utf8(code).unwrap(), "<h1>{{ title }}</h1>");
        let settings = STANDARD.decode(param(&url, "settings").unwrap()).unwrap();
        assert_eq!(String::from_utf8(settings).unwrap(), r#"{"title":"Hello"}"#);
        assert_eq!(param(&url, "product").as_deref(), Some("classic-tee"));
        assert_eq!(param(&url, "section_id").as_deref(), Some("preview"));
        assert!(param(&url, "blocks").is_none());
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_long_payload_uses_token() {
        let tokens = MemoryTokenStore::default();
        let payload = PreviewPayload::new("<p>x</p>".repeat(400));
        let url = payload.build_url(&config(), &tokens).unwrap();

        assert!(param(&url, "code").is_none());
        let token = param(&url, "token").unwrap();
        assert_eq!(tokens.redeem(&token), Some(payload));
    }

    #[test]
    fn test_oversized_code_is_size_limit() {
        let tokens = MemoryTokenStore::default();
        let err = PreviewPayload::new("x".repeat(100_001))
            .build_url(&config(), &tokens)
            .unwrap_err();
        assert!(matches!(err, TransportError::SizeLimit(_)));
    }

    #[test]
    fn test_bad_handle_rejected() {
        let tokens = MemoryTokenStore::default();
        let err = PreviewPayload::new("<p></p>")
            .with_collection("../admin")
            .build_url(&config(), &tokens)
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[test]
    fn test_empty_code_rejected() {
        let tokens = MemoryTokenStore::default();
        assert!(PreviewPayload::new("  ").build_url(&config(), &tokens).is_err());
    }
}
