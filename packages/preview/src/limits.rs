//! Size caps and remote endpoint settings.

use crate::error::{TransportError, TransportResult};
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// Payload caps enforced before anything leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewLimits {
    pub max_code_length: usize,
    pub max_settings_length: usize,
    pub max_section_id_length: usize,
    pub max_handle_length: usize,
}

impl Default for PreviewLimits {
    fn default() -> Self {
        Self {
            max_code_length: 100_000,
            max_settings_length: 70_000,
            max_section_id_length: 64,
            max_handle_length: 255,
        }
    }
}

impl PreviewLimits {
    pub fn check_code(&self, code: &str) -> TransportResult<()> {
        if code.len() > self.max_code_length {
            return Err(TransportError::size_limit("Code", self.max_code_length));
        }
        Ok(())
    }

    pub fn check_settings(&self, encoded: &str) -> TransportResult<()> {
        if encoded.len() > self.max_settings_length {
            return Err(TransportError::size_limit("Settings", self.max_settings_length));
        }
        Ok(())
    }

    /// Product or collection handle: letters, digits and hyphens
    pub fn check_handle(&self, handle: &str) -> TransportResult<()> {
        static HANDLE: OnceLock<Regex> = OnceLock::new();
        let pattern = HANDLE.get_or_init(|| Regex::new(r"(?i)^[a-z0-9-]+$").expect("static regex"));
        if handle.len() > self.max_handle_length || !pattern.is_match(handle) {
            return Err(TransportError::invalid(format!("Invalid resource handle: {}", handle)));
        }
        Ok(())
    }

    /// Section id: letters, digits, hyphens and underscores
    pub fn check_section_id(&self, id: &str) -> TransportResult<()> {
        static SECTION_ID: OnceLock<Regex> = OnceLock::new();
        let pattern =
            SECTION_ID.get_or_init(|| Regex::new(r"(?i)^[a-z0-9_-]+$").expect("static regex"));
        if id.len() > self.max_section_id_length || !pattern.is_match(id) {
            return Err(TransportError::invalid(format!("Invalid section id: {}", id)));
        }
        Ok(())
    }
}

/// Where and how the storefront renderer is reached.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    /// Storefront host, e.g. `demo.myshopify.com`, or a full base URL
    pub shop_domain: String,
    pub endpoint_path: String,
    pub timeout: Duration,
    /// Longer request URLs switch to token transport
    pub url_length_threshold: usize,
    /// Sent as `Cookie` for password-protected storefronts
    pub storefront_cookie: Option<String>,
    pub limits: PreviewLimits,
}

impl RemoteConfig {
    pub const USER_AGENT: &'static str = "Blocksmith-Preview-Proxy/1.0";

    pub fn new(shop_domain: impl Into<String>) -> Self {
        Self {
            shop_domain: shop_domain.into(),
            endpoint_path: "/apps/blocksmith-preview".to_string(),
            timeout: Duration::from_secs(10),
            url_length_threshold: 2000,
            storefront_cookie: None,
            limits: PreviewLimits::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_url_length_threshold(mut self, threshold: usize) -> Self {
        self.url_length_threshold = threshold;
        self
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.storefront_cookie = Some(cookie.into());
        self
    }

    /// Endpoint URL. A bare host gets `https://`.
    pub fn endpoint(&self) -> TransportResult<url::Url> {
        let base = if self.shop_domain.contains("://") {
            self.shop_domain.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", self.shop_domain.trim_end_matches('/'))
        };
        url::Url::parse(&format!("{}{}", base, self.endpoint_path))
            .map_err(|e| TransportError::invalid(format!("Invalid shop domain: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RemoteConfig::new("demo.myshopify.com");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.url_length_threshold, 2000);
        assert_eq!(config.limits.max_code_length, 100_000);
        assert_eq!(
            config.endpoint().unwrap().as_str(),
            "https://demo.myshopify.com/apps/blocksmith-preview"
        );
    }

    #[test]
    fn test_full_base_url_kept() {
        let config = RemoteConfig::new("http://127.0.0.1:8080/");
        assert_eq!(
            config.endpoint().unwrap().as_str(),
            "http://127.0.0.1:8080/apps/blocksmith-preview"
        );
    }

    #[test]
    fn test_handles() {
        let limits = PreviewLimits::default();
        assert!(limits.check_handle("classic-tee-2").is_ok());
        assert!(limits.check_handle("tee shirt").is_err());
        assert!(limits.check_handle("").is_err());
        assert!(limits.check_handle(&"a".repeat(256)).is_err());
    }

    #[test]
    fn test_section_ids() {
        let limits = PreviewLimits::default();
        assert!(limits.check_section_id("main_product-1").is_ok());
        assert!(limits.check_section_id("<script>").is_err());
        assert!(limits.check_section_id(&"s".repeat(65)).is_err());
    }

    #[test]
    fn test_code_cap_is_size_limit() {
        let limits = PreviewLimits::default();
        let err = limits.check_code(&"x".repeat(100_001)).unwrap_err();
        assert!(matches!(err, TransportError::SizeLimit(_)));
    }
}
