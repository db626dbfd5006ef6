use blocksmith_preview::{RemoteConfig, Viewport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "blocksmith.config.json";

/// Blocksmith configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding section templates
    #[serde(default = "default_template_dir")]
    pub template_dir: String,

    /// Mock data preset used when rendering locally
    #[serde(default = "default_mock_preset")]
    pub mock_preset: String,

    #[serde(default)]
    pub viewport: Viewport,

    /// Storefront used for native previews
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSettings {
    pub shop_domain: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_url_length_threshold")]
    pub url_length_threshold: usize,
}

fn default_template_dir() -> String {
    "sections".to_string()
}

fn default_mock_preset() -> String {
    "product-standard".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_url_length_threshold() -> usize {
    2000
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get absolute path to the template directory
    pub fn get_template_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.template_dir)
    }

    /// Remote settings for `shop`, or the configured storefront when no
    /// shop is given.
    pub fn remote_config(&self, shop: Option<&str>) -> Option<RemoteConfig> {
        let settings = self.remote.as_ref();
        let shop_domain = shop.or(settings.map(|r| r.shop_domain.as_str()))?;
        let mut config = RemoteConfig::new(shop_domain);
        if let Some(settings) = settings {
            config = config
                .with_timeout(Duration::from_secs(settings.timeout_secs))
                .with_url_length_threshold(settings.url_length_threshold);
        }
        Some(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_dir: default_template_dir(),
            mock_preset: default_mock_preset(),
            viewport: Viewport::default(),
            remote: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "templateDir": "theme/sections",
            "mockPreset": "collection-standard",
            "viewport": "mobile",
            "remote": { "shopDomain": "demo.myshopify.com", "timeoutSecs": 5 }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.template_dir, "theme/sections");
        assert_eq!(config.mock_preset, "collection-standard");
        assert_eq!(config.viewport, Viewport::Mobile);
        let remote = config.remote.as_ref().unwrap();
        assert_eq!(remote.timeout_secs, 5);
        assert_eq!(remote.url_length_threshold, 2000);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.template_dir, "sections");
        assert_eq!(config.mock_preset, "product-standard");
        assert_eq!(config.viewport, Viewport::Desktop);
        assert!(config.remote_config(None).is_none());
    }

    #[test]
    fn test_remote_config_prefers_explicit_shop() {
        let config: Config = serde_json::from_str(
            r#"{ "remote": { "shopDomain": "configured.myshopify.com", "timeoutSecs": 3 } }"#,
        )
        .unwrap();

        let remote = config.remote_config(Some("other.myshopify.com")).unwrap();
        assert_eq!(remote.shop_domain, "other.myshopify.com");
        assert_eq!(remote.timeout, Duration::from_secs(3));

        let remote = config.remote_config(None).unwrap();
        assert_eq!(remote.shop_domain, "configured.myshopify.com");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/blocksmith").unwrap();
        assert_eq!(config, Config::default());
    }
}
