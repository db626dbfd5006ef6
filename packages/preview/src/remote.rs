//! Storefront rendering over HTTP.

use crate::error::{TransportError, TransportResult};
use crate::limits::RemoteConfig;
use crate::request::PreviewPayload;
use crate::sanitize::sanitize_html;
use crate::token::{MemoryTokenStore, PreviewTokenStore};
use reqwest::header::{ACCEPT, COOKIE, LOCATION, USER_AGENT};
use reqwest::{redirect, Client, Response, StatusCode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, instrument, warn};
use url::Url;

const PASSWORD_MARKERS: &[&str] = &[r#"form_type="storefront_password""#, r#"id="password""#];

/// Fetches authoritative section HTML. A new [`RemoteRenderer::fetch`]
/// cancels any fetch still in flight on the same renderer.
pub struct RemoteRenderer {
    client: Client,
    config: RemoteConfig,
    tokens: Arc<dyn PreviewTokenStore>,
    generation: AtomicU64,
    superseded: Notify,
}

impl std::fmt::Debug for RemoteRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteRenderer")
            .field("config", &self.config)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}

impl RemoteRenderer {
    pub fn new(config: RemoteConfig) -> TransportResult<Self> {
        Self::with_token_store(config, Arc::new(MemoryTokenStore::default()))
    }

    pub fn with_token_store(
        config: RemoteConfig,
        tokens: Arc<dyn PreviewTokenStore>,
    ) -> TransportResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            client,
            config,
            tokens,
            generation: AtomicU64::new(0),
            superseded: Notify::new(),
        })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Render `payload` on the storefront and return sanitized HTML.
    ///
    /// Resolves to [`TransportError::Superseded`] as soon as another fetch
    /// starts on this renderer.
    #[instrument(skip_all, fields(section_id = %payload.section_id))]
    pub async fn fetch(&self, payload: &PreviewPayload) -> TransportResult<String> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.superseded.notify_waiters();

        let url = payload.build_url(&self.config, self.tokens.as_ref())?;
        tokio::select! {
            result = self.fetch_url(url) => result,
            _ = self.wait_superseded(generation) => {
                debug!(generation, "remote fetch superseded");
                Err(TransportError::Superseded)
            }
        }
    }

    async fn wait_superseded(&self, generation: u64) {
        loop {
            let notified = self.superseded.notified();
            if self.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            notified.await;
        }
    }

    async fn fetch_url(&self, url: Url) -> TransportResult<String> {
        let response = self.get(url.clone()).await?;
        let response = if response.status().is_redirection() {
            self.follow_redirect(&url, response).await?
        } else {
            response
        };

        let status = response.status();
        if !status.is_success() {
            return Err(http_error(status));
        }

        let body = response.text().await?;
        if PASSWORD_MARKERS.iter().any(|marker| body.contains(marker)) {
            warn!("storefront returned a password page");
            return Err(TransportError::Blocked("Store is password-protected".to_string()));
        }
        Ok(sanitize_html(&body))
    }

    async fn get(&self, url: Url) -> TransportResult<Response> {
        let mut request = self
            .client
            .get(url)
            .header(USER_AGENT, RemoteConfig::USER_AGENT)
            .header(ACCEPT, "text/html");
        if let Some(cookie) = &self.config.storefront_cookie {
            request = request.header(COOKIE, cookie);
        }
        Ok(request.send().await?)
    }

    /// Follow one redirect by hand. Password redirects are a block, not a
    /// page to fetch.
    async fn follow_redirect(&self, from: &Url, response: Response) -> TransportResult<Response> {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if location.contains("/password") {
            let message = if self.config.storefront_cookie.is_some() {
                "Storefront password expired or invalid"
            } else {
                "Store is password-protected - configure password in settings"
            };
            return Err(TransportError::Blocked(message.to_string()));
        }

        let target = from
            .join(&location)
            .map_err(|_| TransportError::Network("Redirect failed".to_string()))?;
        debug!(%target, "following redirect");
        self.get(target).await.map_err(|err| match err {
            TransportError::Timeout(_) => TransportError::Timeout("Redirect timeout".to_string()),
            _ => TransportError::Network("Redirect failed".to_string()),
        })
    }
}

fn http_error(status: StatusCode) -> TransportError {
    TransportError::Http {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}
