//! Section preview transport.
//!
//! Two strategies sit behind [`Previewer`]: a local render through the
//! template pipeline, or authoritative HTML fetched from the storefront.
//! Remote failures other than author-fixable ones fall back to the local
//! render.

pub mod error;
pub mod limits;
pub mod message;
pub mod proxy;
pub mod remote;
pub mod request;
pub mod sandbox;
pub mod sanitize;
pub mod server;
pub mod token;
pub mod viewport;

pub use error::{TransportError, TransportResult};
pub use limits::{PreviewLimits, RemoteConfig};
pub use message::Message;
pub use proxy::{parse_proxy_params, wrap_for_proxy};
pub use remote::RemoteRenderer;
pub use request::{PreviewPayload, DEFAULT_PROXY_SECTION_ID};
pub use sandbox::SandboxDocument;
pub use sanitize::{sanitize_html, SECURITY_HEADERS};
pub use server::{start_disposable_server, PreviewServer};
pub use token::{MemoryTokenStore, PreviewTokenStore};
pub use viewport::{SurfaceFit, Viewport, MIN_SURFACE_HEIGHT};

use blocksmith_evaluator::{render_with_mock, RenderError, RenderOptions, RenderOutput};
use serde::Serialize;
use thiserror::Error;
use tracing::{instrument, warn};

/// Shown in place of a section with no source
pub const EMPTY_PREVIEW_HTML: &str =
    r#"<p style="color:#6d7175;text-align:center;">No code to preview</p>"#;

#[derive(Error, Debug)]
pub enum PreviewError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewMode {
    /// Rendered in-process by the template pipeline
    Local,
    /// Rendered by the storefront
    Native,
}

/// What ended up on screen, and why if it is not what was asked for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewOutcome {
    pub mode: PreviewMode,
    /// Id the section wrapper carries, `shopify-section-{id}`
    pub section_id: String,
    pub html: String,
    pub css: String,
    /// Remote failure that caused a local fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    /// Set when the fallback came from a storefront auth challenge
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub blocked: bool,
}

impl PreviewOutcome {
    fn local(output: RenderOutput, section_id: &str) -> Self {
        Self {
            mode: PreviewMode::Local,
            section_id: section_id.to_string(),
            html: output.html,
            css: output.css,
            fallback_reason: None,
            blocked: false,
        }
    }

    /// The sandbox message that displays this outcome
    pub fn message(&self) -> Message {
        Message::Render {
            html: self.html.clone(),
            css: self.css.clone(),
        }
    }

    /// Sandbox document showing this outcome on load
    pub fn document(&self) -> SandboxDocument {
        SandboxDocument::new()
            .with_section_id(&self.section_id)
            .with_initial(self.message())
    }
}

pub enum PreviewStrategy {
    Local,
    Remote(RemoteRenderer),
}

/// Produces preview HTML for a payload with one strategy.
pub struct Previewer {
    strategy: PreviewStrategy,
    options: RenderOptions,
}

impl Previewer {
    pub fn local(options: RenderOptions) -> Self {
        Self {
            strategy: PreviewStrategy::Local,
            options,
        }
    }

    pub fn remote(renderer: RemoteRenderer, options: RenderOptions) -> Self {
        Self {
            strategy: PreviewStrategy::Remote(renderer),
            options,
        }
    }

    pub fn strategy(&self) -> &PreviewStrategy {
        &self.strategy
    }

    /// Render `payload`.
    ///
    /// Local render errors are returned as is. Remote timeouts, network
    /// and HTTP failures and auth challenges degrade to the local render;
    /// size and parameter errors do not.
    #[instrument(skip_all)]
    pub async fn preview(&self, payload: &PreviewPayload) -> Result<PreviewOutcome, PreviewError> {
        if payload.code.trim().is_empty() {
            let output = RenderOutput {
                html: EMPTY_PREVIEW_HTML.to_string(),
                css: String::new(),
            };
            return Ok(PreviewOutcome::local(output, &self.options.section_id));
        }

        let renderer = match &self.strategy {
            PreviewStrategy::Local => return self.render_local(payload),
            PreviewStrategy::Remote(renderer) => renderer,
        };

        match renderer.fetch(payload).await {
            Ok(html) => Ok(PreviewOutcome {
                mode: PreviewMode::Native,
                section_id: payload.section_id.clone(),
                html,
                css: String::new(),
                fallback_reason: None,
                blocked: false,
            }),
            Err(err) if err.degrades_to_local() => {
                warn!(error = %err, "remote preview failed, rendering locally");
                let mut outcome = self.render_local(payload)?;
                outcome.blocked = err.is_blocked();
                outcome.fallback_reason = Some(err.to_string());
                Ok(outcome)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn render_local(&self, payload: &PreviewPayload) -> Result<PreviewOutcome, PreviewError> {
        let output = render_with_mock(&payload.code, &payload.settings, &payload.blocks, &self.options)?;
        Ok(PreviewOutcome::local(output, &self.options.section_id))
    }
}
