use super::render::mock_data;
use super::{initial_context, read_template, render_failure};
use crate::config::Config;
use anyhow::{anyhow, Result};
use blocksmith_evaluator::RenderOptions;
use blocksmith_preview::{
    start_disposable_server, Message, PreviewError, PreviewMode, PreviewOutcome, PreviewPayload,
    PreviewServer, Previewer, RemoteRenderer, SandboxDocument, Viewport, SECURITY_HEADERS,
};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Section template to preview
    pub input: PathBuf,

    /// Render on this storefront instead of locally (overrides config)
    #[arg(short, long)]
    pub remote: Option<String>,

    /// Viewport width (mobile, tablet, desktop)
    #[arg(short, long)]
    pub viewport: Option<Viewport>,

    /// Setting values as a JSON object, applied over schema defaults
    #[arg(short, long)]
    pub settings: Option<String>,

    /// Mock data preset for local rendering (overrides config)
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Product handle for remote rendering
    #[arg(long)]
    pub product: Option<String>,

    /// Collection handle for remote rendering
    #[arg(long)]
    pub collection: Option<String>,

    /// Serve the preview on a local port and wait for a browser
    #[arg(long)]
    pub serve: bool,

    /// Seconds the preview server waits for a request
    #[arg(long, default_value = "120")]
    pub serve_timeout: u64,
}

pub fn preview(args: PreviewArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let source = read_template(&args.input)?;
    let (settings, blocks) = initial_context(&source, args.settings.as_deref(), None)?;
    let viewport = args.viewport.unwrap_or(config.viewport);

    let preset = args.preset.as_deref().unwrap_or(&config.mock_preset);
    let options = RenderOptions::default().with_data(mock_data(preset, None)?);

    let mut payload = PreviewPayload::new(source.clone())
        .with_settings(settings)
        .with_blocks(blocks);
    if let Some(handle) = &args.product {
        payload = payload.with_product(handle);
    }
    if let Some(handle) = &args.collection {
        payload = payload.with_collection(handle);
    }

    let previewer = match config.remote_config(args.remote.as_deref()) {
        Some(remote) => {
            eprintln!("🌐 Rendering on {}", remote.shop_domain.bold());
            Previewer::remote(RemoteRenderer::new(remote)?, options)
        }
        None => Previewer::local(options),
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(previewer.preview(&payload));
    let timeout = Duration::from_secs(args.serve_timeout);

    match result {
        Ok(outcome) => {
            report(&outcome, viewport);
            if args.serve {
                let headers = if outcome.mode == PreviewMode::Native { SECURITY_HEADERS } else { &[] };
                serve(outcome.document(), headers, viewport, timeout)
            } else {
                println!("{}", outcome.html);
                Ok(())
            }
        }
        Err(err) if args.serve => {
            eprintln!("{} {}", "Error:".red().bold(), err);
            let document = SandboxDocument::new().with_initial(Message::error(err.to_string()));
            serve(document, &[], viewport, timeout)
        }
        Err(PreviewError::Render(err)) => Err(render_failure(&source, &args.input, err)),
        Err(PreviewError::Transport(err)) => Err(anyhow!(err)),
    }
}

fn report(outcome: &PreviewOutcome, viewport: Viewport) {
    let mode = match outcome.mode {
        PreviewMode::Native => "native".green(),
        PreviewMode::Local => "local".cyan(),
    };
    eprintln!("   Mode: {}  Viewport: {} ({}px)", mode, viewport, viewport.width());
    if let Some(reason) = &outcome.fallback_reason {
        let label = if outcome.blocked { "Blocked:" } else { "Fallback:" };
        eprintln!("   {} {}", label.yellow().bold(), reason);
    }
}

fn serve(
    document: SandboxDocument,
    headers: &[(&str, &str)],
    viewport: Viewport,
    timeout: Duration,
) -> Result<()> {
    let mut server = PreviewServer::new(document.with_viewport(viewport).build())?;
    for (name, value) in headers {
        server = server.with_header(name, value);
    }

    let (url, handle) = start_disposable_server(server, usize::MAX, timeout);
    println!("👀 Preview at {} (stops after {}s idle)", url.bold(), timeout.as_secs());
    handle
        .join()
        .map_err(|_| anyhow!("Preview server thread panicked"))??;
    Ok(())
}
