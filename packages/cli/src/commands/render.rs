use super::{initial_context, read_template, render_failure};
use crate::config::Config;
use anyhow::{anyhow, Result};
use blocksmith_evaluator::{render_with_mock, MockData, RenderOptions, RenderOutput, PRESET_IDS};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Section template to render
    pub input: PathBuf,

    /// Setting values as a JSON object, applied over schema defaults
    #[arg(short, long)]
    pub settings: Option<String>,

    /// Block instances as a JSON array (defaults to the first preset's blocks)
    #[arg(short, long)]
    pub blocks: Option<String>,

    /// Mock data preset (overrides config)
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Extra mock data as JSON, merged over the preset
    #[arg(long)]
    pub data: Option<String>,

    /// Output format (html, json)
    #[arg(short, long, default_value = "html")]
    pub format: String,
}

pub fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let source = read_template(&args.input)?;
    let (settings, blocks) = initial_context(&source, args.settings.as_deref(), args.blocks.as_deref())?;

    let preset = args.preset.as_deref().unwrap_or(&config.mock_preset);
    let data = mock_data(preset, args.data.as_deref())?;
    info!(preset, blocks = blocks.len(), "rendering {}", args.input.display());

    let options = RenderOptions::default().with_data(data);
    let output = render_with_mock(&source, &settings, &blocks, &options)
        .map_err(|err| render_failure(&source, &args.input, err))?;

    println!("{}", format_output(&output, &args.format)?);
    Ok(())
}

pub(crate) fn mock_data(preset: &str, custom: Option<&str>) -> Result<MockData> {
    let data = MockData::preset(preset).ok_or_else(|| {
        anyhow!("Unknown mock preset '{}'. Available: {}", preset, PRESET_IDS.join(", "))
    })?;
    Ok(match custom {
        Some(json) => data.merge_json(json),
        None => data,
    })
}

fn format_output(output: &RenderOutput, format: &str) -> Result<String> {
    match format {
        "json" => Ok(serde_json::to_string_pretty(output)?),
        "html" if output.css.is_empty() => Ok(output.html.clone()),
        "html" => Ok(format!("<style>\n{}\n</style>\n{}", output.css.trim(), output.html)),
        other => Err(anyhow!("Unknown format '{}'. Use: html or json", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_preset_lists_available() {
        let err = mock_data("nope", None).unwrap_err().to_string();
        assert!(err.contains("product-standard"));
    }

    #[test]
    fn test_html_output_prepends_css() {
        let output = RenderOutput {
            html: "<p>x</p>".to_string(),
            css: "p { color: red; }\n".to_string(),
        };
        assert_eq!(
            format_output(&output, "html").unwrap(),
            "<style>\np { color: red; }\n</style>\n<p>x</p>"
        );
        assert!(format_output(&output, "yaml").is_err());
    }
}
