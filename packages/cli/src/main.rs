mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{diff, preview, render, validate, DiffArgs, PreviewArgs, RenderArgs, ValidateArgs};

/// Blocksmith - render, validate and preview Liquid section templates
#[derive(Parser, Debug)]
#[command(name = "blocksmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a section with mock data
    Render(RenderArgs),

    /// Check section schemas and tag balance
    Validate(ValidateArgs),

    /// Line diff between two templates
    Diff(DiffArgs),

    /// Preview a section locally or on a storefront
    Preview(PreviewArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Render(args) => render(args, &cwd),
        Command::Validate(args) => validate(args, &cwd),
        Command::Diff(args) => diff(args, &cwd),
        Command::Preview(args) => preview(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
