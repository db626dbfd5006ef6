use super::read_template;
use anyhow::{anyhow, Result};
use blocksmith_diff::{calculate_diff, DiffResult, LineKind};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Original template
    pub old: PathBuf,

    /// Changed template
    pub new: PathBuf,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn diff(args: DiffArgs, _cwd: &str) -> Result<()> {
    let old = read_template(&args.old)?;
    let new = read_template(&args.new)?;
    let result = calculate_diff(&old, &new);

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        "text" => print_text(&args, &result),
        other => return Err(anyhow!("Unknown format '{}'. Use: text or json", other)),
    }
    Ok(())
}

fn print_text(args: &DiffArgs, result: &DiffResult) {
    if !result.has_diff {
        println!("{} No changes", "✓".green());
        return;
    }

    println!("{}", format!("--- {}", args.old.display()).bold());
    println!("{}", format!("+++ {}", args.new.display()).bold());
    for hunk in &result.hunks {
        println!("{}", hunk.header().cyan());
        for line in &hunk.lines {
            let text = format!("{}{}", line.kind.marker(), line.content);
            match line.kind {
                LineKind::Add => println!("{}", text.green()),
                LineKind::Remove => println!("{}", text.red()),
                LineKind::Unchanged => println!("{}", text),
            }
        }
    }
    println!();
    println!(
        "{} {}, {} {}",
        result.stats.additions.to_string().green(),
        "additions".green(),
        result.stats.deletions.to_string().red(),
        "deletions".red()
    );
}
