use super::read_template;
use crate::config::Config;
use anyhow::{anyhow, Result};
use blocksmith_linter::{validate_schema, Finding, Severity, ValidationResult};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Template file or directory (defaults to the configured template dir)
    pub input: Option<PathBuf>,

    /// Show passing files too
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

#[derive(Serialize)]
struct FileReport<'a> {
    path: String,
    #[serde(flatten)]
    result: &'a ValidationResult,
}

pub fn validate(args: ValidateArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| config.get_template_dir(cwd));

    let files = if input.is_file() {
        vec![input.clone()]
    } else if input.is_dir() {
        find_template_files(&input)
    } else {
        return Err(anyhow!("Input path does not exist: {}", input.display()));
    };

    let mut results = Vec::with_capacity(files.len());
    for file in &files {
        let source = read_template(file)?;
        results.push((file.clone(), validate_schema(&source)));
    }

    let total_errors: usize = results.iter().map(|(_, r)| r.errors.len()).sum();
    let total_warnings: usize = results.iter().map(|(_, r)| r.warnings.len()).sum();

    match args.format.as_str() {
        "json" => {
            let reports: Vec<FileReport> = results
                .iter()
                .map(|(path, result)| FileReport {
                    path: path.display().to_string(),
                    result,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        "text" => {
            println!("🔍 {} Blocksmith Validator", "Starting".green().bold());
            println!("   Input: {}", input.display());
            println!();
            for (path, result) in &results {
                print_file(path, result, args.verbose);
            }
            print_summary(results.len(), total_errors, total_warnings);
        }
        other => return Err(anyhow!("Unknown format '{}'. Use: text or json", other)),
    }

    if total_errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn print_file(path: &Path, result: &ValidationResult, verbose: bool) {
    if result.errors.is_empty() && result.warnings.is_empty() {
        if verbose {
            println!("{} {}", "✓".green(), path.display());
        }
        return;
    }

    println!("{}", path.display());
    for finding in result.errors.iter().chain(result.warnings.iter()) {
        print_finding(finding);
    }
    println!();
}

fn print_finding(finding: &Finding) {
    let level = match finding.severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
    };
    println!("  {} [{}] {}", level, finding.rule_id, finding.message);
    if let Some(suggestion) = &finding.suggestion {
        println!("    {} {}", "💡".dimmed(), suggestion.dimmed());
    }
}

fn print_summary(files: usize, errors: usize, warnings: usize) {
    println!(
        "✨ {} Validation complete!",
        if errors > 0 {
            "Done".red().bold()
        } else {
            "Done".green().bold()
        }
    );
    println!("   Files checked: {}", files);
    if errors > 0 {
        println!("   {} {}", "Errors:".red(), errors);
    }
    if warnings > 0 {
        println!("   {} {}", "Warnings:".yellow(), warnings);
    }
    if errors == 0 && warnings == 0 {
        println!("   {} No issues found!", "✓".green());
    }
}

/// `.liquid` files under `dir`, in path order
fn find_template_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == "liquid"))
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_finds_liquid_files_recursively() {
        let dir = std::env::temp_dir().join(format!("blocksmith-validate-{}", std::process::id()));
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("hero.liquid"), "").unwrap();
        fs::write(dir.join("nested/footer.liquid"), "").unwrap();
        fs::write(dir.join("notes.md"), "").unwrap();

        let files = find_template_files(&dir);
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(&dir).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["hero.liquid", "nested/footer.liquid"]);

        fs::remove_dir_all(&dir).unwrap();
    }
}
