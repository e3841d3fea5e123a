use super::{run_stream, StreamOptions, StreamRun};
use crate::config::Config;
use a2ui_protocol::{format_errors, StreamError};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

const STREAM_EXTENSIONS: [&str; 2] = ["jsonl", "ndjson"];

#[derive(Args, Debug)]
pub struct LintArgs {
    /// Input .jsonl file or directory to lint
    pub input: PathBuf,

    /// Show files without issues and the offending source lines
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface_id: Option<String>,
    pub severity: Severity,
    pub kind: &'static str,
    pub message: String,
}

pub fn lint(args: LintArgs, config: &Config) -> Result<()> {
    let json = args.format == "json";
    if !json {
        println!("🔍 {} A2UI stream linter", "Starting".green().bold());
        println!("   Input: {}", args.input.display());
        println!();
    }

    let files = if args.input.is_file() {
        vec![args.input.clone()]
    } else if args.input.is_dir() {
        let files = find_stream_files(&args.input);
        if !json {
            println!("   Found {} stream files", files.len());
            println!();
        }
        files
    } else {
        return Err(anyhow::anyhow!(
            "Input path does not exist: {}",
            args.input.display()
        ));
    };

    let options = StreamOptions {
        default_surface_id: config.default_surface_id.clone(),
        processor: config.processor_options(),
    };

    let mut all = Vec::new();
    for file in &files {
        let (run, diagnostics) = lint_file(file, &options)?;
        if !json {
            print_file(file, &run, &diagnostics, args.verbose);
        }
        all.extend(diagnostics);
    }

    let errors = all.iter().filter(|d| d.severity == Severity::Error).count();
    let warnings = all.len() - errors;

    if json {
        println!("{}", serde_json::to_string_pretty(&all)?);
    } else {
        println!();
        println!(
            "✨ {} Linting complete!",
            if errors > 0 {
                "Done".red().bold()
            } else {
                "Done".green().bold()
            }
        );
        println!("   Files checked: {}", files.len());
        if errors > 0 {
            println!("   {} {}", "Errors:".red(), errors);
        }
        if warnings > 0 {
            println!("   {} {}", "Warnings:".yellow(), warnings);
        }
        if all.is_empty() {
            println!("   {} No issues found!", "✓".green());
        }
    }

    if errors > 0 {
        return Err(anyhow::anyhow!("{} error(s) found", errors));
    }
    Ok(())
}

/// Replay one stream file and collect everything wrong with it
pub fn lint_file(path: &Path, options: &StreamOptions) -> Result<(StreamRun, Vec<Diagnostic>)> {
    let file = File::open(path)
        .map_err(|err| anyhow::anyhow!("Cannot open {}: {}", path.display(), err))?;
    let run = run_stream(BufReader::new(file), options)?;
    let diagnostics = diagnose(&path.display().to_string(), &run);
    info!(file = %path.display(), messages = run.messages, diagnostics = diagnostics.len(), "linted");
    Ok((run, diagnostics))
}

pub fn diagnose(file: &str, run: &StreamRun) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for err in &run.stream_errors {
        diagnostics.push(Diagnostic {
            file: file.to_string(),
            line: Some(err.line()),
            surface_id: None,
            severity: Severity::Error,
            kind: match err {
                StreamError::Parse(_) => "parse",
                StreamError::Validation { .. } => "validation",
            },
            message: err.to_string(),
        });
    }

    for err in &run.process_errors {
        diagnostics.push(Diagnostic {
            file: file.to_string(),
            line: None,
            surface_id: Some(err.surface_id().to_string()),
            severity: Severity::Error,
            kind: match err {
                a2ui_interpreter::ProcessError::Build { .. } => "build",
                a2ui_interpreter::ProcessError::DataModel { .. } => "dataModel",
            },
            message: err.to_string(),
        });
    }

    // Surfaces that never produce a tree
    for (id, surface) in run.processor.surfaces() {
        let warning = match &surface.root_component_id {
            None if !surface.components.is_empty() => {
                Some(("noRoot", "components defined but rendering never began".to_string()))
            }
            Some(root) if !surface.components.contains_key(root) => Some((
                "missingRoot",
                format!("root component '{}' is never defined", root),
            )),
            _ => None,
        };

        if let Some((kind, message)) = warning {
            diagnostics.push(Diagnostic {
                file: file.to_string(),
                line: None,
                surface_id: Some(id.clone()),
                severity: Severity::Warning,
                kind,
                message,
            });
        }
    }

    diagnostics
}

fn print_file(path: &Path, run: &StreamRun, diagnostics: &[Diagnostic], verbose: bool) {
    if diagnostics.is_empty() {
        if verbose {
            println!("{} {} ({} messages)", "✓".green(), path.display(), run.messages);
        }
        return;
    }

    println!("{}", path.display());
    for diagnostic in diagnostics {
        let level = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        let location = match (&diagnostic.line, &diagnostic.surface_id) {
            (Some(line), _) => format!("line {}", line),
            (None, Some(surface)) => format!("surface {}", surface),
            (None, None) => String::new(),
        };
        println!("  {} [{}] {} {}", level, diagnostic.kind, location.dimmed(), diagnostic.message);
    }

    if verbose && !run.stream_errors.is_empty() {
        eprint!("{}", format_errors(&path.display().to_string(), &run.stream_errors));
    }
    println!();
}

fn find_stream_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| STREAM_EXTENSIONS.contains(&ext))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}
