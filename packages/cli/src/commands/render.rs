use super::{run_stream, StreamOptions, StreamRun};
use crate::config::{Config, OutputFormat};
use a2ui_interpreter::{walk_node, BoundValue, MessageProcessor, ResolvedNode, Visitor};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use serde_json::{json, Map, Value};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// NDJSON message stream; stdin when omitted or `-`
    pub input: Option<PathBuf>,

    /// Only print this surface
    #[arg(short, long)]
    pub surface: Option<String>,

    /// Output format (overrides config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Keep JSON-looking strings in the data model as plain strings
    #[arg(long)]
    pub no_json_strings: bool,

    /// Surface for messages without a surfaceId (overrides config)
    #[arg(long)]
    pub default_surface: Option<String>,
}

pub fn render(args: RenderArgs, config: &Config) -> Result<()> {
    let mut options = StreamOptions {
        default_surface_id: args
            .default_surface
            .clone()
            .unwrap_or_else(|| config.default_surface_id.clone()),
        processor: config.processor_options(),
    };
    if args.no_json_strings {
        options.processor.parse_json_strings = false;
    }

    let run = match &args.input {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path)
                .map_err(|err| anyhow!("Cannot open {}: {}", path.display(), err))?;
            run_stream(BufReader::new(file), &options)?
        }
        _ => run_stream(io::stdin().lock(), &options)?,
    };
    debug!(
        messages = run.messages,
        problems = run.problem_count(),
        surfaces = run.processor.surfaces().len(),
        "stream replayed"
    );

    for err in &run.stream_errors {
        eprintln!("{} {}", "warning:".yellow().bold(), err);
    }
    for err in &run.process_errors {
        eprintln!("{} {}", "warning:".yellow().bold(), err);
    }

    let format = args.format.unwrap_or(config.output_format);
    print!("{}", format_output(&run, format, args.surface.as_deref())?);
    Ok(())
}

/// Render every surface (or just `only`) in the requested format
pub fn format_output(run: &StreamRun, format: OutputFormat, only: Option<&str>) -> Result<String> {
    let processor = &run.processor;
    let ids: Vec<&str> = match only {
        Some(id) if processor.surface(id).is_none() => {
            return Err(anyhow!("No surface named '{}' in the stream", id));
        }
        Some(id) => vec![id],
        None => processor.surfaces().keys().map(String::as_str).collect(),
    };

    match format {
        OutputFormat::Json => {
            let mut surfaces = Map::new();
            for id in ids {
                surfaces.insert(id.to_string(), surface_json(processor, id)?);
            }
            Ok(format!("{}\n", serde_json::to_string_pretty(&Value::Object(surfaces))?))
        }
        OutputFormat::Outline => {
            let mut out = String::new();
            for id in ids {
                out.push_str(&outline(processor, id));
            }
            Ok(out)
        }
    }
}

fn surface_json(processor: &MessageProcessor, surface_id: &str) -> Result<Value> {
    let surface = processor
        .surface(surface_id)
        .ok_or_else(|| anyhow!("Unknown surface '{}'", surface_id))?;

    Ok(json!({
        "root": surface.root_component_id,
        "styles": surface.styles,
        "tree": serde_json::to_value(&surface.component_tree)?,
        "buildError": surface.build_error.as_ref().map(|err| err.to_string()),
    }))
}

/// Indented one-line-per-node listing with bound values resolved
pub fn outline(processor: &MessageProcessor, surface_id: &str) -> String {
    let mut printer = OutlinePrinter {
        processor,
        surface_id,
        depth: 1,
        out: format!("{}\n", surface_id.bold()),
    };

    match processor.surface(surface_id) {
        Some(surface) => {
            if let Some(err) = &surface.build_error {
                printer.line(&format!("{} {}", "build failed:".red(), err.to_string().replace('\n', " ")));
            }
            match &surface.component_tree {
                Some(tree) => printer.visit_node(tree),
                None => printer.line(&"(empty)".dimmed().to_string()),
            }
        }
        None => printer.line(&"(no such surface)".dimmed().to_string()),
    }

    printer.out
}

struct OutlinePrinter<'a> {
    processor: &'a MessageProcessor,
    surface_id: &'a str,
    depth: usize,
    out: String,
}

impl OutlinePrinter<'_> {
    fn line(&mut self, text: &str) {
        self.out.push_str(&"  ".repeat(self.depth));
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn describe(&self, node: &ResolvedNode) -> String {
        let mut text = format!("{} {}", node.component_type.as_str().cyan(), node.id);
        if node.data_context_path != "/" {
            text.push_str(&format!(" {}", format!("[{}]", node.data_context_path).dimmed()));
        }

        for (key, value) in &node.properties {
            if !BoundValue::is_bound(value) {
                continue;
            }
            let resolved = self
                .processor
                .resolve_bound(self.surface_id, node, key)
                .unwrap_or(Value::Null);
            text.push_str(&format!(" {}={}", key, resolved));
        }
        text
    }
}

impl Visitor for OutlinePrinter<'_> {
    fn visit_node(&mut self, node: &ResolvedNode) {
        let text = self.describe(node);
        self.line(&text);
        self.depth += 1;
        walk_node(self, node);
        self.depth -= 1;
    }

    fn visit_missing(&mut self) {
        self.line(&"(missing)".dimmed().to_string());
    }
}
