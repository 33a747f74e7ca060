use blockpad::{Applied, EditError, EditOp, Editor, EditorConfig, ConfigError, BlockType};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a JSON edit script and print the resulting workspace
    Run {
        script: PathBuf,
        /// Print the full state as JSON
        #[arg(long)]
        json: bool,
        /// Stop at the first rejected op
        #[arg(long)]
        strict: bool,
        /// Workspace config (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Apply a JSON edit script and verify the workspace invariants
    Check {
        script: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List the available block types
    Types,
}

#[derive(Debug, thiserror::Error)]
enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid script: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("step {step}: script must be an array of objects")]
    NotAnObject { step: usize },
    #[error("step {step}: unknown label {label}")]
    UnknownLabel { step: usize, label: String },
    #[error("step {step} ({op}): {source}")]
    Rejected {
        step: usize,
        op: &'static str,
        source: EditError,
    },
}

#[derive(Serialize)]
struct RunReport<'a> {
    applied: usize,
    rejected: usize,
    state: &'a blockpad::EditorState,
}

/// Label bound to the id of the page every workspace starts with.
const FIRST_PAGE_LABEL: &str = "first_page";

const PREVIEW_GRAPHEMES: usize = 48;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let code = match &cli.command {
        Commands::Run {
            script,
            json,
            strict,
            config,
        } => run_command(script, *json, *strict, config.as_deref()),
        Commands::Check { script, config } => check_command(script, config.as_deref()),
        Commands::Types => types_command(),
    };
    std::process::exit(code);
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},blockpad={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

struct Outcome {
    editor: Editor,
    applied: usize,
    rejected: usize,
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig, ScriptError> {
    match path {
        Some(path) => Ok(EditorConfig::load(path)?),
        None => Ok(EditorConfig::default()),
    }
}

fn run_script(script: &Path, config: EditorConfig, strict: bool) -> Result<Outcome, ScriptError> {
    let text = fs::read_to_string(script)?;
    let steps: Vec<Value> = serde_json::from_str(&text)?;

    let mut editor = Editor::with_config(config);
    let mut labels: HashMap<String, String> = HashMap::new();
    if let Some(page) = editor.current_page() {
        labels.insert(FIRST_PAGE_LABEL.to_string(), page.id.to_string());
    }

    let (mut applied, mut rejected) = (0, 0);
    for (step, value) in steps.into_iter().enumerate() {
        let Value::Object(mut fields) = value else {
            return Err(ScriptError::NotAnObject { step });
        };
        let label = fields
            .remove("as")
            .and_then(|v| v.as_str().map(str::to_string));
        resolve_labels(&mut fields, &labels, step)?;
        let op: EditOp = serde_json::from_value(Value::Object(fields))?;
        let name = op.name();

        match editor.dispatch(op) {
            Ok(outcome) => {
                applied += 1;
                tracing::info!(step, op = name, "applied");
                let created = match outcome {
                    Applied::BlockAdded(id) => Some(id.to_string()),
                    Applied::PageAdded(id) => Some(id.to_string()),
                    Applied::Done => None,
                };
                if let (Some(label), Some(id)) = (label, created) {
                    labels.insert(label, id);
                }
            }
            Err(source) if strict => {
                return Err(ScriptError::Rejected {
                    step,
                    op: name,
                    source,
                });
            }
            Err(err) => {
                rejected += 1;
                tracing::warn!(step, op = name, %err, "op rejected, continuing");
            }
        }
    }

    Ok(Outcome {
        editor,
        applied,
        rejected,
    })
}

/// Replace `$label` references in `id` and `ids` with bound ids.
fn resolve_labels(
    fields: &mut Map<String, Value>,
    labels: &HashMap<String, String>,
    step: usize,
) -> Result<(), ScriptError> {
    let resolve = |value: &mut Value| -> Result<(), ScriptError> {
        if let Value::String(text) = value
            && let Some(label) = text.strip_prefix('$')
        {
            let id = labels.get(label).ok_or_else(|| ScriptError::UnknownLabel {
                step,
                label: label.to_string(),
            })?;
            *value = Value::String(id.clone());
        }
        Ok(())
    };

    if let Some(value) = fields.get_mut("id") {
        resolve(value)?;
    }
    if let Some(Value::Array(values)) = fields.get_mut("ids") {
        for value in values {
            resolve(value)?;
        }
    }
    Ok(())
}

fn run_command(script: &Path, json: bool, strict: bool, config: Option<&Path>) -> i32 {
    let outcome = match load_config(config).and_then(|config| run_script(script, config, strict)) {
        Ok(outcome) => outcome,
        Err(err @ ScriptError::Rejected { .. }) => {
            eprintln!("Error: {err}");
            return 2;
        }
        Err(err) => {
            eprintln!("Error: {err}");
            return 1;
        }
    };

    if json {
        let report = RunReport {
            applied: outcome.applied,
            rejected: outcome.rejected,
            state: outcome.editor.state(),
        };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("Error: {err}");
                return 1;
            }
        }
    } else {
        print_outline(&outcome.editor);
        println!(
            "Applied {} ops, rejected {}",
            outcome.applied, outcome.rejected
        );
    }
    0
}

fn print_outline(editor: &Editor) {
    let current = editor.current_page().map(|page| page.id);
    let active = editor.state().active_block_id();
    for page in editor.pages() {
        let marker = if Some(page.id) == current { '*' } else { ' ' };
        println!("{marker} {}", page.title);
        let blocks = editor.page_blocks(page.id);
        if blocks.is_empty() {
            println!("    (empty)");
        }
        for block in blocks {
            let focus = if Some(block.id) == active { '>' } else { ' ' };
            println!(
                "  {focus} {}. [{}] {}",
                block.order,
                block.block_type(),
                block.preview(PREVIEW_GRAPHEMES)
            );
        }
    }
}

fn check_command(script: &Path, config: Option<&Path>) -> i32 {
    let outcome = match load_config(config).and_then(|config| run_script(script, config, false)) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("Error: {err}");
            return 1;
        }
    };
    match outcome.editor.state().check_invariants() {
        Ok(()) => {
            println!("Invariants hold.");
            0
        }
        Err(violation) => {
            println!("Invariant violated: {violation}");
            1
        }
    }
}

fn types_command() -> i32 {
    for block_type in BlockType::all() {
        println!(
            "{:<14} {:<14} {}",
            block_type.to_string(),
            block_type.label(),
            block_type.description()
        );
    }
    0
}
