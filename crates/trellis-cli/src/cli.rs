//! Command-line interface for the trellis utility
//!
//! Provides a CLI to parse a diagram into its component graph and to diff two
//! diagram files by name.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use trellis::core::logging::init_logging;
use trellis::diff::{diff, ChangeKind, DiffReport, GraphSnapshot};
use trellis::parser::{ParsedGraph, PlantUmlParser};
use uuid::Uuid;

/// Trellis - parse and diff PlantUML-like architecture diagrams
#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Parse PlantUML-like architecture diagrams into component graphs and diff them")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Output format options
#[derive(Copy, Clone, Debug, Default, clap::ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a diagram and print its component graph
    Parse {
        /// Input file containing diagram source (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Diff two diagram files and print the change report
    Diff {
        /// Base diagram file
        base: PathBuf,

        /// Target diagram file
        target: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Application driver for the CLI
pub struct TrellisApp;

impl TrellisApp {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&mut self, cli: Cli) -> Result<()> {
        if let Err(e) = init_logging(Some(cli.log_level.as_str()), Some(cli.log_format.as_str())) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        match cli.command {
            Commands::Parse { input, format } => self.run_parse(input.as_deref(), format),
            Commands::Diff {
                base,
                target,
                format,
            } => self.run_diff(&base, &target, format),
        }
    }

    fn run_parse(&self, input: Option<&Path>, format: OutputFormat) -> Result<()> {
        let source = read_input(input)?;
        let graph = PlantUmlParser::new().parse(&source)?;

        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&graph)?),
            OutputFormat::Text => print_graph(&graph),
        }
        Ok(())
    }

    fn run_diff(&self, base: &Path, target: &Path, format: OutputFormat) -> Result<()> {
        let base_snapshot = load_snapshot(base)?;
        let target_snapshot = load_snapshot(target)?;
        let report = diff(&base_snapshot, &target_snapshot);

        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Text => print_report(&report),
        }
        Ok(())
    }
}

impl Default for TrellisApp {
    fn default() -> Self {
        Self::new()
    }
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

fn load_snapshot(path: &Path) -> Result<GraphSnapshot> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let graph = PlantUmlParser::new()
        .parse(&source)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(GraphSnapshot::from_parsed(Uuid::new_v4(), &graph))
}

fn print_graph(graph: &ParsedGraph) {
    println!("components ({}):", graph.node_count());
    for node in &graph.nodes {
        println!("  {:<16} {}", node.component_type, node.name);
    }

    println!("relationships ({}):", graph.edge_count());
    for edge in &graph.edges {
        let arrow = if edge.direction.is_bidirectional() {
            "<->"
        } else {
            "->"
        };
        let source = graph
            .node(edge.source)
            .map(|n| n.name.as_str())
            .unwrap_or("?");
        let target = graph
            .node(edge.target)
            .map(|n| n.name.as_str())
            .unwrap_or("?");
        match &edge.label {
            Some(label) => println!("  {} {} {} : {}", source, arrow, target, label),
            None => println!("  {} {} {}", source, arrow, target),
        }
    }
}

fn print_report(report: &DiffReport) {
    if report.is_empty() {
        println!("no structural changes");
        return;
    }

    if !report.components.is_empty() {
        println!("components:");
        for entry in &report.components {
            match entry.change {
                ChangeKind::Added => {
                    let ty = entry.new_type.map(|t| t.to_string()).unwrap_or_default();
                    println!("  + {} ({})", entry.name, ty);
                }
                ChangeKind::Removed => {
                    let ty = entry
                        .previous_type
                        .map(|t| t.to_string())
                        .unwrap_or_default();
                    println!("  - {} ({})", entry.name, ty);
                }
                ChangeKind::Modified => {
                    let before = entry
                        .previous_type
                        .map(|t| t.to_string())
                        .unwrap_or_default();
                    let after = entry.new_type.map(|t| t.to_string()).unwrap_or_default();
                    println!("  ~ {} ({} => {})", entry.name, before, after);
                }
            }
        }
    }

    if !report.relationships.is_empty() {
        println!("relationships:");
        for entry in &report.relationships {
            let pair = format!("{} -> {}", entry.source, entry.target);
            match entry.change {
                ChangeKind::Added => match &entry.new_label {
                    Some(label) => println!("  + {} : {}", pair, label),
                    None => println!("  + {}", pair),
                },
                ChangeKind::Removed => match &entry.previous_label {
                    Some(label) => println!("  - {} : {}", pair, label),
                    None => println!("  - {}", pair),
                },
                ChangeKind::Modified => {
                    let before = describe_edge_state(&entry.previous_label, entry.previous_direction);
                    let after = describe_edge_state(&entry.new_label, entry.new_direction);
                    println!("  ~ {} ({} => {})", pair, before, after);
                }
            }
        }
    }
}

fn describe_edge_state(
    label: &Option<String>,
    direction: Option<trellis::core::RelationshipDirection>,
) -> String {
    let direction = direction.map(|d| d.as_str()).unwrap_or("?");
    match label {
        Some(label) => format!("{} \"{}\"", direction, label),
        None => format!("{} unlabeled", direction),
    }
}
