use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use taskdag::config::Config;
use taskdag::core::records::load_snapshot;
use taskdag::layout::{self, Point};
use taskdag::render::{JsonRenderer, Renderer, SvgRenderer};
use taskdag::tea::Model;
use taskdag::{tdlog, tdlog_error, tdlog_trace, GraphModel, Result, TaskId};

/// taskdag - inspect and validate task dependency graphs
#[derive(Parser, Debug)]
#[command(name = "taskdag")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    TASKDAG_DEBUG=1       Enable debug logging (alternative to -d)\n    TASKDAG_DEBUG=trace   Enable trace logging (alternative to -dd)")]
pub struct Cli {
    /// Log to ~/.taskdag/taskdag.log at DEBUG (-d) or TRACE (-dd)
    #[arg(short = 'd', long, action = ArgAction::Count)]
    pub debug: u8,

    /// Config file (defaults to ~/.taskdag/taskdag.toml)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Load a task listing and report entries that break the graph rules
    Check {
        /// JSON task listing
        snapshot: PathBuf,
    },

    /// Print task ids with every prerequisite before its dependents
    Order { snapshot: PathBuf },

    /// Print the default layout as JSON
    Layout { snapshot: PathBuf },

    /// Render the graph (nodes, positions, edges) as JSON or SVG
    Render {
        snapshot: PathBuf,
        #[arg(long, value_enum, default_value_t = RenderFormat::Json)]
        format: RenderFormat,
    },

    /// Check whether a new dependency would be accepted
    CanDepend {
        snapshot: PathBuf,
        /// Task that would gain the dependency
        dependent: TaskId,
        /// Task it would depend on
        prerequisite: TaskId,
    },

    /// Resolve a canvas point to the nearest task
    Hit {
        snapshot: PathBuf,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        /// Detection radius (defaults to the configured hit radius)
        #[arg(long)]
        radius: Option<f64>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormat {
    Json,
    Svg,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    taskdag::log::init_with_verbosity(cli.debug);
    tdlog!("taskdag starting: {:?}", cli.command);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            tdlog_error!("taskdag failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match &cli.command {
        Command::Check { snapshot } => run_check(snapshot),
        Command::Order { snapshot } => {
            let graph = load_graph(snapshot)?;
            for id in graph.topological_order()? {
                println!("{}", id);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Layout { snapshot } => {
            let model = Model::with_graph(load_graph(snapshot)?, &config);
            let positions: BTreeMap<String, Point> = model
                .positions
                .iter()
                .map(|(id, p)| (id.to_string(), *p))
                .collect();
            println!("{}", serde_json::to_string_pretty(&positions)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Render { snapshot, format } => {
            let model = Model::with_graph(load_graph(snapshot)?, &config);
            let state = model.render_state();
            let output = match format {
                RenderFormat::Json => JsonRenderer { pretty: true }.render(&state)?,
                RenderFormat::Svg => SvgRenderer::default().render(&state)?,
            };
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Command::CanDepend {
            snapshot,
            dependent,
            prerequisite,
        } => {
            let graph = load_graph(snapshot)?;
            match graph.validate_edge(*dependent, *prerequisite) {
                Ok(()) => {
                    println!("ok");
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) if e.is_edge_rejection() => {
                    println!("rejected: {}", e);
                    Ok(ExitCode::FAILURE)
                }
                Err(e) => Err(e),
            }
        }
        Command::Hit {
            snapshot,
            x,
            y,
            radius,
        } => {
            let model = Model::with_graph(load_graph(snapshot)?, &config);
            let radius = radius.unwrap_or(config.hit.radius);
            tdlog_trace!("hit pointer=({}, {}) radius={}", x, y, radius);
            match layout::resolve(Point::new(*x, *y), &model.positions, radius) {
                Some(id) => println!("{}", id),
                None => println!("none"),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_check(snapshot: &Path) -> Result<ExitCode> {
    let records = load_snapshot(snapshot)?;
    let (graph, skipped) = GraphModel::from_records(&records);

    println!(
        "{} tasks, {} dependencies",
        graph.task_count(),
        graph.dependency_count()
    );
    if skipped.is_empty() {
        println!("ok");
        return Ok(ExitCode::SUCCESS);
    }
    for e in &skipped {
        println!("skipped: {}", e);
    }
    Ok(ExitCode::FAILURE)
}

/// Load a listing, keeping whatever part of it forms a valid graph.
fn load_graph(snapshot: &Path) -> Result<GraphModel> {
    let records = load_snapshot(snapshot)?;
    let (graph, skipped) = GraphModel::from_records(&records);
    if !skipped.is_empty() {
        eprintln!(
            "warning: {} invalid entries ignored (run `taskdag check` for details)",
            skipped.len()
        );
    }
    Ok(graph)
}
