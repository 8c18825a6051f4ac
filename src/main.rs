use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use contextgraph::{EngineConfig, Frame, GraphData, GraphEngine, ViewTransform, compute_initial_fit};

/// Lay out context graphs with a force simulation.
#[derive(Parser)]
#[command(name = "contextgraph")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine config file (.yaml, .yml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a graph, run the simulation and print the resulting frame as JSON
    Layout {
        /// Graph data file (JSON with `nodes` and `links`)
        #[arg(short, long)]
        input: PathBuf,

        /// Additional graph files merged in order after the initial load
        #[arg(short, long)]
        merge: Vec<PathBuf>,

        /// Number of simulation ticks to run
        #[arg(short, long, default_value = "300")]
        ticks: usize,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print the initial zoom guess for a graph of the given size
    InitialFit {
        /// Number of nodes in the graph
        #[arg(short, long)]
        nodes: usize,
    },
}

#[derive(Serialize)]
struct LayoutOutput {
    fit: ViewTransform,
    frame: Frame,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("failed to read config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn layout(
    config: EngineConfig,
    input: &Path,
    merges: &[PathBuf],
    ticks: usize,
) -> anyhow::Result<LayoutOutput> {
    let mut engine = GraphEngine::new(config);

    let data = GraphData::from_path(input)
        .with_context(|| format!("failed to read graph {}", input.display()))?;
    engine
        .load(data)
        .with_context(|| format!("failed to load graph {}", input.display()))?;
    engine.run(ticks);

    for path in merges {
        let data = GraphData::from_path(path)
            .with_context(|| format!("failed to read graph {}", path.display()))?;
        engine
            .merge(data)
            .with_context(|| format!("failed to merge graph {}", path.display()))?;
        engine.run(ticks);
    }

    let fit = if engine.model().is_empty() {
        engine.view()
    } else {
        engine.zoom_to_fit()?
    };

    info!(
        nodes = engine.model().node_count(),
        links = engine.model().link_count(),
        ticks = engine.simulation().ticks(),
        "layout complete"
    );

    Ok(LayoutOutput {
        fit,
        frame: engine.frame(),
    })
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("contextgraph=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Layout {
            input,
            merge,
            ticks,
            pretty,
        } => {
            let output = layout(config, &input, &merge, ticks)?;
            print_json(&output, pretty)?;
        }
        Commands::InitialFit { nodes } => {
            let fit = compute_initial_fit(nodes, config.viewport.width, config.viewport.height);
            print_json(&fit, false)?;
        }
    }

    Ok(())
}
