use anyhow::{Context as AnyhowContext, Result};
use clap::{Parser, Subcommand};
use nodelink::graph::Graph;
use nodelink::graph::document::LinkFormat;
use nodelink::graph::loader::{load_graph_document, save_graph_document};
use nodelink::graph::runner::{run_graph, RunConfig};
use nodelink::runtime::registry::NodeRegistry;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the nodes and links of a graph file
    Inspect {
        /// Path to the graph JSON or YAML file
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Reload a graph file and write it back in canonical form
    Normalize {
        #[arg(long, short)]
        file: PathBuf,

        /// Write links as named objects instead of positional arrays
        #[arg(long)]
        named: bool,

        /// Output path (defaults to rewriting the input file)
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Run evaluation passes and report watch node values
    Run {
        #[arg(long, short)]
        file: PathBuf,

        /// Number of passes, 0 runs until Ctrl+C
        #[arg(long, default_value_t = 1)]
        steps: u64,

        /// Delay between passes in milliseconds
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,
    },
}

fn load_graph(registry: Arc<NodeRegistry>, file: &Path) -> Result<Graph> {
    let document = load_graph_document(file)?;
    Graph::configure(registry, document)
        .with_context(|| format!("Failed to configure graph from {}", file.display()))
}

fn report_watches(graph: &Graph) {
    for node in graph.nodes().filter(|n| n.kind == "basic/watch") {
        match graph.input_value(node.id, 0) {
            Some(v) => info!(iteration = graph.iteration(), node_id = node.id, "watch = {}", v),
            None => info!(iteration = graph.iteration(), node_id = node.id, "watch = <none>"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let registry = Arc::new(NodeRegistry::with_builtins());

    match cli.command {
        Commands::Inspect { file } => {
            println!("node types: {}", registry.names().join(", "));
            let graph = load_graph(registry, &file)?;
            println!("graph {}", graph.id());
            for node in graph.nodes() {
                let inputs: Vec<&str> = node.inputs.iter().map(|p| p.name.as_str()).collect();
                let outputs: Vec<&str> = node.outputs.iter().map(|p| p.name.as_str()).collect();
                println!("  node {:>4} {:<16} in={:?} out={:?}", node.id, node.kind, inputs, outputs);
            }
            for link in graph.links() {
                println!(
                    "  link {:>4} {}[{}] -> {}[{}] ({})",
                    link.id, link.origin_id, link.origin_slot, link.target_id, link.target_slot, link.slot_type
                );
            }
        }

        Commands::Normalize { file, named, out } => {
            let graph = load_graph(registry, &file)?;
            let format = if named { LinkFormat::Named } else { LinkFormat::Ordered };
            let target = out.unwrap_or_else(|| file.clone());
            save_graph_document(&target, &graph.serialize_with(format))?;
            info!("Wrote {} links to {}", graph.links().count(), target.display());
        }

        Commands::Run { file, steps, interval_ms } => {
            let mut graph = load_graph(registry, &file)?;
            let config = RunConfig {
                steps: (steps > 0).then_some(steps),
                interval: Duration::from_millis(interval_ms),
            };
            info!("Running graph {} ({} nodes)", graph.id(), graph.nodes().count());
            run_graph(&mut graph, &config, report_watches).await?;
        }
    }

    Ok(())
}
