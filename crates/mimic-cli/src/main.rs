mod config;
mod graphs;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use graphs::Shape;
use mimic_clone::{CloningEngine, DefaultCloningEngine, clone_typed_with};
use mimic_core::{Heap, ObjRef, Value};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(name = "mimic", version, about = "Deep-copy object graphs")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: nearest mimic.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone the sample `Man`, then change the copy's tags
    Demo,
    /// Clone a synthetic graph and verify the copy
    Graph {
        /// Number of nodes; chains and rings recurse once per node
        #[arg(long, default_value_t = 1000)]
        nodes: usize,
        #[arg(long, value_enum, default_value_t = Shape::Chain)]
        shape: Shape,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Demo => run_demo(&config),
        Commands::Graph { nodes, shape } => run_graph(&config, shape, nodes),
    }
}

fn new_session(config: &Config) -> (Heap, DefaultCloningEngine) {
    let engine = DefaultCloningEngine::with_config(config.engine.to_engine_config());
    tracing::debug!(config = ?engine.config(), "engine ready");
    (Heap::with_config(config.heap.to_heap_config()), engine)
}

fn run_demo(config: &Config) -> Result<()> {
    let (mut heap, mut engine) = new_session(config);

    let source = graphs::new_man(&mut heap, "Dmitry", 25, &["CLR via C#", "Collector"])?;
    let copy: ObjRef = clone_typed_with(&mut heap, &source, &mut engine)?;

    let tags = graphs::field_of(&heap, copy, "tags")?
        .as_obj()
        .context("copy has no tags list")?;
    heap.collection_append(tags, Value::text("Mutated"))?;

    let fields: Vec<String> = mimic_clone::fields::copyable_fields(&graphs::man_class())
        .iter()
        .map(|f| format!("{:?}", f))
        .collect();
    println!("copied fields: {}", fields.join(", "));
    println!("source: {}", heap.describe(&source.into()));
    println!("copy:   {}", heap.describe(&copy.into()));
    Ok(())
}

fn run_graph(config: &Config, shape: Shape, nodes: usize) -> Result<()> {
    let (mut heap, mut engine) = new_session(config);

    let root = Value::Ref(graphs::build_graph(&mut heap, shape, nodes)?);
    let before = heap.len();

    let started = Instant::now();
    let copy = engine.clone_value(&mut heap, &root)?;
    let elapsed = started.elapsed();

    let reached = graphs::verify_copy(&heap, &root, &copy)?;
    tracing::info!(?shape, nodes, "copy verified");

    let stats = heap.stats();
    let fields = mimic_clone::fields::cache_stats();
    let ctors = mimic_clone::constructor::cache_stats();
    println!("shape:       {:?}", shape);
    println!("copied:      {} objects in {:.2?}", heap.len() - before, elapsed);
    println!("reachable:   {} objects per graph", reached);
    println!(
        "heap:        {} objects ({} instances, {} arrays, {} temporals)",
        stats.objects, stats.instances, stats.arrays, stats.temporals
    );
    println!(
        "field cache: {} classes, {} hits, {} misses",
        fields.entries, fields.hits, fields.misses
    );
    println!(
        "ctor cache:  {} classes, {} hits, {} misses",
        ctors.entries, ctors.hits, ctors.misses
    );
    Ok(())
}
