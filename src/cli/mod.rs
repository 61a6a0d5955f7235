use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::Serialize;

use crate::config::resolve::load_settings;
use crate::config::{ResolveSection, Settings};
use crate::core::NodeId;
use crate::error::{DepgraphError, Result};
use crate::graph::builder::build_graph;
use crate::graph::ops::load_order;
use crate::graph::{viz, DependencyGraph, GraphEdge};
use crate::source::source_for;
use crate::util::logging::init_tracing;
use crate::util::output;
use crate::util::progress::SpinnerSource;

#[derive(Parser, Debug)]
#[command(name = "depgraph")]
#[command(about = "Transitive dependency graph resolver", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Root node: groupId:artifactId:version, or an uppercase id in test mode
    #[arg(short, long, global = true)]
    pub package: Option<String>,
    /// Repository path or base URL, or the fixture file in test mode
    #[arg(short, long, global = true)]
    pub repository: Option<String>,
    #[arg(short, long, global = true)]
    pub mode: Option<String>,
    #[arg(short = 'd', long, global = true)]
    pub max_depth: Option<i64>,
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[arg(short, long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Resolve(ResolveArgs),
    Order(OrderArgs),
    Render(RenderArgs),
    Config,
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Default)]
pub struct ResolveArgs {
    /// Also print the load order
    #[arg(long)]
    pub order: bool,
    /// Also print every edge
    #[arg(long)]
    pub adjacency: bool,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct OrderArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Write to a .dot or .svg file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
    #[arg(long, value_enum, default_value_t = RenderFormat::Dot)]
    pub format: RenderFormat,
    /// Overwrite an existing output file without asking
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    Dot,
    Tree,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    pub shell: Shell,
}

pub fn run() {
    let cli = Cli::parse();
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
    init_tracing(cli.verbose, cli.quiet);
    if let Err(err) = dispatch(cli) {
        output::error(&err.to_string());
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Resolve(ResolveArgs::default()));

    if let Commands::Completions(args) = &command {
        let mut cmd = Cli::command();
        clap_complete::generate(args.shell, &mut cmd, "depgraph", &mut std::io::stdout());
        return Ok(());
    }

    let overrides = ResolveSection {
        package: cli.package,
        repository: cli.repository,
        mode: cli.mode,
        max_depth: cli.max_depth,
        output: match &command {
            Commands::Render(args) => args.output.clone(),
            _ => None,
        },
    };
    let start = std::env::current_dir()?;
    let settings = load_settings(&start, cli.config, overrides)?;

    match command {
        Commands::Resolve(args) => handle_resolve(args, &settings, cli.quiet),
        Commands::Order(args) => handle_order(args, &settings, cli.quiet),
        Commands::Render(args) => handle_render(args, &settings, cli.quiet),
        Commands::Config => handle_config(&settings),
        Commands::Completions(_) => Ok(()),
    }
}

fn resolve_graph(settings: &Settings, quiet: bool) -> Result<DependencyGraph> {
    let source = SpinnerSource::new(source_for(settings)?, !quiet);
    let root = settings.root_node();
    tracing::info!(root = %root, max_depth = settings.max_depth, mode = %settings.mode, "resolving");
    let graph = build_graph(root, settings.max_depth, &source);
    source.finish();
    Ok(graph)
}

fn handle_resolve(args: ResolveArgs, settings: &Settings, quiet: bool) -> Result<()> {
    let graph = resolve_graph(settings, quiet)?;
    let order = load_order(&graph);

    if args.json {
        println!("{}", to_json(&ResolveJson::new(&graph, &order))?);
        return Ok(());
    }

    print!("{}", render_summary(&graph));
    let cycle_count = graph.cycles().count();
    if cycle_count > 0 && !quiet {
        output::warn(&format!("{cycle_count} cyclic dependency edge(s) detected"));
    }
    if args.order {
        println!("{}", output::heading("load order:"));
        for (idx, node) in order.iter().enumerate() {
            println!("  {}. {}", idx + 1, node);
        }
    }
    if args.adjacency {
        println!("{}", output::heading("adjacency:"));
        for edge in graph.edges() {
            println!("  {}", format_edge(edge));
        }
    }
    Ok(())
}

fn handle_order(args: OrderArgs, settings: &Settings, quiet: bool) -> Result<()> {
    let graph = resolve_graph(settings, quiet)?;
    let order: Vec<String> = load_order(&graph)
        .into_iter()
        .map(|id| id.as_str().to_string())
        .collect();
    if args.json {
        println!("{}", to_json(&order)?);
    } else {
        for node in order {
            println!("{}", node);
        }
    }
    Ok(())
}

fn handle_render(args: RenderArgs, settings: &Settings, quiet: bool) -> Result<()> {
    let graph = resolve_graph(settings, quiet)?;
    let text = match args.format {
        RenderFormat::Dot => viz::render_dot(&graph),
        RenderFormat::Tree => viz::render_tree(&graph),
    };

    let Some(target) = settings.output.as_deref() else {
        print!("{}", text);
        return Ok(());
    };
    let path = PathBuf::from(target);
    if !output::confirm_overwrite(&path, args.yes)? {
        output::warn("render cancelled");
        return Ok(());
    }

    let is_svg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);
    if is_svg {
        if args.format != RenderFormat::Dot {
            return Err(DepgraphError::Other(anyhow::anyhow!(
                "svg output requires --format dot"
            )));
        }
        write_svg(&text, &path)?;
    } else {
        fs::write(&path, text)?;
    }
    if !quiet {
        output::info(&format!("wrote {}", path.display()));
    }
    Ok(())
}

fn handle_config(settings: &Settings) -> Result<()> {
    for (key, value) in settings.key_value_pairs() {
        println!("{key}={value}");
    }
    Ok(())
}

/// Pipes DOT text through Graphviz.
fn write_svg(dot: &str, path: &Path) -> Result<()> {
    let mut child = Command::new("dot")
        .arg("-Tsvg")
        .arg("-o")
        .arg(path)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .context("failed to run graphviz 'dot' (is it installed?)")?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(dot.as_bytes())?;
    }
    let result = child.wait_with_output()?;
    if !result.status.success() {
        return Err(DepgraphError::Other(anyhow::anyhow!(
            "dot exited with {}: {}",
            result.status,
            String::from_utf8_lossy(&result.stderr).trim()
        )));
    }
    Ok(())
}

fn render_summary(graph: &DependencyGraph) -> String {
    let mut out = String::new();
    out.push_str(&format!("root: {}\n", graph.root()));
    out.push_str(&format!("nodes: {}\n", graph.nodes().len()));
    out.push_str(&format!("edges: {}\n", graph.edges().len()));
    let truncated: Vec<&str> = graph.truncated().iter().map(NodeId::as_str).collect();
    if truncated.is_empty() {
        out.push_str("truncated: 0\n");
    } else {
        out.push_str(&format!(
            "truncated: {} ({})\n",
            truncated.len(),
            truncated.join(", ")
        ));
    }
    let cycles: Vec<&GraphEdge> = graph.cycles().collect();
    out.push_str(&format!("cycles: {}\n", cycles.len()));
    for edge in cycles {
        out.push_str(&format!("  {} -> {}\n", edge.from, edge.to));
    }
    out
}

fn format_edge(edge: &GraphEdge) -> String {
    if edge.cycle {
        format!("{} -> {} (cycle)", edge.from, edge.to)
    } else {
        format!("{} -> {}", edge.from, edge.to)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|err| DepgraphError::Other(anyhow::Error::new(err)))
}

#[derive(Serialize)]
struct ResolveJson<'a> {
    root: &'a NodeId,
    nodes: Vec<&'a NodeId>,
    edges: &'a [GraphEdge],
    truncated: Vec<&'a NodeId>,
    cycles: Vec<&'a GraphEdge>,
    load_order: &'a [NodeId],
}

impl<'a> ResolveJson<'a> {
    fn new(graph: &'a DependencyGraph, order: &'a [NodeId]) -> Self {
        Self {
            root: graph.root(),
            nodes: graph.nodes().iter().collect(),
            edges: graph.edges(),
            truncated: graph.truncated().iter().collect(),
            cycles: graph.cycles().collect(),
            load_order: order,
        }
    }
}
