//! goterm CLI
//!
//! Command-line front end over the term graph:
//! - summarising and listing an OBO ontology (`stats`, `roots`, `show`)
//! - walking subtrees (`descendants`)
//! - aggregating gene annotations over subtrees (`genes`, `outline`)

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use goterm_graph::{ExternalRef, TermGraph};
use goterm_mapping::GeneTable;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;

mod config;
mod output;

use output::{GeneReport, OutlineEntry, TermDetail, TermSummary};

#[derive(Parser)]
#[command(name = "goterm")]
#[command(author, version, about = "Query Gene Ontology term hierarchies")]
struct Cli {
    /// Ontology file (default: $GOTERM_OBO_FILE, then ~/gene_ontology.obo)
    #[arg(long, global = true)]
    obo: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct OutputArgs {
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Clone)]
struct MappingArgs {
    /// Tab-delimited gene/GO table (default: $GOTERM_MAPPING_FILE)
    #[arg(long)]
    mapping: Option<PathBuf>,

    /// Label for mapped gene ids (default: $GOTERM_DATA_SOURCE, then "Ensembl Human")
    #[arg(long)]
    source: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Term, root and edge counts with a namespace breakdown
    Stats {
        #[command(flatten)]
        out: OutputArgs,
    },

    /// List terms without parents
    Roots {
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Show a term with its parents and children
    Show {
        id: String,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// List a term and everything below it
    Descendants {
        /// Term id (default: $GOTERM_GO_ID, then GO:0006096)
        id: Option<String>,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Genes annotated anywhere in each term's subtree
    Genes {
        /// Term ids (default: $GOTERM_GO_ID, then GO:0006096)
        ids: Vec<String>,
        #[command(flatten)]
        mapping: MappingArgs,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Indented subtree outline, pruned to branches that carry genes
    Outline {
        /// Term id (default: $GOTERM_GO_ID, then GO:0006096)
        id: Option<String>,
        #[command(flatten)]
        mapping: MappingArgs,
        #[command(flatten)]
        out: OutputArgs,
    },
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        LevelFilter::ERROR
    } else {
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let obo = config::resolve_obo_file(cli.obo)?;
    let graph = load_graph(&obo)?;

    match cli.command {
        Commands::Stats { out } => cmd_stats(&graph, out),
        Commands::Roots { out } => cmd_roots(&graph, out),
        Commands::Show { id, out } => cmd_show(&graph, &id, out),
        Commands::Descendants { id, out } => {
            let id = single_id(id)?;
            cmd_descendants(&graph, &id, out)
        }
        Commands::Genes { ids, mapping, out } => {
            let ids = config::resolve_go_ids(ids)?;
            let table = load_table(mapping)?;
            cmd_genes(&graph, &table, &ids, out)
        }
        Commands::Outline { id, mapping, out } => {
            let id = single_id(id)?;
            let table = load_table(mapping)?;
            cmd_outline(&graph, &table, &id, out)
        }
    }
}

fn single_id(id: Option<String>) -> Result<String> {
    config::resolve_go_ids(id.into_iter().collect())?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no term id given"))
}

fn load_graph(path: &Path) -> Result<TermGraph> {
    let started = Instant::now();
    let graph = goterm_graph::load_path(path).with_context(|| {
        format!("ontology file could not be loaded: {}", path.display())
    })?;
    info!(
        path = %path.display(),
        terms = graph.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "loaded ontology"
    );
    Ok(graph)
}

fn load_table(args: MappingArgs) -> Result<GeneTable> {
    let path = config::resolve_mapping_file(args.mapping)?;
    let source = config::resolve_data_source(args.source)?;
    debug!(path = %path.display(), source = %source, "loading mapping table");
    GeneTable::from_path(&path, source)
        .with_context(|| format!("mapping table could not be loaded: {}", path.display()))
}

fn require<'g>(graph: &'g TermGraph, id: &str) -> Result<&'g goterm_graph::Term> {
    graph
        .find(id)
        .ok_or_else(|| anyhow!("unknown term id {id}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_stats(graph: &TermGraph, out: OutputArgs) -> Result<()> {
    let stats = graph.stats();
    if out.json {
        return print_json(&stats);
    }
    println!("{} {}", "terms:".bold(), stats.terms);
    println!("{} {}", "roots:".bold(), stats.roots);
    println!("{} {}", "is_a edges:".bold(), stats.edges);
    for (ns, count) in &stats.namespaces {
        println!("  {} {ns}: {count}", "→".yellow());
    }
    Ok(())
}

fn cmd_roots(graph: &TermGraph, out: OutputArgs) -> Result<()> {
    let roots = output::sorted_summaries(graph.roots());
    if out.json {
        return print_json(&roots);
    }
    for root in &roots {
        println!("{}", output::term_line(root));
    }
    eprintln!("{} {} root terms", "ok".green().bold(), roots.len());
    Ok(())
}

fn cmd_show(graph: &TermGraph, id: &str, out: OutputArgs) -> Result<()> {
    let term = require(graph, id)?;
    let detail = TermDetail::new(graph, term);
    if out.json {
        return print_json(&detail);
    }
    println!("{}", output::term_line(&detail.term));
    for p in &detail.parents {
        println!("  {} {}", "is_a".cyan(), output::term_line(p));
    }
    for c in &detail.children {
        println!("  {} {}", "child".cyan(), output::term_line(c));
    }
    Ok(())
}

fn cmd_descendants(graph: &TermGraph, id: &str, out: OutputArgs) -> Result<()> {
    let term = require(graph, id)?;
    let set = graph.descendants_and_self(term.handle());
    let terms = output::sorted_summaries(graph.terms_in(&set));
    if out.json {
        return print_json(&terms);
    }
    for t in &terms {
        println!("{}", output::term_line(t));
    }
    eprintln!(
        "{} {} terms under {}",
        "ok".green().bold(),
        terms.len(),
        term.id().bold()
    );
    Ok(())
}

fn cmd_genes(graph: &TermGraph, table: &GeneTable, ids: &[String], out: OutputArgs) -> Result<()> {
    let terms = ids
        .iter()
        .map(|id| require(graph, id))
        .collect::<Result<Vec<_>>>()?;
    let results: Vec<(TermSummary<'_>, BTreeSet<ExternalRef>)> = terms
        .into_iter()
        .map(|t| (TermSummary::from(t), graph.aggregate_over_subtree(t.handle(), table)))
        .collect();

    if out.json {
        let reports: Vec<GeneReport<'_>> = results
            .iter()
            .map(|(term, refs)| GeneReport {
                term: *term,
                refs,
            })
            .collect();
        return print_json(&reports);
    }

    for (term, refs) in &results {
        println!(
            "{} {} ({} genes)",
            term.id.bold(),
            term.name,
            refs.len()
        );
        for r in refs {
            println!("  {r}");
        }
    }
    Ok(())
}

fn cmd_outline(graph: &TermGraph, table: &GeneTable, id: &str, out: OutputArgs) -> Result<()> {
    let term = require(graph, id)?;
    let rows = graph.subtree_outline(term.handle(), table);
    let entries: Vec<OutlineEntry<'_>> = rows
        .iter()
        .filter_map(|row| OutlineEntry::new(graph, row))
        .collect();
    if out.json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        eprintln!(
            "{} no genes annotated under {}",
            "info:".yellow().bold(),
            term.id()
        );
    }
    for entry in &entries {
        println!("{}", output::outline_line(entry));
    }
    Ok(())
}
