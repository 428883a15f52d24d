//! Pathweave CLI
//!
//! Builds canonical interaction graphs for one or more pathways from a
//! query-service result file and a diagram file per pathway, and prints the
//! interaction query used to obtain the former.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use pathweave_core::Session;
use std::path::{Path, PathBuf};

mod config;
mod pipeline;
mod source;

use config::AppConfig;
use pipeline::{build_all, BuildReport};
use source::FileSource;

#[derive(Parser)]
#[command(name = "pathweave")]
#[command(author, version, about = "Pathweave: canonical graphs from pathway interaction data")]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build graphs for the given pathways, sharing one frequency index.
    Build {
        /// Directory holding `<id>.sparql.json` and `<id>.gpml` per pathway
        #[arg(long)]
        data_dir: PathBuf,
        /// Pathway id (repeatable)
        #[arg(long = "pathway", required = true)]
        pathways: Vec<String>,
        /// JSON config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output JSON (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the interaction query for a pathway.
    Query {
        #[arg(long)]
        pathway: String,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            data_dir,
            pathways,
            config,
            out,
        } => cmd_build(&data_dir, &pathways, config.as_deref(), out.as_deref()),
        Commands::Query { pathway } => {
            println!("{}", pathweave_ingest_sparql::interaction_query(&pathway)?);
            Ok(())
        }
    }
}

fn cmd_build(
    data_dir: &Path,
    pathways: &[String],
    config: Option<&Path>,
    out: Option<&Path>,
) -> Result<()> {
    let config = AppConfig::load_or_default(config)?;
    let session = Session::new();
    let source = FileSource::new(data_dir);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow!("failed to initialize tokio runtime: {e}"))?;
    let report = rt.block_on(build_all(&session, &source, &config, pathways))?;

    print_summary(&report);

    let json = serde_json::to_string_pretty(&report)?;
    match out {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn print_summary(report: &BuildReport) {
    for pathway in &report.pathways {
        eprintln!(
            "{} {} {} ({} nodes, {} links, {} rows dropped)",
            "Built".green().bold(),
            pathway.id.bold(),
            pathway.title.as_deref().unwrap_or_default(),
            pathway.graph.nodes.len(),
            pathway.graph.links.len(),
            pathway.stats.dropped_rows,
        );
        if pathway.stats.skipped_interactions > 0 {
            eprintln!(
                "  {} {} diagram interactions skipped",
                "note".yellow(),
                pathway.stats.skipped_interactions
            );
        }
    }
    eprintln!(
        "{} {} genes across {} pathways",
        "Frequency".green().bold(),
        report.frequency.len(),
        report.pathways.len()
    );
}
