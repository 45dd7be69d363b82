//! depscope CLI - Filter and expand symbol dependency graphs.
//!
//! Graphs are read from JSON Lines documents, one record per package, type
//! or member, as written by `depscope copy --out` or any extractor producing
//! the same format.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::closure::ClosureOptions;
use cli::{OutputArgs, SelectionArgs};

/// depscope: Symbol dependency graph engine.
#[derive(Parser)]
#[command(name = "depscope")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Fail on the first malformed line of a graph document
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy the nodes and edges selected by scope and filter criteria
    Copy {
        /// Graph document (JSON Lines)
        graph: PathBuf,

        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Expand seed nodes layer by layer along dependency edges
    Closure {
        /// Graph document (JSON Lines)
        graph: PathBuf,

        /// Seed node as `kind:name` (repeatable; default: every package)
        #[arg(long, value_name = "KIND:NAME")]
        seed: Vec<String>,

        /// Start pattern selecting the seed layer (repeatable)
        #[arg(long, value_name = "PATTERN", required = true)]
        start: Vec<String>,

        /// Stop pattern; matching nodes are not expanded (`//` shows direct neighbours only)
        #[arg(long, value_name = "PATTERN")]
        stop: Vec<String>,

        /// Follow dependents instead of dependencies
        #[arg(long)]
        inbound: bool,

        /// Maximum number of layers past the seed layer
        #[arg(short, long)]
        layers: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show node counts and the most connected nodes
    Metrics {
        /// Graph document (JSON Lines)
        graph: PathBuf,

        /// Number of nodes per ranking
        #[arg(short, long, default_value = "10")]
        top: usize,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Copy {
            graph,
            selection,
            output,
        } => cli::copy::run(&graph, cli.strict, &selection, &output),
        Commands::Closure {
            graph,
            seed,
            start,
            stop,
            inbound,
            layers,
            output,
        } => {
            let options = ClosureOptions {
                seeds: seed,
                start,
                stop,
                inbound,
                layers,
            };
            cli::closure::run(&graph, cli.strict, &options, &output)
        }
        Commands::Metrics { graph, top, json } => cli::metrics::run(&graph, cli.strict, top, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            for cause in e.chain().skip(1) {
                eprintln!("  {}: {cause}", "caused by".dimmed());
            }
            ExitCode::FAILURE
        }
    }
}
