use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use depslice_graph::GraphError;
use depslice_slice::SliceError;
use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "depslice")]
#[command(about = "Dependency graphs and budgeted context slices for JS/TS codebases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the module dependency graph, for the whole repository or from seed files
    Graph(depslice_graph::Config),
    /// Select the files relevant to seed files within a byte or token budget
    Slice(depslice_slice::Config),
}

/// Writes pretty JSON to `output`, or to stdout when no file is given.
fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let mut file = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut file, value)?;
            writeln!(file)?;
            file.flush()?;
            info!("Wrote {}", path.display());
        }
        None => {
            // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
            // See https://github.com/rust-lang/rust/issues/60673
            let mut stdout = BufWriter::new(io::stdout());
            serde_json::to_writer_pretty(&mut stdout, value)?;
            writeln!(stdout)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// The human-readable report goes to stdout when JSON went to a file,
/// otherwise to stderr so the JSON stays parseable.
fn report_writer(output: Option<&Path>) -> Box<dyn Write> {
    if output.is_some() {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        Box::new(BufWriter::new(io::stderr()))
    }
}

fn is_empty_seed_set(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<GraphError>(), Some(GraphError::EmptySeedSet { .. }))
        || err.downcast_ref::<SliceError>().is_some_and(SliceError::is_empty_seed_set)
}

fn finished<W: Write + ?Sized>(writer: &mut W, elapsed_ms: u128, files: usize) -> io::Result<()> {
    writeln!(
        writer,
        "\n{} Finished in {}ms on {} files (using {} threads).",
        "●".bright_blue(),
        elapsed_ms.to_string().cyan(),
        files.to_string().cyan(),
        rayon::current_num_threads().to_string().cyan()
    )?;
    writer.flush()
}

fn run(command: Commands) -> Result<()> {
    let start = Instant::now();

    match command {
        Commands::Graph(cfg) => {
            info!("Building graph (max depth {}, {} seeds)", cfg.max_depth, cfg.seeds.len());
            let output = cfg.output.clone();

            let graph = depslice_graph::run_graph(cfg)?;
            debug!("Graph has {} nodes and {} edges", graph.nodes.len(), graph.edges.len());

            write_json(&graph, output.as_deref())?;
            let mut report = report_writer(output.as_deref());
            depslice_graph::print_graph_summary(&mut report, &graph)?;
            finished(&mut report, start.elapsed().as_millis(), graph.stats.total_files)?;
        }
        Commands::Slice(cfg) => {
            info!("Slicing from {} seeds", cfg.seeds.len());
            let output = cfg.output.clone();

            let slice = depslice_slice::run_slice(cfg)?;
            debug!("Slice used {} of {}", slice.summary.used, slice.summary.ceiling);

            write_json(&slice, output.as_deref())?;
            let mut report = report_writer(output.as_deref());
            depslice_slice::print_slice_summary(&mut report, &slice)?;
            finished(&mut report, start.elapsed().as_millis(), slice.summary.considered)?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    match run(cli.command) {
        Ok(()) => Ok(()),
        Err(err) if is_empty_seed_set(&err) => {
            eprintln!("{} {}", "✗".red().bold(), err.to_string().red());
            // Non-zero exit so scripts can tell "no seeds" from an empty result
            std::process::exit(2);
        }
        Err(err) => Err(err),
    }
}
