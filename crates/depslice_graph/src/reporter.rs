use std::io::{self, Write};

use colored::Colorize;
use log::debug;

use crate::types::{Graph, GraphMode};

const MAX_LISTED: usize = 10;

pub fn print_graph_summary<W: Write>(writer: &mut W, graph: &Graph) -> io::Result<()> {
    debug!("Printing summary for {} nodes", graph.nodes.len());
    let stats = &graph.stats;

    match &graph.mode {
        GraphMode::Full => writeln!(writer, "{} Full repository graph", "●".bright_blue())?,
        GraphMode::Seeded { seeds, max_depth } => writeln!(
            writer,
            "{} Seeded graph from {} (max depth {})",
            "●".bright_blue(),
            seeds.join(", ").blue(),
            max_depth
        )?,
    }

    writeln!(writer, "{}", "─".repeat(60).dimmed())?;
    writeln!(writer, "  Files: {}", stats.total_files.to_string().cyan())?;
    writeln!(
        writer,
        "  Edges: {} ({} static, {} dynamic, {} type-only)",
        stats.total_edges.to_string().cyan(),
        stats.static_edges,
        stats.dynamic_edges,
        stats.type_only_edges
    )?;
    writeln!(writer, "  External packages: {}", stats.external_packages.to_string().cyan())?;
    if let Some(depth) = stats.max_depth {
        writeln!(writer, "  Deepest file: {} hops", depth.to_string().cyan())?;
    }

    if stats.unresolved_imports > 0 {
        writeln!(
            writer,
            "  {} unresolved imports",
            stats.unresolved_imports.to_string().yellow().bold()
        )?;
        for miss in graph.unresolved.iter().take(MAX_LISTED) {
            writeln!(writer, "    {} {} {}", miss.from.dimmed(), "→".dimmed(), miss.specifier.yellow())?;
        }
        print_remainder(writer, graph.unresolved.len())?;
    }

    if graph.cycles.is_empty() {
        writeln!(writer, "  {} No import cycles", "✓".green().bold())?;
    } else {
        writeln!(
            writer,
            "  {} {} import cycles across {} files",
            "⚠".yellow().bold(),
            stats.cycle_count.to_string().red().bold(),
            stats.circular_files
        )?;
        for cycle in graph.cycles.iter().take(MAX_LISTED) {
            let mut members = cycle.clone();
            if let Some(first) = cycle.first() {
                members.push(first.clone());
            }
            writeln!(writer, "    {}", members.join(" → ").red())?;
        }
        print_remainder(writer, graph.cycles.len())?;
    }

    writer.flush()?;
    Ok(())
}

fn print_remainder<W: Write>(writer: &mut W, total: usize) -> io::Result<()> {
    if total > MAX_LISTED {
        writeln!(writer, "    {}", format!("... and {} more", total - MAX_LISTED).dimmed())?;
    }
    Ok(())
}
