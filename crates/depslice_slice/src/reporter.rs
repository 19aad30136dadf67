use std::{
    collections::BTreeMap,
    io::{self, Write},
};

use colored::Colorize;
use log::debug;

use crate::{
    budget::BudgetDimension,
    types::{ExcludeReason, IncludeReason, Slice},
};

fn unit(dimension: BudgetDimension) -> &'static str {
    match dimension {
        BudgetDimension::Bytes => "bytes",
        BudgetDimension::Tokens => "tokens",
    }
}

fn include_label(reason: IncludeReason) -> &'static str {
    match reason {
        IncludeReason::Seed => "seed",
        IncludeReason::Layout => "layout",
        IncludeReason::Import => "import",
        IncludeReason::Schema => "schema",
    }
}

fn exclude_label(reason: ExcludeReason) -> &'static str {
    match reason {
        ExcludeReason::Size => "over size cap",
        ExcludeReason::Depth => "too deep",
        ExcludeReason::Pattern => "matched exclude pattern",
        ExcludeReason::Circular => "circular",
        ExcludeReason::External => "unreadable",
        ExcludeReason::Budget => "over byte budget",
        ExcludeReason::TokenBudget => "over token budget",
    }
}

/// Included files as a depth-indented tree, then exclusion counts and budget use.
pub fn print_slice_summary<W: Write>(writer: &mut W, slice: &Slice) -> io::Result<()> {
    debug!(
        "Printing slice summary: {} included, {} excluded",
        slice.included.len(),
        slice.excluded.len()
    );
    let summary = &slice.summary;
    let unit = unit(summary.dimension);

    writeln!(
        writer,
        "{} Slice of {} ({} files)\n",
        "●".bright_blue(),
        slice.seed_files.join(", ").blue(),
        summary.included_count.to_string().cyan()
    )?;

    for (idx, file) in slice.included.iter().enumerate() {
        let is_last = idx + 1 == slice.included.len();
        let prefix = if is_last { "└──" } else { "├──" };
        let label = include_label(file.reason);
        let label = match file.reason {
            IncludeReason::Seed => label.green().bold(),
            IncludeReason::Layout | IncludeReason::Schema => label.magenta(),
            IncludeReason::Import => label.dimmed(),
        };
        writeln!(
            writer,
            "{}{} {} [{}] ({} {})",
            prefix.dimmed(),
            "  ".repeat(file.depth),
            file.path,
            label,
            file.cost,
            unit
        )?;
    }

    let mut by_reason: BTreeMap<&'static str, usize> = BTreeMap::new();
    for file in &slice.excluded {
        *by_reason.entry(exclude_label(file.reason)).or_default() += 1;
    }

    writeln!(writer)?;
    writeln!(writer, "{}", "─".repeat(60).dimmed())?;
    writeln!(writer, "{}", "Summary".bold())?;
    writeln!(
        writer,
        "  Budget: {} / {} {}",
        summary.used.to_string().cyan().bold(),
        summary.ceiling,
        unit
    )?;
    writeln!(
        writer,
        "  Considered {} files: {} included, {} excluded",
        summary.considered,
        summary.included_count.to_string().green(),
        summary.excluded_count.to_string().yellow()
    )?;
    for (label, count) in &by_reason {
        writeln!(writer, "    {} {}", count.to_string().yellow(), label)?;
    }
    if !summary.cycles.is_empty() {
        writeln!(
            writer,
            "  {} {} import cycles within reach",
            "⚠".yellow().bold(),
            summary.cycles.len().to_string().red()
        )?;
    }

    writer.flush()?;
    Ok(())
}
