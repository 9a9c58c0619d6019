//! Terminal rendering of run outcomes.

use colored::Colorize;

use super::run::Outcome;
use crate::verify::baseline::{BaselineEntry, DiffRow, DifferenceReport, Side};

/// Print the outcome of a run to stdout
pub fn print_outcome(procedure: &str, outcome: &Outcome) {
    match outcome {
        Outcome::Stored { path, rows } => {
            println!(
                "{} Stored baseline for '{}' ({} row(s))",
                "✓".green().bold(),
                procedure.cyan(),
                rows
            );
            println!("  {}", path.display().to_string().dimmed());
        }
        Outcome::Matched { baseline } => {
            println!("{} Results match baseline exactly!", "✓".green().bold());
            println!("  {}", baseline.display().to_string().dimmed());
        }
        Outcome::Mismatch { baseline, report } => {
            println!(
                "{} Differences found against {}",
                "✗".red().bold(),
                baseline.display().to_string().dimmed()
            );
            print!("{}", format_report(report));
        }
        Outcome::NoBaseline => {
            println!(
                "{} No baseline found for this procedure",
                "✗".red().bold()
            );
        }
        Outcome::History { entries } => print!("{}", format_history(procedure, entries)),
    }
}

/// Render a difference report as aligned tables, one marker column per row
pub fn format_report(report: &DifferenceReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("{} {}\n", "Summary:".bold(), report.summary()));
    if report.exact_match || report.is_reordering_only() {
        return out;
    }

    match &report.column_change {
        Some(change) => {
            out.push_str(&format!(
                "\n{}\n  current:  {}\n  baseline: {}\n",
                "Columns differ:".yellow().bold(),
                change.current.join(", "),
                change.baseline.join(", ")
            ));
            let current: Vec<&DiffRow> = side_rows(report, Side::Current);
            let baseline: Vec<&DiffRow> = side_rows(report, Side::Baseline);
            if !current.is_empty() {
                out.push('\n');
                out.push_str(&format_table(&change.current, &current));
            }
            if !baseline.is_empty() {
                out.push('\n');
                out.push_str(&format_table(&change.baseline, &baseline));
            }
        }
        None => {
            let rows: Vec<&DiffRow> = report.rows.iter().collect();
            out.push('\n');
            out.push_str(&format_table(&report.columns, &rows));
        }
    }

    out
}

fn side_rows(report: &DifferenceReport, side: Side) -> Vec<&DiffRow> {
    report.rows.iter().filter(|d| d.side == side).collect()
}

fn format_table(columns: &[String], rows: &[&DiffRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|d| d.row.iter().map(|v| v.to_string()).collect())
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let header = pad_cells(columns.iter().map(String::as_str), &widths);
    out.push_str(&format!("  {}\n", header.bold()));
    out.push_str(&format!(
        "  {}\n",
        "─".repeat(header.chars().count()).dimmed()
    ));

    for (diff, row) in rows.iter().zip(&cells) {
        let line = format!(
            "{} {}",
            diff.side.marker(),
            pad_cells(row.iter().map(String::as_str), &widths)
        );
        let line = match diff.side {
            Side::Current => line.green(),
            Side::Baseline => line.red(),
        };
        out.push_str(&format!("{line}\n"));
    }

    out.push_str(&format!(
        "{}\n",
        format!(
            "  (+ only in current, - only in baseline; {} row(s))",
            rows.len()
        )
        .dimmed()
    ));
    out
}

fn pad_cells<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Render the stored baselines for a procedure, oldest first
pub fn format_history(procedure: &str, entries: &[BaselineEntry]) -> String {
    if entries.is_empty() {
        return format!("No baselines stored for '{procedure}'\n");
    }

    let mut out = format!(
        "{} baseline(s) for '{}':\n",
        entries.len(),
        procedure.cyan()
    );
    for entry in entries {
        out.push_str(&format!(
            "  {}  {}\n",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            entry.path.display().to_string().dimmed()
        ));
    }
    out
}
