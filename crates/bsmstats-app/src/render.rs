// Output rendering: aligned text table, CSV, or JSON on any writer.

use std::io::Write;

use anyhow::Context;
use bsmstats_baseball::{DatasetKind, DerivedPlayerRow, FilterOptions};

use crate::cli::OutputFormat;

/// Columns rendered left-aligned; everything else is numeric.
const TEXT_COLUMNS: &[&str] = &["Name", "League", "Acronym", "Season", "Age"];

const EMPTY_MESSAGE: &str = "No data found.";

pub fn render<W: Write>(
    rows: &[DerivedPlayerRow],
    kind: DatasetKind,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => render_table(rows, kind, out),
        OutputFormat::Csv => render_csv(rows, kind, out),
        OutputFormat::Json => render_json(rows, out),
    }
}

fn render_table<W: Write>(
    rows: &[DerivedPlayerRow],
    kind: DatasetKind,
    out: &mut W,
) -> anyhow::Result<()> {
    if rows.is_empty() {
        writeln!(out, "{EMPTY_MESSAGE}")?;
        return Ok(());
    }

    let columns = kind.columns();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.cells().iter().map(ToString::to_string).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, header)| {
            cells
                .iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    write_line(out, columns, &header, &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_line(out, columns, &rule, &widths)?;
    for row in &cells {
        write_line(out, columns, row, &widths)?;
    }
    Ok(())
}

fn write_line<W: Write>(
    out: &mut W,
    columns: &[&str],
    values: &[String],
    widths: &[usize],
) -> anyhow::Result<()> {
    let line: Vec<String> = values
        .iter()
        .zip(widths)
        .zip(columns)
        .map(|((value, &width), column)| {
            if TEXT_COLUMNS.contains(column) {
                format!("{value:<width$}")
            } else {
                format!("{value:>width$}")
            }
        })
        .collect();
    writeln!(out, "{}", line.join("  ").trim_end())?;
    Ok(())
}

fn render_csv<W: Write>(
    rows: &[DerivedPlayerRow],
    kind: DatasetKind,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(kind.columns())
        .context("failed to write CSV header")?;
    for row in rows {
        writer
            .write_record(row.cells().iter().map(ToString::to_string))
            .context("failed to write CSV row")?;
    }
    writer.flush()?;
    Ok(())
}

fn render_json<W: Write>(rows: &[DerivedPlayerRow], out: &mut W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, rows).context("failed to serialise rows")?;
    writeln!(out)?;
    Ok(())
}

/// Print the values `--league` and `--season` accept.
pub fn render_filter_options<W: Write>(
    options: &FilterOptions,
    out: &mut W,
) -> anyhow::Result<()> {
    writeln!(out, "Leagues: all {}", options.acronyms.join(" "))?;
    writeln!(out, "Seasons: all {}", options.seasons.join(" "))?;
    Ok(())
}
