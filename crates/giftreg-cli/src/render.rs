//! Output rendering for report views.
//!
//! Every view renders as a fixed-width terminal table, a Markdown table, or
//! pretty JSON. `top_n` limits grouped counts only; record lists are printed
//! in full.

use std::fmt::Write as _;

use anyhow::Context;
use giftreg_core::{GiftRecord, GiftReport, GroupCount, OutputFormat};
use serde::Serialize;

use crate::truncate_string;

const RECORD_COLUMNS: [(&str, usize); 5] = [
    ("Reg. no", 10),
    ("MEP", 24),
    ("Donor", 28),
    ("Description", 40),
    ("Received", 10),
];

/// Render a list of gift records
pub fn render_records(title: &str, records: &[&GiftRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => to_json(&records),
        OutputFormat::Table => Ok(records_table(title, records)),
        OutputFormat::Markdown => Ok(records_markdown(title, records)),
    }
}

/// Render grouped counts, keeping the first `top_n` groups when set
pub fn render_counts(
    heading: &str,
    counts: &[GroupCount],
    format: OutputFormat,
    top_n: Option<usize>,
) -> anyhow::Result<String> {
    let shown = limit(counts, top_n);
    match format {
        OutputFormat::Json => to_json(&shown),
        OutputFormat::Table => Ok(counts_table(heading, shown, counts.len())),
        OutputFormat::Markdown => Ok(counts_markdown(heading, shown, counts.len())),
    }
}

#[derive(Serialize)]
struct ReportView<'r, 'a> {
    total: usize,
    photo_coverage_percent: f64,
    missing_photo: &'r [&'a GiftRecord],
    with_photo: &'r [&'a GiftRecord],
    by_mep: &'r [GroupCount],
    by_donor: &'r [GroupCount],
}

/// Render the full report: summary, gifts missing a photo, gifts with a photo, both group tables
pub fn render_report(
    report: &GiftReport<'_>,
    format: OutputFormat,
    top_n: Option<usize>,
) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return to_json(&ReportView {
            total: report.total,
            photo_coverage_percent: report.photo_coverage_percent(),
            missing_photo: &report.missing_photo,
            with_photo: &report.with_photo,
            by_mep: limit(&report.by_mep, top_n),
            by_donor: limit(&report.by_donor, top_n),
        });
    }

    let mut out = String::new();
    match format {
        OutputFormat::Markdown => {
            let _ = writeln!(out, "# Gift register report\n");
            let _ = writeln!(
                out,
                "{} gifts, {} with photo ({:.1}%), {} missing a photo.\n",
                report.total,
                report.with_photo.len(),
                report.photo_coverage_percent(),
                report.missing_photo.len()
            );
        }
        _ => {
            let _ = writeln!(out, "\n=== Gift Register Report ===\n");
            let _ = writeln!(out, "Total gifts:    {:>6}", report.total);
            let _ = writeln!(
                out,
                "With photo:     {:>6} ({:.1}%)",
                report.with_photo.len(),
                report.photo_coverage_percent()
            );
            let _ = writeln!(out, "Missing photo:  {:>6}", report.missing_photo.len());
        }
    }

    out.push_str(&render_records("Gifts missing a photo", &report.missing_photo, format)?);
    out.push_str(&render_records("Gifts with a photo", &report.with_photo, format)?);
    out.push_str(&render_counts("MEP", &report.by_mep, format, top_n)?);
    out.push_str(&render_counts("Donor", &report.by_donor, format, top_n)?);
    Ok(out)
}

fn to_json(value: &impl Serialize) -> anyhow::Result<String> {
    let mut out = serde_json::to_string_pretty(value).context("Serialize report")?;
    out.push('\n');
    Ok(out)
}

fn limit(counts: &[GroupCount], top_n: Option<usize>) -> &[GroupCount] {
    match top_n {
        Some(n) if n < counts.len() => &counts[..n],
        _ => counts,
    }
}

fn record_cells(record: &GiftRecord) -> [String; 5] {
    [
        record.registration_number.clone(),
        record.mep().unwrap_or_default().to_string(),
        record.donor().unwrap_or_default().to_string(),
        record.description_of_gift.clone(),
        record
            .date_of_reception
            .as_ref()
            .map(|d| d.date().to_string())
            .unwrap_or_default(),
    ]
}

fn records_table(title: &str, records: &[&GiftRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n--- {} ({}) ---", title, records.len());
    if records.is_empty() {
        let _ = writeln!(out, "(none)");
        return out;
    }

    let header: Vec<String> = RECORD_COLUMNS
        .iter()
        .map(|(name, width)| format!("{:<width$}", name, width = *width))
        .collect();
    let _ = writeln!(out, "{}", header.join(" ").trim_end());

    for record in records {
        let row: Vec<String> = record_cells(record)
            .iter()
            .zip(RECORD_COLUMNS.iter())
            .map(|(cell, (_, width))| {
                format!("{:<width$}", truncate_string(cell, *width), width = *width)
            })
            .collect();
        let _ = writeln!(out, "{}", row.join(" ").trim_end());
    }
    out
}

fn records_markdown(title: &str, records: &[&GiftRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## {} ({})\n", title, records.len());
    if records.is_empty() {
        let _ = writeln!(out, "_None._\n");
        return out;
    }

    let names: Vec<&str> = RECORD_COLUMNS.iter().map(|(name, _)| *name).collect();
    let _ = writeln!(out, "| {} |", names.join(" | "));
    let _ = writeln!(out, "|{}", "---|".repeat(names.len()));
    for record in records {
        let cells: Vec<String> = record_cells(record).iter().map(|c| escape_markdown(c)).collect();
        let _ = writeln!(out, "| {} |", cells.join(" | "));
    }
    out.push('\n');
    out
}

fn counts_table(heading: &str, shown: &[GroupCount], total_groups: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n--- Gifts by {} ---", heading);
    if shown.is_empty() {
        let _ = writeln!(out, "(none)");
        return out;
    }
    for count in shown {
        let _ = writeln!(out, "{:<40} {:>6}", truncate_string(&count.key, 38), count.count);
    }
    if total_groups > shown.len() {
        let _ = writeln!(out, "... and {} more", total_groups - shown.len());
    }
    out
}

fn counts_markdown(heading: &str, shown: &[GroupCount], total_groups: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## Gifts by {}\n", heading);
    if shown.is_empty() {
        let _ = writeln!(out, "_None._\n");
        return out;
    }
    let _ = writeln!(out, "| {} | Gifts |\n|---|---:|", heading);
    for count in shown {
        let _ = writeln!(out, "| {} | {} |", escape_markdown(&count.key), count.count);
    }
    if total_groups > shown.len() {
        let _ = writeln!(out, "\n_... and {} more._", total_groups - shown.len());
    }
    out.push('\n');
    out
}

fn escape_markdown(cell: &str) -> String {
    cell.replace('|', "\\|")
}
