//! giftreg: reports over the register of gifts received by MEPs.
//!
//! Configuration comes from GIFTREG_* environment variables (and `.env`);
//! the global flags below override them.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use giftreg_cli::init_tracing;
use giftreg_cli::render::{render_counts, render_records, render_report};
use giftreg_core::{
    partition_valid, ErrorMetadata, GiftRecord, GroupKey, InvalidRecordPolicy, LogLevel,
    OutputFormat, ReportConfig, ReportError, SourceKind, TieBreak,
};
use giftreg_services::ReportEngine;
use giftreg_storage::{create_source, NoteWriter};

#[derive(Parser)]
#[command(name = "giftreg", about = "Reports over the register of gifts received by MEPs")]
struct Cli {
    /// Record source: csv or vault
    #[arg(long, global = true)]
    source: Option<String>,

    /// CSV export file, or notes directory for the vault source
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Output format: table, markdown or json
    #[arg(long, global = true)]
    format: Option<String>,

    /// Show only the first N groups in grouped tables
    #[arg(long, global = true)]
    top: Option<usize>,

    /// Order of groups with equal counts: first-seen or lexicographic
    #[arg(long, global = true)]
    tie_break: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a report view
    Report {
        #[command(subcommand)]
        view: ReportView,
    },
    /// Check every record and list the malformed ones
    Validate,
    /// Write one note per gift plus MEP and donor stub notes
    ExportNotes {
        /// Root of the per-year gift note folders
        #[arg(long)]
        gifts_dir: Option<PathBuf>,
        /// Folder for MEP stub notes
        #[arg(long)]
        meps_dir: Option<PathBuf>,
        /// Folder for donor stub notes
        #[arg(long)]
        donors_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ReportView {
    /// Gifts without a photo link
    MissingPhoto,
    /// Gifts with a photo link
    WithPhoto,
    /// Gift counts per MEP
    ByMep,
    /// Gift counts per donor
    ByDonor,
    /// Gift counts per key (mep or donor)
    Group {
        key: String,
    },
    /// Gifts received by one MEP or given by one donor
    For {
        /// mep or donor
        key: String,
        name: String,
    },
    /// Summary plus every view
    All,
}

fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = match err.chain().find_map(|e| e.downcast_ref::<ReportError>()) {
                Some(report_err) => {
                    match report_err.log_level() {
                        LogLevel::Debug => tracing::debug!(code = report_err.error_code(), "{:#}", err),
                        LogLevel::Warn => tracing::warn!(code = report_err.error_code(), "{:#}", err),
                        LogLevel::Error => tracing::error!(code = report_err.error_code(), "{:#}", err),
                    }
                    report_err.exit_code()
                }
                None => {
                    tracing::error!("{:#}", err);
                    1
                }
            };
            eprintln!("Error: {:#}", err);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(&cli)?;

    match cli.command {
        Commands::Report { view } => {
            let records = load_valid_records(&config)?;
            let engine = ReportEngine::new(config.tie_break);
            print!("{}", render_view(&engine, &records, view, &config)?);
        }
        Commands::Validate => {
            let source = create_source(&config).context("Failed to open record source")?;
            let records = source.load().context("Failed to load gift records")?;
            let total = records.len();
            let (valid, rejected) = partition_valid(records, InvalidRecordPolicy::Skip)?;

            for err in &rejected {
                println!("{}", err);
            }
            println!(
                "{} records, {} valid, {} malformed",
                total,
                valid.len(),
                rejected.len()
            );

            if let Some(first) = rejected.into_iter().next() {
                return Err(anyhow::Error::new(first).context("Register contains malformed records"));
            }
        }
        Commands::ExportNotes {
            gifts_dir,
            meps_dir,
            donors_dir,
        } => {
            if let Some(dir) = gifts_dir {
                config.gifts_dir = dir;
            }
            if let Some(dir) = meps_dir {
                config.meps_dir = dir;
            }
            if let Some(dir) = donors_dir {
                config.donors_dir = dir;
            }
            config.validate().map_err(configuration_error)?;

            let records = load_valid_records(&config)?;
            let writer = NoteWriter::new(&config.gifts_dir, &config.meps_dir, &config.donors_dir);
            let summary = writer.export(&records).context("Failed to export notes")?;

            if config.output_format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&summary).context("Serialize summary")?);
            } else {
                println!(
                    "Wrote {} gift notes to {}, {} MEP notes to {}, {} donor notes to {}",
                    summary.gift_notes,
                    config.gifts_dir.display(),
                    summary.mep_notes,
                    config.meps_dir.display(),
                    summary.donor_notes,
                    config.donors_dir.display()
                );
            }
        }
    }

    Ok(())
}

fn configuration_error(err: anyhow::Error) -> ReportError {
    ReportError::Configuration(format!("{:#}", err))
}

/// Environment configuration with the command-line flags applied on top.
fn load_config(cli: &Cli) -> anyhow::Result<ReportConfig> {
    let mut config = ReportConfig::from_env().map_err(configuration_error)?;

    if let Some(source) = &cli.source {
        config.source = source.parse::<SourceKind>().map_err(configuration_error)?;
    }
    if let Some(input) = &cli.input {
        config.input = Some(input.clone());
    }
    if let Some(format) = &cli.format {
        config.output_format = format.parse::<OutputFormat>().map_err(configuration_error)?;
    }
    if let Some(top) = cli.top {
        config.top_n = Some(top);
    }
    if let Some(tie_break) = &cli.tie_break {
        config.tie_break = tie_break.parse::<TieBreak>()?;
    }

    config.validate().map_err(configuration_error)?;
    Ok(config)
}

fn load_valid_records(config: &ReportConfig) -> anyhow::Result<Vec<GiftRecord>> {
    let source = create_source(config).context("Failed to open record source")?;
    let records = source.load().context("Failed to load gift records")?;
    let (valid, _) = partition_valid(records, config.invalid_records)?;
    Ok(valid)
}

fn render_view(
    engine: &ReportEngine,
    records: &[GiftRecord],
    view: ReportView,
    config: &ReportConfig,
) -> anyhow::Result<String> {
    let format = config.output_format;
    let top_n = config.top_n;

    match view {
        ReportView::MissingPhoto => render_records(
            "Gifts missing a photo",
            &engine.records_missing_photo(records),
            format,
        ),
        ReportView::WithPhoto => {
            render_records("Gifts with a photo", &engine.records_with_photo(records), format)
        }
        ReportView::ByMep => render_counts(
            GroupKey::Mep.heading(),
            &engine.group_and_count_by(records, GroupKey::Mep)?,
            format,
            top_n,
        ),
        ReportView::ByDonor => render_counts(
            GroupKey::Donor.heading(),
            &engine.group_and_count_by(records, GroupKey::Donor)?,
            format,
            top_n,
        ),
        ReportView::Group { key } => {
            let key: GroupKey = key.parse()?;
            render_counts(
                key.heading(),
                &engine.group_and_count_by(records, key)?,
                format,
                top_n,
            )
        }
        ReportView::For { key, name } => {
            let key: GroupKey = key.parse()?;
            let title = format!("Gifts for {} {}", key.heading(), name.trim());
            render_records(&title, &engine.records_for(records, key, &name)?, format)
        }
        ReportView::All => render_report(&engine.build_report(records)?, format, top_n),
    }
}
