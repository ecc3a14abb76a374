pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod naming;
pub mod process;
pub mod report;
pub mod table_io;
pub mod validate;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

use crate::{
    cli::{Cli, Commands, ReportFormat},
    config::{RenamerConfig, resolve_table_name},
    model::SchemaRow,
    table_io::{CsvTableSource, TableSource},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let env = env_logger::Env::default().default_filter_or("field_renamer=info");
        let _ = env_logger::Builder::from_env(env)
            .format_timestamp_millis()
            .format_target(false)
            .try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = RenamerConfig::load_or_default(cli.config.as_deref())
        .context("Loading configuration")?;
    match cli.command {
        Commands::Process(args) => {
            let output = process::execute(&args, &config)?;
            info!("The file {} was created successfully", output.display());
            Ok(())
        }
        Commands::Validate(args) => handle_validate(&args, &config),
        Commands::Name(args) => handle_name(&args),
    }
}

fn handle_validate(args: &cli::ValidateArgs, config: &RenamerConfig) -> Result<()> {
    let input = match &args.input {
        Some(path) => path.clone(),
        None => {
            let table = resolve_table_name(args.table.as_deref(), |key| env::var(key).ok())?;
            config.output_dir.join(format!("{table}.csv"))
        }
    };
    info!("Validating '{}'", input.display());

    let mut source = CsvTableSource::new(&input, config.columns.clone())
        .with_delimiter(args.delimiter)
        .with_encoding(args.input_encoding);
    let table = source
        .read_annotated()
        .with_context(|| format!("Reading processed table {input:?}"))?;

    let report = validate::classify(&table.rows);
    match args.format {
        ReportFormat::Table => print!("{}", report::render_text(&report, &config.columns)),
        ReportFormat::Json => println!(
            "{}",
            report::render_json(&report).context("Serializing report")?
        ),
    }

    let summary = report.summary();
    info!(
        "Classified {} field(s): {} strong, {} partial, {} to check, {} duplicate(s)",
        summary.total,
        summary.strong_matches,
        summary.partial_matches,
        summary.needs_review,
        summary.duplicates
    );
    if args.strict && !report.is_clean() {
        bail!(
            "{} field(s) need review and {} share a proposed name",
            summary.needs_review,
            summary.duplicates
        );
    }
    Ok(())
}

fn handle_name(args: &cli::NameArgs) -> Result<()> {
    let row = naming::annotate(SchemaRow::new(
        args.field.as_str(),
        args.label.as_str(),
        args.value_type.clone(),
    ))?;
    println!("original_name_normalized: {}", row.original_name_normalized);
    println!("label_normalized:         {}", row.label_normalized);
    println!("proposed_name:            {}", row.proposed_name);
    Ok(())
}
