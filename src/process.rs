use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Local;
use log::{debug, info, warn};

use crate::{
    cli::ProcessArgs,
    config::{RenamerConfig, resolve_table_name},
    error,
    model::{AnnotatedTable, SchemaTable},
    naming,
    table_io::{CsvTableSink, CsvTableSource, TableSink, TableSource},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub read: usize,
    pub excluded: usize,
    /// Original names of rows whose label normalized to nothing.
    pub skipped: Vec<String>,
    pub written: usize,
}

/// Drops excluded fields, orders by label and annotates every remaining row.
///
/// Rows with an unusable label are skipped with a warning rather than given
/// an empty proposed name.
pub fn annotate_table(
    table: SchemaTable,
    config: &RenamerConfig,
) -> (AnnotatedTable, ProcessSummary) {
    let mut summary = ProcessSummary {
        read: table.rows.len(),
        ..ProcessSummary::default()
    };

    let mut rows = table.rows;
    rows.retain(|row| !config.is_excluded(&row.original_name));
    summary.excluded = summary.read - rows.len();
    rows.sort_by(|left, right| left.label.cmp(&right.label));

    let mut annotated = Vec::with_capacity(rows.len());
    for row in rows {
        let original_name = row.original_name.clone();
        match naming::annotate(row) {
            Ok(row) => {
                debug!(
                    "{} ({}) -> {}",
                    row.original_name(),
                    row.value_type(),
                    row.proposed_name
                );
                annotated.push(row);
            }
            Err(err) => {
                warn!("Skipping field: {err}");
                summary.skipped.push(original_name);
            }
        }
    }
    summary.written = annotated.len();

    (
        AnnotatedTable {
            extra_headers: table.extra_headers,
            rows: annotated,
        },
        summary,
    )
}

/// Reads the whole source, annotates it and writes the result in one sink call.
///
/// Nothing reaches the sink when the source fails.
pub fn process<S, K>(
    source: &mut S,
    sink: &mut K,
    config: &RenamerConfig,
) -> error::Result<ProcessSummary>
where
    S: TableSource + ?Sized,
    K: TableSink + ?Sized,
{
    let table = source.read_schema()?;
    info!(
        "Read {} field(s) from '{}'",
        table.rows.len(),
        source.describe()
    );
    let (annotated, summary) = annotate_table(table, config);
    sink.write_annotated(&annotated)?;
    info!(
        "Wrote {} field(s) to '{}' ({} excluded, {} skipped)",
        summary.written,
        sink.describe(),
        summary.excluded,
        summary.skipped.len()
    );
    Ok(summary)
}

pub fn timestamped_output_path(output_dir: &Path, table: &str) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    output_dir.join(format!("{table}_{stamp}.csv"))
}

fn file_stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|stem| stem.to_str())
}

pub fn execute(args: &ProcessArgs, config: &RenamerConfig) -> Result<PathBuf> {
    let table = resolve_table_name(
        args.table
            .as_deref()
            .or_else(|| args.input.as_deref().and_then(file_stem)),
        |key| env::var(key).ok(),
    )?;
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| config.input_dir.join(format!("{table}.csv")));
    let output_dir = args
        .output_dir
        .as_deref()
        .unwrap_or(config.output_dir.as_path());
    let output = timestamped_output_path(output_dir, &table);

    info!(
        "Processing table '{table}': {} -> {}",
        input.display(),
        output.display()
    );
    let mut source = CsvTableSource::new(&input, config.columns.clone())
        .with_delimiter(args.delimiter)
        .with_encoding(args.input_encoding)
        .with_leading_column(config.drop_leading_column);
    let mut sink =
        CsvTableSink::new(&output, config.columns.clone()).with_delimiter(args.delimiter);

    process(&mut source, &mut sink, config)
        .with_context(|| format!("Processing {input:?}"))?;
    Ok(output)
}
