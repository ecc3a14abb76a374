//! Row sources and sinks.
//!
//! The renamer core never touches files directly. It reads rows from a
//! [`TableSource`] and hands the finished table to a [`TableSink`]. The CSV
//! implementations here are the default collaborators:
//!
//! - **Delimiter resolution**: `.tsv` → tab, anything else → comma, unless
//!   overridden on the command line.
//! - **Encoding**: input is decoded via `encoding_rs` (UTF-8 by default);
//!   output is always UTF-8.
//! - **Column lookup**: required columns are found by header name, everything
//!   else is carried through untouched.
//! - **Atomic output**: the sink writes a `.partial` sibling and renames it
//!   into place once every row is written.

use std::{
    collections::HashSet,
    fs::{self, File},
    io::{BufReader, BufWriter, Read},
    path::{Path, PathBuf},
};

use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    config::{ColumnNames, LeadingColumnPolicy},
    error::{RenameError, Result},
    model::{AnnotatedRow, AnnotatedTable, SchemaRow, SchemaTable, ValueType},
};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub trait TableSource {
    /// Human-readable name used in logs and errors.
    fn describe(&self) -> String;
    fn read_schema(&mut self) -> Result<SchemaTable>;
    fn read_annotated(&mut self) -> Result<AnnotatedTable>;
}

pub trait TableSink {
    fn describe(&self) -> String;
    /// Persists the whole table; implementations must not leave partial output behind.
    fn write_annotated(&mut self, table: &AnnotatedTable) -> Result<()>;
}

/// Explicit choice wins; otherwise `.tsv` files are tab separated and everything else uses commas.
pub fn resolve_delimiter(path: &Path, explicit: Option<u8>) -> u8 {
    if let Some(delimiter) = explicit {
        return delimiter;
    }
    let is_tsv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
    if is_tsv {
        DEFAULT_TSV_DELIMITER
    } else {
        DEFAULT_CSV_DELIMITER
    }
}

fn open_csv_reader<R: Read>(reader: R, delimiter: u8) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false)
        .from_reader(reader)
}

fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Option<Vec<String>> {
    record
        .iter()
        .map(|field| {
            let (text, _, had_errors) = encoding.decode(field);
            (!had_errors).then(|| text.into_owned())
        })
        .collect()
}

/// Header positions of the columns a source needs, plus the passthrough ones.
#[derive(Debug)]
struct HeaderLayout {
    headers: Vec<String>,
    first_column: usize,
}

impl HeaderLayout {
    fn new(headers: Vec<String>, policy: LeadingColumnPolicy) -> Self {
        let first_column = usize::from(policy.should_drop(headers.first().map(String::as_str)));
        Self {
            headers,
            first_column,
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .enumerate()
            .skip(self.first_column)
            .find(|(_, header)| header.as_str() == name)
            .map(|(idx, _)| idx)
    }

    fn extras(&self, known: &[usize]) -> Vec<usize> {
        let known: HashSet<usize> = known.iter().copied().collect();
        (self.first_column..self.headers.len())
            .filter(|idx| !known.contains(idx))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct CsvTableSource {
    path: PathBuf,
    delimiter: u8,
    encoding: &'static Encoding,
    columns: ColumnNames,
    leading_column: LeadingColumnPolicy,
}

impl CsvTableSource {
    pub fn new(path: impl Into<PathBuf>, columns: ColumnNames) -> Self {
        let path = path.into();
        let delimiter = resolve_delimiter(&path, None);
        Self {
            path,
            delimiter,
            encoding: UTF_8,
            columns,
            leading_column: LeadingColumnPolicy::default(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: Option<u8>) -> Self {
        self.delimiter = resolve_delimiter(&self.path, delimiter);
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Applies to raw exports only; annotated tables are always read from their first column.
    pub fn with_leading_column(mut self, policy: LeadingColumnPolicy) -> Self {
        self.leading_column = policy;
        self
    }

    fn unavailable(&self, reason: impl ToString) -> RenameError {
        RenameError::source_unavailable(self.describe(), reason)
    }

    fn open(
        &self,
        leading_column: LeadingColumnPolicy,
    ) -> Result<(csv::Reader<BufReader<File>>, HeaderLayout)> {
        let file = File::open(&self.path).map_err(|err| self.unavailable(err))?;
        let mut reader = open_csv_reader(BufReader::new(file), self.delimiter);
        let headers = reader
            .byte_headers()
            .map_err(|err| self.unavailable(err))?
            .clone();
        let headers = decode_record(&headers, self.encoding).ok_or_else(|| {
            self.unavailable(format!("headers are not valid {}", self.encoding.name()))
        })?;
        let layout = HeaderLayout::new(headers, leading_column);
        debug!(
            "Opened {:?} with {} column(s), skipping {}",
            self.path,
            layout.headers.len(),
            layout.first_column
        );
        Ok((reader, layout))
    }

    fn require(&self, layout: &HeaderLayout, name: &str) -> Result<usize> {
        layout
            .position(name)
            .ok_or_else(|| self.unavailable(format!("missing required column '{name}'")))
    }

    /// Decodes every data row, reporting 1-based line numbers (the header is line 1).
    fn for_each_row<F>(
        &self,
        reader: &mut csv::Reader<BufReader<File>>,
        mut handle: F,
    ) -> Result<()>
    where
        F: FnMut(usize, Vec<String>) -> Result<()>,
    {
        for (row_idx, record) in reader.byte_records().enumerate() {
            let line = row_idx + 2;
            let record =
                record.map_err(|err| self.unavailable(format!("reading row {line}: {err}")))?;
            let decoded = decode_record(&record, self.encoding).ok_or_else(|| {
                self.unavailable(format!(
                    "row {line} is not valid {}",
                    self.encoding.name()
                ))
            })?;
            handle(line, decoded)?;
        }
        Ok(())
    }
}

fn cell(record: &mut [String], idx: usize) -> String {
    record.get_mut(idx).map(std::mem::take).unwrap_or_default()
}

fn pick_extras(record: &mut [String], extras: &[usize]) -> Vec<String> {
    extras.iter().map(|idx| cell(record, *idx)).collect()
}

pub fn parse_reviewed_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "f" | "no" | "n" | "0" => Some(false),
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        _ => None,
    }
}

impl TableSource for CsvTableSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_schema(&mut self) -> Result<SchemaTable> {
        let (mut reader, layout) = self.open(self.leading_column)?;
        let original = self.require(&layout, &self.columns.original_name)?;
        let label = self.require(&layout, &self.columns.label)?;
        let value_type = self.require(&layout, &self.columns.value_type)?;
        let extras = layout.extras(&[original, label, value_type]);

        let mut rows = Vec::new();
        self.for_each_row(&mut reader, |_, mut record| {
            let value_type = ValueType::parse(&record[value_type]);
            rows.push(SchemaRow {
                original_name: cell(&mut record, original),
                label: cell(&mut record, label),
                value_type,
                extra: pick_extras(&mut record, &extras),
            });
            Ok(())
        })?;

        Ok(SchemaTable {
            extra_headers: extras.iter().map(|idx| layout.headers[*idx].clone()).collect(),
            rows,
        })
    }

    fn read_annotated(&mut self) -> Result<AnnotatedTable> {
        // Annotated tables are our own output and start with the original name.
        let (mut reader, layout) = self.open(LeadingColumnPolicy::Never)?;
        let original = self.require(&layout, &self.columns.original_name)?;
        let label = self.require(&layout, &self.columns.label)?;
        let value_type = self.require(&layout, &self.columns.value_type)?;
        let original_normalized =
            self.require(&layout, &self.columns.original_name_normalized())?;
        let label_normalized = self.require(&layout, &self.columns.label_normalized())?;
        let proposed = self.require(&layout, &self.columns.proposed_name)?;
        // Older exports may lack the review column; a missing flag means "not reviewed".
        let reviewed = layout.position(&self.columns.manually_reviewed);

        let mut known = vec![
            original,
            label,
            value_type,
            original_normalized,
            label_normalized,
            proposed,
        ];
        known.extend(reviewed);
        let extras = layout.extras(&known);

        let mut rows = Vec::new();
        self.for_each_row(&mut reader, |line, mut record| {
            let manually_reviewed = match reviewed {
                Some(idx) => parse_reviewed_flag(&record[idx]).ok_or_else(|| {
                    self.unavailable(format!(
                        "row {line} column '{}': cannot parse '{}' as boolean",
                        self.columns.manually_reviewed, record[idx]
                    ))
                })?,
                None => false,
            };
            let value_type = ValueType::parse(&record[value_type]);
            rows.push(AnnotatedRow {
                schema: SchemaRow {
                    original_name: cell(&mut record, original),
                    label: cell(&mut record, label),
                    value_type,
                    extra: pick_extras(&mut record, &extras),
                },
                original_name_normalized: cell(&mut record, original_normalized),
                label_normalized: cell(&mut record, label_normalized),
                proposed_name: cell(&mut record, proposed),
                manually_reviewed,
            });
            Ok(())
        })?;

        Ok(AnnotatedTable {
            extra_headers: extras.iter().map(|idx| layout.headers[*idx].clone()).collect(),
            rows,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CsvTableSink {
    path: PathBuf,
    delimiter: u8,
    columns: ColumnNames,
}

impl CsvTableSink {
    pub fn new(path: impl Into<PathBuf>, columns: ColumnNames) -> Self {
        let path = path.into();
        let delimiter = resolve_delimiter(&path, None);
        Self {
            path,
            delimiter,
            columns,
        }
    }

    pub fn with_delimiter(mut self, delimiter: Option<u8>) -> Self {
        self.delimiter = resolve_delimiter(&self.path, delimiter);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn partial_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".partial");
        self.path.with_file_name(name)
    }

    fn write_rows(&self, target: &Path, table: &AnnotatedTable) -> Result<()> {
        let failed = |err: &dyn std::fmt::Display| RenameError::sink_failed(self.describe(), err);
        let file = File::create(target).map_err(|err| failed(&err))?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(QuoteStyle::Always)
            .double_quote(true)
            .from_writer(BufWriter::new(file));

        let [
            original,
            label,
            original_normalized,
            label_normalized,
            proposed,
            value_type,
            reviewed,
        ] = self.columns.annotated_headers();
        let mut headers = vec![
            original,
            label,
            original_normalized,
            label_normalized,
            proposed,
            value_type,
        ];
        headers.extend(table.extra_headers.iter().cloned());
        headers.push(reviewed);
        writer.write_record(&headers).map_err(|err| failed(&err))?;

        for row in &table.rows {
            let mut record: Vec<&str> = vec![
                row.original_name(),
                row.label(),
                row.original_name_normalized.as_str(),
                row.label_normalized.as_str(),
                row.proposed_name.as_str(),
                row.value_type().as_str(),
            ];
            record.extend(row.schema.extra.iter().map(String::as_str));
            record.push(if row.manually_reviewed { "true" } else { "false" });
            writer.write_record(&record).map_err(|err| failed(&err))?;
        }
        writer.flush().map_err(|err| failed(&err))
    }
}

impl TableSink for CsvTableSink {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn write_annotated(&mut self, table: &AnnotatedTable) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|err| RenameError::sink_failed(self.describe(), err))?;
        }
        let partial = self.partial_path();
        if let Err(err) = self.write_rows(&partial, table) {
            let _ = fs::remove_file(&partial);
            return Err(err);
        }
        fs::rename(&partial, &self.path).map_err(|err| {
            let _ = fs::remove_file(&partial);
            RenameError::sink_failed(self.describe(), err)
        })
    }
}

/// In-memory source and sink, handy for driving the pipeline without files.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    pub schema: Option<SchemaTable>,
    pub annotated: Option<AnnotatedTable>,
}

impl MemoryTable {
    pub fn from_schema(rows: Vec<SchemaRow>) -> Self {
        Self {
            schema: Some(SchemaTable {
                extra_headers: Vec::new(),
                rows,
            }),
            annotated: None,
        }
    }
}

impl TableSource for MemoryTable {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn read_schema(&mut self) -> Result<SchemaTable> {
        self.schema
            .clone()
            .ok_or_else(|| RenameError::source_unavailable("memory", "no schema rows loaded"))
    }

    fn read_annotated(&mut self) -> Result<AnnotatedTable> {
        self.annotated
            .clone()
            .ok_or_else(|| RenameError::source_unavailable("memory", "no annotated rows loaded"))
    }
}

impl TableSink for MemoryTable {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn write_annotated(&mut self, table: &AnnotatedTable) -> Result<()> {
        self.annotated = Some(table.clone());
        Ok(())
    }
}
