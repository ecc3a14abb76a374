use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use encoding_rs::Encoding;

use crate::{model::ValueType, table_io::DEFAULT_TSV_DELIMITER};

#[derive(Debug, Parser)]
#[command(author, version, about = "Standardize CRM schema field names", long_about = None)]
pub struct Cli {
    /// YAML configuration file (paths, column names, excluded fields)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Derive standardized names for every field of an exported table schema
    Process(ProcessArgs),
    /// Classify a processed table by how well the proposed names agree
    Validate(ValidateArgs),
    /// Show the normalized forms and proposed name of a single field
    Name(NameArgs),
}

#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Table name; reads `<input_dir>/<table>.csv` (falls back to FIELD_RENAMER_TABLE)
    #[arg(short, long)]
    pub table: Option<String>,
    /// Explicit input file, overriding the configured input directory
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// Directory receiving `<table>_<timestamp>.csv`
    #[arg(short, long = "output-dir")]
    pub output_dir: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file
    #[arg(long = "input-encoding", value_parser = parse_encoding, default_value = "utf-8")]
    pub input_encoding: &'static Encoding,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Processed table name; reads `<output_dir>/<table>.csv` (falls back to FIELD_RENAMER_TABLE)
    #[arg(short, long)]
    pub table: Option<String>,
    /// Explicit processed file, overriding the configured output directory
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// How to print the classification
    #[arg(long, value_enum, default_value = "table")]
    pub format: ReportFormat,
    /// Exit with an error when any field needs review or collides with another
    #[arg(long)]
    pub strict: bool,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file
    #[arg(long = "input-encoding", value_parser = parse_encoding, default_value = "utf-8")]
    pub input_encoding: &'static Encoding,
}

#[derive(Debug, Args)]
pub struct NameArgs {
    /// Original API field name, e.g. `AccountNumber__c`
    #[arg(short, long)]
    pub field: String,
    /// Display label, e.g. `Account Number`
    #[arg(short, long)]
    pub label: String,
    /// CRM value type (boolean, id, integer, string, ...)
    #[arg(short = 'T', long = "type", value_parser = parse_value_type, default_value = "string")]
    pub value_type: ValueType,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(DEFAULT_TSV_DELIMITER),
        "," | ";" | "|" => Ok(value.as_bytes()[0]),
        other => Err(format!(
            "Unsupported delimiter '{other}' (expected ',', ';', '|' or 'tab')"
        )),
    }
}

pub fn parse_encoding(value: &str) -> Result<&'static Encoding, String> {
    Encoding::for_label(value.trim().as_bytes()).ok_or_else(|| format!("Unknown encoding '{value}'"))
}

pub fn parse_value_type(value: &str) -> Result<ValueType, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("Value type cannot be empty".to_string());
    }
    Ok(ValueType::parse(trimmed))
}
