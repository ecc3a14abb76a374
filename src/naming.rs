//! Field-name normalization heuristics.
//!
//! Raw API names (`AccountNumber__c`, `ParentRecordId`) and free-text labels
//! (`Customer ID#`) are both reduced to snake_case tokens, then combined with
//! the CRM data type to propose a standardized field name.

use std::{borrow::Cow, sync::OnceLock};

use regex::Regex;

use crate::{
    error::{RenameError, Result},
    model::{AnnotatedRow, SchemaRow, ValueType},
};

/// Suffixes the CRM appends to custom (non-standard) field names.
const CUSTOM_FIELD_MARKERS: [&str; 2] = ["__c", "_c"];

const LABEL_SEPARATORS: &[char] = &[' ', '-', '+'];

const LABEL_PUNCTUATION: &[char] = &[
    '`', '~', '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '-', '=', '+', '?', '{', '}', '[',
    ']', '|', '\\', '/', '<', '>', ',', '.', ';', ':', '\'', '"', '°',
];

static PASCAL_BOUNDARY: OnceLock<Regex> = OnceLock::new();
static CAMEL_BOUNDARY: OnceLock<Regex> = OnceLock::new();

fn pascal_boundary() -> &'static Regex {
    PASCAL_BOUNDARY.get_or_init(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("static pattern"))
}

fn camel_boundary() -> &'static Regex {
    CAMEL_BOUNDARY.get_or_init(|| Regex::new(r"([a-z0-9])([A-Z])").expect("static pattern"))
}

/// Applies a regex replacement, borrowing the input when nothing matches.
fn regex_replace<'a>(value: &'a str, regex: &Regex, replacement: &str) -> Cow<'a, str> {
    if regex.is_match(value) {
        Cow::Owned(regex.replace_all(value, replacement).into_owned())
    } else {
        Cow::Borrowed(value)
    }
}

fn strip_custom_marker(value: &str) -> &str {
    CUSTOM_FIELD_MARKERS
        .iter()
        .find_map(|marker| value.strip_suffix(*marker))
        .unwrap_or(value)
}

fn normalize_field_name_once(raw: &str) -> String {
    let stripped = strip_custom_marker(raw);
    let pascal = regex_replace(stripped, pascal_boundary(), "${1}_${2}");
    let camel = regex_replace(&pascal, camel_boundary(), "${1}_${2}");
    camel
        .to_lowercase()
        .replace("identifier", "id")
        .chars()
        .map(|ch| {
            if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

/// Converts an API field name such as `ParentRecordId` or `Region__c` to snake_case.
///
/// The result only contains `[a-z0-9_]` and is stable under re-normalization:
/// a marker or alias exposed by lowercasing is removed on a further pass.
pub fn normalize_field_name(raw: &str) -> String {
    let mut current = normalize_field_name_once(raw);
    loop {
        // After the first pass every step either shortens the value or leaves it alone.
        let next = normalize_field_name_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Converts a display label such as `Customer ID#` to snake_case.
pub fn normalize_label(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace('#', "number")
        .replace("identifier", "id")
        .replace(LABEL_SEPARATORS, "_")
        .replace(LABEL_PUNCTUATION, "")
}

fn first_token(value: &str) -> &str {
    value.split('_').next().unwrap_or_default()
}

fn last_token(value: &str) -> &str {
    value.rsplit('_').next().unwrap_or_default()
}

/// Builds the proposed name from already-normalized forms.
pub fn compose_field_name(
    original_normalized: &str,
    label_normalized: &str,
    value_type: &ValueType,
) -> String {
    let original_first = first_token(original_normalized);
    let original_last = last_token(original_normalized);
    let label_first = first_token(label_normalized);
    let label_last = last_token(label_normalized);

    let prefix = match value_type {
        ValueType::Boolean if !matches!(label_first, "is" | "has") => {
            if original_first == "has" {
                "has_"
            } else {
                "is_"
            }
        }
        _ => "",
    };

    let suffix = match value_type {
        ValueType::Id if label_last != "id" => "_id",
        ValueType::Integer | ValueType::String
            if original_last == "id" && label_last != "id" =>
        {
            "_id"
        }
        _ => "",
    };

    format!("{prefix}{label_normalized}{suffix}")
}

/// Proposes a standardized field name from the raw API name, label and data type.
///
/// An empty label yields only the prefix/suffix; use [`annotate`] to reject such rows.
pub fn derive_field_name(original_name: &str, label: &str, value_type: &ValueType) -> String {
    compose_field_name(
        &normalize_field_name(original_name),
        &normalize_label(label),
        value_type,
    )
}

/// Annotates a schema row with its normalized forms and proposed name.
///
/// Fails with [`RenameError::InvalidLabel`] when the label has no token left
/// after normalization, since the proposal would carry no name at all.
pub fn annotate(row: SchemaRow) -> Result<AnnotatedRow> {
    let label_normalized = normalize_label(&row.label);
    if label_normalized.split('_').all(str::is_empty) {
        return Err(RenameError::InvalidLabel {
            original_name: row.original_name,
            label: row.label,
        });
    }
    let original_name_normalized = normalize_field_name(&row.original_name);
    let proposed_name =
        compose_field_name(&original_name_normalized, &label_normalized, &row.value_type);
    Ok(AnnotatedRow {
        schema: row,
        original_name_normalized,
        label_normalized,
        proposed_name,
        manually_reviewed: false,
    })
}
