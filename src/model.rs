//! Row types flowing through the renamer.
//!
//! A [`SchemaRow`] is one field of the exported CRM table as read from the
//! row source. [`AnnotatedRow`] adds the normalized forms and the proposed
//! name; it is what the process command writes and what the validate command
//! reads back after a human has had a chance to edit it.

use std::fmt;

use serde::{Serialize, Serializer};

/// Data type reported by the CRM for a field (`ValueTypeId` in the export).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Boolean,
    Id,
    Integer,
    String,
    Other(String),
}

impl ValueType {
    /// Matches the CRM's type identifiers exactly; anything unrecognised is kept verbatim.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "boolean" => ValueType::Boolean,
            "id" => ValueType::Id,
            "integer" => ValueType::Integer,
            "string" => ValueType::String,
            other => ValueType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ValueType::Boolean => "boolean",
            ValueType::Id => "id",
            ValueType::Integer => "integer",
            ValueType::String => "string",
            ValueType::Other(raw) => raw.as_str(),
        }
    }
}

impl From<&str> for ValueType {
    fn from(value: &str) -> Self {
        ValueType::parse(value)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ValueType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaRow {
    pub original_name: String,
    pub label: String,
    pub value_type: ValueType,
    /// Passthrough cells for export columns the renamer does not interpret.
    #[serde(skip)]
    pub extra: Vec<String>,
}

impl SchemaRow {
    pub fn new(
        original_name: impl Into<String>,
        label: impl Into<String>,
        value_type: impl Into<ValueType>,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            label: label.into(),
            value_type: value_type.into(),
            extra: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedRow {
    #[serde(flatten)]
    pub schema: SchemaRow,
    pub original_name_normalized: String,
    pub label_normalized: String,
    pub proposed_name: String,
    pub manually_reviewed: bool,
}

impl AnnotatedRow {
    pub fn original_name(&self) -> &str {
        &self.schema.original_name
    }

    pub fn label(&self) -> &str {
        &self.schema.label
    }

    pub fn value_type(&self) -> &ValueType {
        &self.schema.value_type
    }
}

/// Rows read from a source together with the headers of their passthrough cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaTable {
    pub extra_headers: Vec<String>,
    pub rows: Vec<SchemaRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotatedTable {
    pub extra_headers: Vec<String>,
    pub rows: Vec<AnnotatedRow>,
}

impl AnnotatedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
