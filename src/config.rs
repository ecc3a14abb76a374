use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{RenameError, Result};

pub const TABLE_ENV_VAR: &str = "FIELD_RENAMER_TABLE";

const NORMALIZED_SUFFIX: &str = "SnakeCase";

/// Header names of the columns the renamer reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub original_name: String,
    pub label: String,
    pub value_type: String,
    pub proposed_name: String,
    pub manually_reviewed: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            original_name: "QualifiedApiName".to_string(),
            label: "Label".to_string(),
            value_type: "ValueTypeId".to_string(),
            proposed_name: "NewFieldName".to_string(),
            manually_reviewed: "WasRenamedManually".to_string(),
        }
    }
}

impl ColumnNames {
    pub fn original_name_normalized(&self) -> String {
        format!("{}{NORMALIZED_SUFFIX}", self.original_name)
    }

    pub fn label_normalized(&self) -> String {
        format!("{}{NORMALIZED_SUFFIX}", self.label)
    }

    /// Every header the renamer owns in an annotated table, in output order
    /// (passthrough columns go between `value_type` and `manually_reviewed`).
    pub fn annotated_headers(&self) -> [String; 7] {
        [
            self.original_name.clone(),
            self.label.clone(),
            self.original_name_normalized(),
            self.label_normalized(),
            self.proposed_name.clone(),
            self.value_type.clone(),
            self.manually_reviewed.clone(),
        ]
    }
}

/// Whether the export's first column is an artifact (such as `[FieldDefinition]`) to drop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadingColumnPolicy {
    /// Drop only when the header is bracketed like `[FieldDefinition]`.
    #[default]
    Auto,
    Always,
    Never,
}

impl LeadingColumnPolicy {
    pub fn should_drop(self, first_header: Option<&str>) -> bool {
        match self {
            LeadingColumnPolicy::Always => first_header.is_some(),
            LeadingColumnPolicy::Never => false,
            LeadingColumnPolicy::Auto => {
                first_header.is_some_and(|header| header.trim_start().starts_with('['))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenamerConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub columns: ColumnNames,
    pub excluded_fields: Vec<String>,
    pub drop_leading_column: LeadingColumnPolicy,
}

impl Default for RenamerConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./input_files"),
            output_dir: PathBuf::from("./output_files"),
            columns: ColumnNames::default(),
            // The CRM API refuses to read this field, so it never gets renamed.
            excluded_fields: vec!["UserRecordAccessId".to_string()],
            drop_leading_column: LeadingColumnPolicy::default(),
        }
    }
}

impl RenamerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|err| RenameError::InvalidConfig {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        serde_yaml::from_str(&raw).map_err(|err| RenameError::InvalidConfig {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn is_excluded(&self, original_name: &str) -> bool {
        self.excluded_fields
            .iter()
            .any(|excluded| excluded == original_name)
    }
}

/// Picks the table name from the command line, falling back to [`TABLE_ENV_VAR`].
pub fn resolve_table_name<F>(explicit: Option<&str>, lookup_env: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    explicit
        .map(str::to_string)
        .or_else(|| lookup_env(TABLE_ENV_VAR))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| RenameError::MissingConfiguration {
            key: TABLE_ENV_VAR.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_crm_export_headers() {
        let config = RenamerConfig::default();
        assert_eq!(config.columns.original_name, "QualifiedApiName");
        assert_eq!(
            config.columns.original_name_normalized(),
            "QualifiedApiNameSnakeCase"
        );
        assert_eq!(config.columns.label_normalized(), "LabelSnakeCase");
        assert!(config.is_excluded("UserRecordAccessId"));
        assert!(!config.is_excluded("AccountId"));
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "output_dir: out\ncolumns:\n  label: DisplayLabel\ndrop_leading_column: never\n";
        let config: RenamerConfig = serde_yaml::from_str(yaml).expect("parse yaml");
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.columns.label, "DisplayLabel");
        assert_eq!(config.columns.value_type, "ValueTypeId");
        assert_eq!(config.drop_leading_column, LeadingColumnPolicy::Never);
        assert_eq!(config.input_dir, PathBuf::from("./input_files"));
    }

    #[test]
    fn leading_column_policy() {
        assert!(LeadingColumnPolicy::Auto.should_drop(Some("[FieldDefinition]")));
        assert!(!LeadingColumnPolicy::Auto.should_drop(Some("QualifiedApiName")));
        assert!(LeadingColumnPolicy::Always.should_drop(Some("Anything")));
        assert!(!LeadingColumnPolicy::Never.should_drop(Some("[FieldDefinition]")));
        assert!(!LeadingColumnPolicy::Always.should_drop(None));
    }

    #[test]
    fn table_name_prefers_explicit_then_env() {
        let name = resolve_table_name(Some("asset"), |_| Some("ignored".into())).expect("name");
        assert_eq!(name, "asset");
        let name = resolve_table_name(None, |_| Some(" contact ".into())).expect("name");
        assert_eq!(name, "contact");
        let err = resolve_table_name(None, |_| None).unwrap_err();
        assert!(matches!(err, RenameError::MissingConfiguration { .. }));
        assert!(err.to_string().contains(TABLE_ENV_VAR));
    }
}
