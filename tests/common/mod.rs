#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

pub const EXPORT_HEADER: &str = "[FieldDefinition],QualifiedApiName,Label,ValueTypeId,Length";

/// A schema export as produced by the CRM, including the leading artifact column.
pub const ASSET_EXPORT: &str = "\
[FieldDefinition],QualifiedApiName,Label,ValueTypeId,Length
FieldDefinition,IsCompetitorProduct,Competitor Asset,boolean,0
FieldDefinition,AccountId,Account ID,id,18
FieldDefinition,UserRecordAccessId,User Record Access ID,id,18
FieldDefinition,HasWarranty__c,Warranty,boolean,0
FieldDefinition,ParentRecordId,Parent Record,integer,0
FieldDefinition,SerialNumber,Serial Number,string,80
FieldDefinition,Odd__c,???,string,10
";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` under the workspace, creating parent directories.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, contents).expect("write temp file contents");
        path
    }

    /// Lists the file names directly inside `dir`, sorted.
    pub fn list(&self, dir: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path().join(dir))
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}
