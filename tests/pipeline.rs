mod common;

use std::fs;

use common::{ASSET_EXPORT, TestWorkspace};
use field_renamer::config::{ColumnNames, LeadingColumnPolicy, RenamerConfig};
use field_renamer::error::RenameError;
use field_renamer::model::{SchemaRow, ValueType};
use field_renamer::process::process;
use field_renamer::table_io::{CsvTableSink, CsvTableSource, MemoryTable, TableSource};
use field_renamer::validate::classify;

#[test]
fn process_writes_sorted_annotated_table() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("input_files/asset.csv", ASSET_EXPORT);
    let output = workspace.path().join("output_files").join("asset_final.csv");
    let config = RenamerConfig::default();

    let mut source = CsvTableSource::new(&input, config.columns.clone());
    let mut sink = CsvTableSink::new(&output, config.columns.clone());
    let summary = process(&mut source, &mut sink, &config).expect("process");

    assert_eq!(summary.read, 7);
    assert_eq!(summary.excluded, 1);
    assert_eq!(summary.skipped, vec!["Odd__c".to_string()]);
    assert_eq!(summary.written, 5);

    let contents = fs::read_to_string(&output).expect("read output");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(
        lines[0],
        "\"QualifiedApiName\",\"Label\",\"QualifiedApiNameSnakeCase\",\"LabelSnakeCase\",\"NewFieldName\",\"ValueTypeId\",\"Length\",\"WasRenamedManually\""
    );
    assert_eq!(
        lines[1],
        "\"AccountId\",\"Account ID\",\"account_id\",\"account_id\",\"account_id\",\"id\",\"18\",\"false\""
    );
    assert_eq!(lines.len(), 6);
    assert!(!contents.contains("UserRecordAccessId"));
    assert!(!contents.contains("FieldDefinition"));
    assert_eq!(workspace.list("output_files"), vec!["asset_final.csv"]);
}

#[test]
fn processed_table_round_trips_into_classification() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("asset.csv", ASSET_EXPORT);
    let output = workspace.path().join("asset_processed.csv");
    let config = RenamerConfig::default();

    let mut source = CsvTableSource::new(&input, config.columns.clone());
    let mut sink = CsvTableSink::new(&output, config.columns.clone());
    process(&mut source, &mut sink, &config).expect("process");

    let table = CsvTableSource::new(&output, config.columns.clone())
        .read_annotated()
        .expect("read annotated");
    assert_eq!(table.extra_headers, vec!["Length".to_string()]);
    let labels: Vec<&str> = table.rows.iter().map(|row| row.label()).collect();
    assert_eq!(
        labels,
        vec![
            "Account ID",
            "Competitor Asset",
            "Parent Record",
            "Serial Number",
            "Warranty"
        ]
    );
    assert_eq!(table.rows[0].schema.extra, vec!["18".to_string()]);
    assert_eq!(table.rows[1].proposed_name, "is_competitor_asset");
    assert_eq!(table.rows[4].proposed_name, "has_warranty");
    assert_eq!(table.rows[2].value_type(), &ValueType::Integer);

    let report = classify(&table.rows);
    let summary = report.summary();
    assert_eq!(summary.strong_matches, 2);
    assert_eq!(summary.partial_matches, 2);
    assert_eq!(summary.needs_review, 1);
    assert_eq!(report.needs_review[0].original_name(), "IsCompetitorProduct");
    assert!(report.duplicates.is_empty());
}

#[test]
fn hand_edited_review_flags_are_honoured() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "asset_final_version.csv",
        "QualifiedApiName,Label,QualifiedApiNameSnakeCase,LabelSnakeCase,NewFieldName,ValueTypeId,WasRenamedManually\n\
         IsCompetitorProduct,Competitor Asset,is_competitor_product,competitor_asset,is_competitor_product,boolean,True\n\
         Fax,Fax,fax,fax,facsimile,string,False\n\
         Phone,Phone,phone,phone,phone,string,\n",
    );
    let table = CsvTableSource::new(&path, ColumnNames::default())
        .read_annotated()
        .expect("read annotated");
    assert!(table.rows[0].manually_reviewed);
    assert!(!table.rows[1].manually_reviewed);
    assert!(!table.rows[2].manually_reviewed);

    let report = classify(&table.rows);
    assert_eq!(report.strong_matches.len(), 2);
    assert_eq!(report.needs_review.len(), 1);
    assert_eq!(report.needs_review[0].proposed_name, "facsimile");
}

#[test]
fn unparseable_review_flag_is_reported_with_its_row() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "bad.csv",
        "QualifiedApiName,Label,QualifiedApiNameSnakeCase,LabelSnakeCase,NewFieldName,ValueTypeId,WasRenamedManually\n\
         Fax,Fax,fax,fax,fax,string,perhaps\n",
    );
    let err = CsvTableSource::new(&path, ColumnNames::default())
        .read_annotated()
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("row 2"), "{message}");
    assert!(message.contains("perhaps"), "{message}");
}

#[test]
fn missing_input_leaves_no_output() {
    let workspace = TestWorkspace::new();
    let output = workspace.path().join("out").join("asset.csv");
    let config = RenamerConfig::default();

    let mut source =
        CsvTableSource::new(workspace.path().join("missing.csv"), config.columns.clone());
    let mut sink = CsvTableSink::new(&output, config.columns.clone());
    let err = process(&mut source, &mut sink, &config).unwrap_err();

    assert!(matches!(err, RenameError::RowSourceUnavailable { .. }));
    assert!(!output.exists());
    assert!(workspace.list("out").is_empty());
}

#[test]
fn missing_required_column_is_named() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("asset.csv", "QualifiedApiName,Label\nName,Name\n");
    let err = CsvTableSource::new(&input, ColumnNames::default())
        .read_schema()
        .unwrap_err();
    assert!(
        err.to_string()
            .contains("missing required column 'ValueTypeId'")
    );
}

#[test]
fn leading_column_policy_can_keep_the_first_column() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "contact.tsv",
        "QualifiedApiName\tLabel\tValueTypeId\nEmail\tEmail\tstring\n",
    );
    let table = CsvTableSource::new(&input, ColumnNames::default())
        .with_leading_column(LeadingColumnPolicy::Never)
        .read_schema()
        .expect("read tsv");
    assert_eq!(table.rows, vec![SchemaRow::new("Email", "Email", "string")]);
    assert!(table.extra_headers.is_empty());
}

#[test]
fn leading_column_policy_does_not_apply_to_annotated_tables() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("asset.csv", ASSET_EXPORT);
    let output = workspace.path().join("out.csv");
    let config = RenamerConfig {
        drop_leading_column: LeadingColumnPolicy::Always,
        ..RenamerConfig::default()
    };

    let mut source = CsvTableSource::new(&input, config.columns.clone())
        .with_leading_column(config.drop_leading_column);
    let mut sink = CsvTableSink::new(&output, config.columns.clone());
    process(&mut source, &mut sink, &config).expect("process");

    let table = CsvTableSource::new(&output, config.columns.clone())
        .with_leading_column(config.drop_leading_column)
        .read_annotated()
        .expect("read annotated");
    assert_eq!(table.len(), 5);
    assert_eq!(table.rows[0].original_name(), "AccountId");
    assert_eq!(table.extra_headers, vec!["Length".to_string()]);
}

#[test]
fn failing_source_never_reaches_the_sink() {
    let mut source = MemoryTable::default();
    let mut sink = MemoryTable::default();
    let err = process(&mut source, &mut sink, &RenamerConfig::default()).unwrap_err();
    assert!(matches!(err, RenameError::RowSourceUnavailable { .. }));
    assert!(sink.annotated.is_none());
}

#[test]
fn memory_pipeline_applies_custom_exclusions() {
    let mut source = MemoryTable::from_schema(vec![
        SchemaRow::new("SystemModstamp", "System Modstamp", "datetime"),
        SchemaRow::new("Name", "Name", "string"),
    ]);
    let mut sink = MemoryTable::default();
    let config = RenamerConfig {
        excluded_fields: vec!["SystemModstamp".to_string()],
        ..RenamerConfig::default()
    };
    let summary = process(&mut source, &mut sink, &config).expect("process");
    assert_eq!(summary.excluded, 1);
    let written = sink.annotated.expect("written");
    assert_eq!(written.len(), 1);
    assert_eq!(written.rows[0].proposed_name, "name");
}
