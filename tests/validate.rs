use field_renamer::model::{AnnotatedRow, SchemaRow};
use field_renamer::naming::annotate;
use field_renamer::validate::{MatchTier, classify};

fn processed(original: &str, label: &str, value_type: &str) -> AnnotatedRow {
    annotate(SchemaRow::new(original, label, value_type)).expect("annotated")
}

fn with_proposal(mut row: AnnotatedRow, proposed: &str) -> AnnotatedRow {
    row.proposed_name = proposed.to_string();
    row
}

#[test]
fn every_row_lands_in_exactly_one_tier() {
    let mut reviewed = processed("Mystery__c", "Something Else", "string");
    reviewed.manually_reviewed = true;
    let rows = vec![
        processed("BillingCity", "Billing City", "string"),
        processed("IsActive__c", "Active", "boolean"),
        processed("Name", "Account Name", "string"),
        reviewed,
        with_proposal(processed("Phone", "Phone", "string"), "phone_number"),
    ];
    let report = classify(&rows);

    for row in &rows {
        let hits = [
            &report.strong_matches,
            &report.partial_matches,
            &report.needs_review,
        ]
        .iter()
        .filter(|bucket| bucket.iter().any(|candidate| std::ptr::eq(*candidate, row)))
        .count();
        assert_eq!(hits, 1, "row {:?} should land in exactly one tier", row.proposed_name);
    }

    let summary = report.summary();
    assert_eq!(summary.total, rows.len());
    // billing_city and the reviewed row
    assert_eq!(summary.strong_matches, 2);
    // is_active only matches the field name, account_name only the label
    assert_eq!(summary.partial_matches, 2);
    assert_eq!(summary.needs_review, 1);
}

#[test]
fn manual_review_overrides_disagreement() {
    let mut row = with_proposal(processed("Fax", "Fax", "string"), "facsimile");
    assert_eq!(MatchTier::of(&row), MatchTier::NeedsReview);
    row.manually_reviewed = true;
    assert_eq!(MatchTier::of(&row), MatchTier::Strong);
}

#[test]
fn empty_table_has_empty_buckets() {
    let report = classify(&[]);
    assert!(report.strong_matches.is_empty());
    assert!(report.partial_matches.is_empty());
    assert!(report.needs_review.is_empty());
    assert!(report.duplicates.is_empty());
}

#[test]
fn duplicates_contain_exactly_the_colliding_rows() {
    let rows = vec![
        processed("Status", "Status", "string"),
        processed("Region", "Region", "string"),
        processed("Status__c", "Status", "string"),
        processed("Owner", "Owner", "string"),
    ];
    let report = classify(&rows);
    let duplicated: Vec<&str> = report
        .duplicates
        .iter()
        .map(|row| row.original_name())
        .collect();
    assert_eq!(duplicated, vec!["Status", "Status__c"]);
}

#[test]
fn duplicates_ignore_everything_but_the_proposed_name() {
    let rows = vec![
        processed("IsPrimary", "Primary", "boolean"),
        with_proposal(processed("PrimaryFlag__c", "Primary Flag", "string"), "is_primary"),
    ];
    let report = classify(&rows);
    assert_eq!(report.duplicates.len(), 2);
}
