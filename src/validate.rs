//! Agreement tiers for an annotated table.
//!
//! Each row compares its proposed name against the two normalized forms it
//! was derived from. Rows where both agree (or a human signed off) are strong
//! matches, rows where exactly one agrees are partial, and the rest need
//! review. Proposed-name collisions are reported separately.

use itertools::Itertools;
use serde::Serialize;

use crate::model::AnnotatedRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Strong,
    Partial,
    NeedsReview,
}

impl MatchTier {
    pub fn of(row: &AnnotatedRow) -> Self {
        let original_matches = row.original_name_normalized == row.proposed_name;
        let label_matches = row.label_normalized == row.proposed_name;
        if row.manually_reviewed || (original_matches && label_matches) {
            MatchTier::Strong
        } else if original_matches || label_matches {
            MatchTier::Partial
        } else {
            MatchTier::NeedsReview
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ClassificationReport<'a> {
    pub strong_matches: Vec<&'a AnnotatedRow>,
    pub partial_matches: Vec<&'a AnnotatedRow>,
    pub needs_review: Vec<&'a AnnotatedRow>,
    pub duplicates: Vec<&'a AnnotatedRow>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub strong_matches: usize,
    pub partial_matches: usize,
    pub needs_review: usize,
    pub duplicates: usize,
}

impl ClassificationReport<'_> {
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            total: self.strong_matches.len() + self.partial_matches.len() + self.needs_review.len(),
            strong_matches: self.strong_matches.len(),
            partial_matches: self.partial_matches.len(),
            needs_review: self.needs_review.len(),
            duplicates: self.duplicates.len(),
        }
    }

    /// True when nothing needs a human: no unmatched rows and no collisions.
    pub fn is_clean(&self) -> bool {
        self.needs_review.is_empty() && self.duplicates.is_empty()
    }
}

/// Buckets rows by [`MatchTier`] and collects every row whose proposed name is shared.
///
/// Row order within each bucket follows the input order.
pub fn classify(rows: &[AnnotatedRow]) -> ClassificationReport<'_> {
    let mut report = ClassificationReport::default();
    for row in rows {
        let bucket = match MatchTier::of(row) {
            MatchTier::Strong => &mut report.strong_matches,
            MatchTier::Partial => &mut report.partial_matches,
            MatchTier::NeedsReview => &mut report.needs_review,
        };
        bucket.push(row);
    }

    let name_counts = rows
        .iter()
        .map(|row| row.proposed_name.as_str())
        .counts();
    report.duplicates = rows
        .iter()
        .filter(|row| name_counts[row.proposed_name.as_str()] > 1)
        .collect();
    report
}
