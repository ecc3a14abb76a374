use std::fmt::Write as _;

use serde::Serialize;

use crate::{
    config::ColumnNames,
    model::AnnotatedRow,
    validate::{ClassificationReport, ReportSummary},
};

pub const STRONG_HEADING: &str = "SUCCESSFULLY RENAMED FIELDS (3 FIELDS MATCH)";
pub const PARTIAL_HEADING: &str = "ACCEPTABLY RENAMED FIELDS (2 FIELDS MATCH)";
pub const REVIEW_HEADING: &str = "RENAMED FIELDS TO BE CHECKED (0 FIELDS MATCH)";
pub const DUPLICATE_HEADING: &str = "DUPLICATE FIELDS";

struct Section<'r, 'a> {
    heading: &'static str,
    rows: &'r [&'a AnnotatedRow],
    show_reviewed: bool,
}

/// Renders every non-empty group as a heading followed by an aligned table.
pub fn render_text(report: &ClassificationReport<'_>, columns: &ColumnNames) -> String {
    let sections = [
        Section {
            heading: STRONG_HEADING,
            rows: &report.strong_matches,
            show_reviewed: true,
        },
        Section {
            heading: PARTIAL_HEADING,
            rows: &report.partial_matches,
            show_reviewed: true,
        },
        Section {
            heading: REVIEW_HEADING,
            rows: &report.needs_review,
            show_reviewed: true,
        },
        Section {
            heading: DUPLICATE_HEADING,
            rows: &report.duplicates,
            show_reviewed: false,
        },
    ];

    let mut output = String::new();
    for section in sections.iter().filter(|section| !section.rows.is_empty()) {
        let _ = writeln!(output, "\n{}", section.heading);
        output.push_str(&render_section(section, columns));
    }
    let summary = report.summary();
    let _ = writeln!(
        output,
        "\n{} field(s): {} strong, {} partial, {} to check, {} duplicate(s)",
        summary.total,
        summary.strong_matches,
        summary.partial_matches,
        summary.needs_review,
        summary.duplicates
    );
    output
}

fn render_section(section: &Section<'_, '_>, columns: &ColumnNames) -> String {
    let mut headers = vec![
        columns.original_name.as_str(),
        columns.label.as_str(),
        columns.proposed_name.as_str(),
    ];
    if section.show_reviewed {
        headers.push(columns.manually_reviewed.as_str());
    }

    let cells: Vec<Vec<String>> = section
        .rows
        .iter()
        .map(|row| {
            let mut line = vec![
                single_line(row.original_name()),
                single_line(row.label()),
                single_line(&row.proposed_name),
            ];
            if section.show_reviewed {
                line.push(row.manually_reviewed.to_string());
            }
            line
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    push_line(&mut output, headers.iter().copied(), &widths);
    push_line(
        &mut output,
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().iter().map(String::as_str),
        &widths,
    );
    for line in &cells {
        push_line(&mut output, line.iter().map(String::as_str), &widths);
    }
    output
}

fn push_line<'s>(output: &mut String, cells: impl Iterator<Item = &'s str>, widths: &[usize]) {
    let mut line = String::new();
    for (idx, (cell, width)) in cells.zip(widths).enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        let _ = write!(line, "{cell:<width$}");
    }
    output.push_str(line.trim_end());
    output.push('\n');
}

fn single_line(value: &str) -> String {
    value.replace(['\n', '\r', '\t'], " ")
}

#[derive(Serialize)]
struct JsonReport<'r, 'a> {
    summary: ReportSummary,
    #[serde(flatten)]
    groups: &'r ClassificationReport<'a>,
}

pub fn render_json(report: &ClassificationReport<'_>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        summary: report.summary(),
        groups: report,
    })
}
