//! Markdown report rendering.
//!
//! Pure formatting over the archive; no aggregation happens here.

use chrono::NaiveDate;

use crate::archive::SummaryArchive;
use crate::summary::WeekSummary;

/// Report column headers, in output order.
pub const TABLE_HEADER: [&str; 9] = [
    "Week",
    "Open Issues",
    "IncomingP0",
    "OpenP1",
    "IncomingP1",
    "ResolvedP1",
    "OpenP2",
    "IncomingP2",
    "ResolvedP2",
];

/// Render the full report: a title line followed by one table row per week,
/// oldest first.
pub fn render_report(title: &str, archive: &SummaryArchive) -> String {
    format!("# {title}\n\n{}", render_table(archive))
}

/// `YYYY-MM-DD - YYYY-MM-DD` week cell.
fn format_week(start: NaiveDate, end: NaiveDate) -> String {
    format!("{start} - {end}")
}

fn row_cells(summary: &WeekSummary) -> [String; 9] {
    [
        format_week(summary.start, summary.end),
        summary.open_issues.to_string(),
        summary.incoming_p0.to_string(),
        summary.open_p1.to_string(),
        summary.incoming_p1.to_string(),
        summary.resolved_p1.to_string(),
        summary.open_p2.to_string(),
        summary.incoming_p2.to_string(),
        summary.resolved_p2.to_string(),
    ]
}

fn render_table(archive: &SummaryArchive) -> String {
    let rows: Vec<[String; 9]> = archive.summaries().iter().map(row_cells).collect();

    // Pad every column to its widest cell so the raw markdown stays readable.
    let mut widths: [usize; 9] = TABLE_HEADER.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.len());
        }
    }

    let mut output = String::new();
    render_row(&mut output, &TABLE_HEADER.map(String::from), &widths);
    let separators = widths.map(|w| "-".repeat(w));
    render_row(&mut output, &separators, &widths);
    for row in &rows {
        render_row(&mut output, row, &widths);
    }
    output
}

fn render_row(output: &mut String, cells: &[String; 9], widths: &[usize; 9]) {
    for (cell, width) in cells.iter().zip(widths.iter()) {
        output.push_str("| ");
        output.push_str(cell);
        output.push_str(&" ".repeat(width - cell.len()));
        output.push(' ');
    }
    output.push_str("|\n");
}
