//! Results-table extraction from the page returned after submission.

use causelist_common::protocol::CaseRecord;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

pub const RESULTS_TABLE_CLASS: &str = "cause-list-table";

/// Columns a row needs before it is read as a case.
const MIN_CELLS: usize = 5;

/// Read every case row of the first `table.<table_class>` in `html`.
///
/// A missing table yields no records. The first row is the header; rows with
/// fewer than five cells are skipped without affecting their neighbours.
pub fn extract_records(html: &str, table_class: &str) -> Vec<CaseRecord> {
    let (Some(table_selector), Some(row_selector), Some(cell_selector)) = (
        selector(&format!("table.{}", table_class)),
        selector("tr"),
        selector("td"),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let Some(table) = document.select(&table_selector).next() else {
        debug!("No table.{} in page", table_class);
        return Vec::new();
    };

    table
        .select(&row_selector)
        .skip(1)
        .filter_map(|row| {
            let cells: Vec<String> = row.select(&cell_selector).map(cell_text).collect();
            if cells.len() < MIN_CELLS {
                debug!("Skipping row with {} cell(s)", cells.len());
                return None;
            }
            let mut cells = cells.into_iter();
            Some(CaseRecord {
                sr_no: cells.next().unwrap_or_default(),
                case_no: cells.next().unwrap_or_default(),
                petitioner: cells.next().unwrap_or_default(),
                respondent: cells.next().unwrap_or_default(),
                purpose: cells.next().unwrap_or_default(),
            })
        })
        .collect()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("Invalid selector {:?}: {}", css, e);
            None
        }
    }
}
