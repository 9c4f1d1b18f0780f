//! Report renderers for churn predictions.
//!
//! - [`terminal`]: colored summary box and tier tables; respects `--verbose` / `--quiet`.
//! - [`export`]: the scored CSV with risk columns appended, and pretty JSON.
//! - [`pdf`]: multi-page PDF with cover, tier summary, driver chart and a full result table.
//! - [`chart`]: feature-importance bar chart rendered with plotters.

pub mod chart;
pub mod export;
pub mod pdf;
pub mod terminal;

/// Default file name for `--report pdf` without `--output`.
pub const DEFAULT_PDF_FILE: &str = "churn-report.pdf";

/// Display identifier for a batch row: its `customerID`, else its 1-based row number.
pub fn customer_label(record: &crate::models::RawRecord, index: usize) -> String {
    record
        .customer_id()
        .unwrap_or_else(|| format!("row {}", index + 1))
}
