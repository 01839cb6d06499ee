//! Spreadsheet export of stock reports.
//!
//! An export copies a template spreadsheet in Google Drive, opens it to anyone
//! with the link, and writes one row per product at a fixed anchor. The
//! [`xlsx`] module fills a local workbook template instead and hands back the
//! file bytes.

pub mod client;
pub mod error;
pub mod export;
pub mod xlsx;

pub use client::SheetsClient;
pub use error::SheetsError;
pub use export::{export_report, sheet_rows, sheet_url, ExportSettings, SheetExport};
pub use xlsx::{
    export_workbook, render_workbook, XlsxSettings, XLSX_CONTENT_TYPE, XLSX_FILE_NAME,
};
