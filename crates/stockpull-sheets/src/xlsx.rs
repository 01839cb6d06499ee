//! Order workbook built from a local `.xlsx` template.
//!
//! The template's order sheet keeps its header row; everything from row 2
//! down is cleared and replaced with one row per product:
//! `A` customer id (always 1), `B` product id, `C` order quantity (left
//! blank), `D` adjusted unit price.

use std::io::Cursor;
use std::path::PathBuf;

use rust_decimal::prelude::ToPrimitive;
use stockpull_core::{AppConfig, ConfigError, OutputRecord, StockReport};
use stockpull_pipeline::ExportPriceAdjustment;
use umya_spreadsheet::Worksheet;

use crate::error::SheetsError;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const XLSX_FILE_NAME: &str = "pedido_stock.xlsx";

const FIRST_DATA_ROW: u32 = 2;
const CUSTOMER_ID: i32 = 1;
const COL_CUSTOMER: u32 = 1;
const COL_PRODUCT: u32 = 2;
const COL_PRICE: u32 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct XlsxSettings {
    pub template_path: PathBuf,
    pub sheet_name: String,
    pub price_adjustment: ExportPriceAdjustment,
}

impl XlsxSettings {
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when no workbook template is
    /// configured.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let template_path = config
            .xlsx_template_path
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("STOCKPULL_XLSX_TEMPLATE".to_owned()))?;
        Ok(Self {
            template_path,
            sheet_name: config.sheet_name.clone(),
            price_adjustment: ExportPriceAdjustment::new(config.export_price_factor),
        })
    }
}

/// Reads the template from disk and fills it with `report`'s products, prices
/// adjusted. Blocking; async callers should run it off the runtime threads.
///
/// # Errors
///
/// Returns [`SheetsError::Template`] if the file cannot be read, otherwise
/// whatever [`render_workbook`] returns.
pub fn export_workbook(
    settings: &XlsxSettings,
    report: &StockReport,
) -> Result<Vec<u8>, SheetsError> {
    let template = std::fs::read(&settings.template_path).map_err(|source| {
        SheetsError::Template {
            path: settings.template_path.display().to_string(),
            source,
        }
    })?;
    let records = settings.price_adjustment.apply_all(&report.products);
    let bytes = render_workbook(&template, &settings.sheet_name, &records)?;

    tracing::info!(
        rows = records.len(),
        bytes = bytes.len(),
        location_id = report.location_id,
        "stock written to workbook"
    );
    Ok(bytes)
}

/// Fills `sheet_name` of the `template` workbook with `records` and returns
/// the serialized workbook. Prices are written as given.
///
/// # Errors
///
/// Returns [`SheetsError::Workbook`] when the template is not a readable
/// workbook or cannot be written back, and [`SheetsError::MissingSheet`] when
/// it has no sheet called `sheet_name`.
pub fn render_workbook(
    template: &[u8],
    sheet_name: &str,
    records: &[OutputRecord],
) -> Result<Vec<u8>, SheetsError> {
    let mut book = umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(template), true)
        .map_err(|e| SheetsError::Workbook(e.to_string()))?;
    let sheet = book
        .get_sheet_by_name_mut(sheet_name)
        .ok_or_else(|| SheetsError::MissingSheet(sheet_name.to_owned()))?;

    clear_rows_from(sheet, FIRST_DATA_ROW);
    for (row, record) in (FIRST_DATA_ROW..).zip(records) {
        sheet
            .get_cell_mut((COL_CUSTOMER, row))
            .set_value_number(CUSTOMER_ID);
        #[allow(clippy::cast_precision_loss)]
        let product_id = record.product_id as f64;
        sheet
            .get_cell_mut((COL_PRODUCT, row))
            .set_value_number(product_id);
        sheet
            .get_cell_mut((COL_PRICE, row))
            .set_value_number(record.price.to_f64().unwrap_or_default());
    }

    let mut out = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut out)
        .map_err(|e| SheetsError::Workbook(e.to_string()))?;
    Ok(out.into_inner())
}

fn clear_rows_from(sheet: &mut Worksheet, first_row: u32) {
    let (max_col, max_row) = sheet.get_highest_column_and_row();
    for row in first_row..=max_row {
        for col in 1..=max_col {
            if sheet.get_cell((col, row)).is_some() {
                sheet.get_cell_mut((col, row)).set_blank();
            }
        }
    }
}
