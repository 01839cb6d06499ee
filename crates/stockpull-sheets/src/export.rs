use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use serde_json::Value;
use stockpull_core::{AppConfig, ConfigError, OutputRecord, StockReport};
use stockpull_pipeline::ExportPriceAdjustment;

use crate::client::SheetsClient;
use crate::error::SheetsError;

const COPY_NAME_PREFIX: &str = "Pedido de Stock";

/// Where and how a report is written.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub template_id: String,
    pub sheet_name: String,
    pub anchor: String,
    pub price_adjustment: ExportPriceAdjustment,
}

impl ExportSettings {
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when no template spreadsheet is
    /// configured.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let template_id = config
            .sheet_template_id
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("GOOGLE_SHEET_TEMPLATE_ID".to_owned()))?;
        Ok(Self {
            template_id,
            sheet_name: config.sheet_name.clone(),
            anchor: config.sheet_anchor.clone(),
            price_adjustment: ExportPriceAdjustment::new(config.export_price_factor),
        })
    }

    /// A1 range of the first written cell, e.g. `PEDIDO!A2`.
    #[must_use]
    pub fn range(&self) -> String {
        format!("{}!{}", self.sheet_name, self.anchor)
    }
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetExport {
    pub spreadsheet_id: String,
    pub url: String,
    pub rows_written: usize,
}

/// Lays out one row per record:
/// `[product_id, "1", display_name, qty_available, price, "", ""]`.
///
/// The trailing empty cells are the order quantity and subtotal columns the
/// template leaves for the customer to fill in.
#[must_use]
pub fn sheet_rows(records: &[OutputRecord]) -> Vec<Vec<Value>> {
    records
        .iter()
        .map(|r| {
            vec![
                Value::from(r.product_id),
                Value::from("1"),
                Value::from(r.display_name.as_str()),
                Value::from(r.qty_available),
                r.price.to_f64().map_or(Value::Null, Value::from),
                Value::from(""),
                Value::from(""),
            ]
        })
        .collect()
}

#[must_use]
pub fn sheet_url(spreadsheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{spreadsheet_id}/edit")
}

fn copy_name(now: DateTime<Utc>) -> String {
    format!("{COPY_NAME_PREFIX} - {}", now.format("%Y-%m-%d %H:%M"))
}

/// Copies the template, shares it and writes `report`'s products with the
/// configured price adjustment applied.
///
/// # Errors
///
/// Returns the first [`SheetsError`] raised by the copy, share or write call.
/// A failure after the copy leaves the copied file in Drive.
pub async fn export_report(
    client: &SheetsClient,
    settings: &ExportSettings,
    report: &StockReport,
) -> Result<SheetExport, SheetsError> {
    let name = copy_name(Utc::now());
    let spreadsheet_id = client.copy_template(&settings.template_id, &name).await?;
    client.share_with_anyone(&spreadsheet_id).await?;

    let records = settings.price_adjustment.apply_all(&report.products);
    let rows = sheet_rows(&records);
    client
        .write_rows(&spreadsheet_id, &settings.range(), &rows)
        .await?;

    tracing::info!(
        spreadsheet_id = %spreadsheet_id,
        rows = rows.len(),
        location_id = report.location_id,
        "stock exported to spreadsheet"
    );

    Ok(SheetExport {
        url: sheet_url(&spreadsheet_id),
        spreadsheet_id,
        rows_written: rows.len(),
    })
}
