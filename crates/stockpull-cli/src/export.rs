//! Command handlers. Each runs the pipeline once; `sheet` additionally pushes
//! the result to a fresh copy of the template spreadsheet and `xlsx` fills the
//! local workbook template.

use std::path::Path;

use anyhow::Context;
use stockpull_core::{AppConfig, PipelineRequest};
use stockpull_pipeline::StockPipeline;
use stockpull_sheets::{export_report, export_workbook, ExportSettings, SheetsClient, XlsxSettings};

pub(crate) async fn run_stock(config: &AppConfig, request: PipelineRequest) -> anyhow::Result<()> {
    let pipeline = StockPipeline::from_app_config(config)?;
    let report = pipeline.run(request).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) async fn run_sheet(config: &AppConfig, request: PipelineRequest) -> anyhow::Result<()> {
    // Validate Google settings before touching the ERP.
    let settings = ExportSettings::from_app_config(config)?;
    let token = config
        .google_access_token
        .as_deref()
        .context("GOOGLE_ACCESS_TOKEN is required for sheet export")?;
    let client = SheetsClient::new(token, config.request_timeout_secs)?;

    let pipeline = StockPipeline::from_app_config(config)?;
    let report = pipeline.run(request).await?;

    if report.is_empty() {
        tracing::warn!(message = %report.message, "nothing to export");
        println!("{}", report.message);
        return Ok(());
    }

    let export = export_report(&client, &settings, &report)
        .await
        .context("sheet export failed")?;
    tracing::info!(rows = export.rows_written, "sheet ready");
    println!("{}", export.url);
    Ok(())
}

pub(crate) async fn run_xlsx(
    config: &AppConfig,
    request: PipelineRequest,
    output: &Path,
) -> anyhow::Result<()> {
    let settings = XlsxSettings::from_app_config(config)?;

    let pipeline = StockPipeline::from_app_config(config)?;
    let report = pipeline.run(request).await?;
    if report.is_empty() {
        tracing::warn!(message = %report.message, "writing an empty order");
    }

    let bytes = export_workbook(&settings, &report).context("workbook export failed")?;
    std::fs::write(output, bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(rows = report.total_products, "workbook ready");
    println!("{}", output.display());
    Ok(())
}
