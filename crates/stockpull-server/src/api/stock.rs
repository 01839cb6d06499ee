use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use stockpull_core::{
    CategorySelector, LocationId, OutputRecord, PipelineRequest, PricelistId, StockReport,
};
use stockpull_sheets::{XLSX_CONTENT_TYPE, XLSX_FILE_NAME};

use super::{ApiError, AppState, EXPORT_STAGE};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub(super) struct DownloadStockResponse {
    success: bool,
    products: Vec<OutputRecord>,
    total_products: usize,
    location_id: LocationId,
    pricelist_id: PricelistId,
    category: CategorySelector,
    message: String,
    timestamp: DateTime<Utc>,
}

impl From<StockReport> for DownloadStockResponse {
    fn from(report: StockReport) -> Self {
        Self {
            success: true,
            total_products: report.total_products,
            products: report.products,
            location_id: report.location_id,
            pricelist_id: report.pricelist_id,
            category: report.category,
            message: report.message,
            timestamp: report.generated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct CreateSheetResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_products: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// An empty or whitespace-only body means "all defaults".
fn parse_request(body: &[u8]) -> Result<PipelineRequest, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(PipelineRequest::default());
    }
    serde_json::from_slice(body)
}

async fn run_pipeline(
    state: &AppState,
    req_id: &RequestId,
    body: &[u8],
) -> Result<StockReport, ApiError> {
    let request = parse_request(body).map_err(|e| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            req_id.0.clone(),
            format!("invalid request body: {e}"),
        )
    })?;

    tracing::info!(
        request_id = %req_id.0,
        location_id = request.location_id,
        pricelist_id = request.pricelist_id,
        category = %request.category,
        "stock export requested"
    );

    state
        .pipeline
        .run(request)
        .await
        .map_err(|e| ApiError::from_pipeline(req_id.0.clone(), &e))
}

pub(super) async fn download_stock(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<DownloadStockResponse>, ApiError> {
    let report = run_pipeline(&state, &req_id, &body).await?;
    Ok(Json(report.into()))
}

pub(super) async fn create_sheet(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<CreateSheetResponse>, ApiError> {
    let report = run_pipeline(&state, &req_id, &body).await?;

    if report.is_empty() {
        return Ok(Json(CreateSheetResponse {
            success: true,
            url: None,
            total_products: None,
            message: Some(report.message),
        }));
    }

    let Some(exporter) = state.exporter.as_deref() else {
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            req_id.0,
            "sheet export is not configured: set GOOGLE_SHEET_TEMPLATE_ID and GOOGLE_ACCESS_TOKEN",
        )
        .with_stage(EXPORT_STAGE));
    };

    let export = stockpull_sheets::export_report(&exporter.client, &exporter.settings, &report)
        .await
        .map_err(|e| {
            tracing::error!(request_id = %req_id.0, error = %e, "sheet export failed");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, req_id.0.clone(), e.to_string())
                .with_stage(EXPORT_STAGE)
        })?;

    Ok(Json(CreateSheetResponse {
        success: true,
        url: Some(export.url),
        total_products: Some(report.total_products),
        message: None,
    }))
}

/// Runs the pipeline and answers with the filled order workbook as an
/// attachment. An empty report still yields the cleared template.
pub(super) async fn generate_excel(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let report = run_pipeline(&state, &req_id, &body).await?;

    let Some(settings) = state.workbook.clone() else {
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            req_id.0,
            "workbook export is not configured: set STOCKPULL_XLSX_TEMPLATE",
        )
        .with_stage(EXPORT_STAGE));
    };

    let rows = report.total_products;
    let bytes =
        tokio::task::spawn_blocking(move || stockpull_sheets::export_workbook(&settings, &report))
            .await
            .map_err(|e| e.to_string())
            .and_then(|result| result.map_err(|e| e.to_string()))
            .map_err(|e| {
                tracing::error!(request_id = %req_id.0, error = %e, "workbook export failed");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, req_id.0.clone(), e)
                    .with_stage(EXPORT_STAGE)
            })?;

    tracing::info!(request_id = %req_id.0, rows, "workbook generated");
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={XLSX_FILE_NAME}"),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_body_uses_defaults() {
        assert_eq!(parse_request(b"").unwrap(), PipelineRequest::default());
        assert_eq!(parse_request(b"  \n").unwrap(), PipelineRequest::default());
    }

    #[test]
    fn body_fields_override_defaults() {
        let request = parse_request(br#"{"pricelist_id": 3, "category": "a"}"#).unwrap();
        assert_eq!(request.location_id, 8);
        assert_eq!(request.pricelist_id, 3);
        assert_eq!(request.category, CategorySelector::A);
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(parse_request(br#"{"category": "z"}"#).is_err());
    }
}
