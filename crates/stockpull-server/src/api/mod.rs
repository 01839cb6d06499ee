mod stock;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use stockpull_core::AppConfig;
use stockpull_odoo::OdooClient;
use stockpull_pipeline::{PipelineError, StockPipeline};
use stockpull_sheets::{ExportSettings, SheetsClient, XlsxSettings};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id;

/// Stage reported when the spreadsheet step fails after a successful run.
pub(crate) const EXPORT_STAGE: &str = "exporting";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<StockPipeline<OdooClient>>,
    pub exporter: Option<Arc<SheetExporter>>,
    pub workbook: Option<Arc<XlsxSettings>>,
}

/// Sheets client plus the template it copies. Absent when Google settings
/// are not configured; `/api/create-sheet` then fails with a clear error.
pub struct SheetExporter {
    pub client: SheetsClient,
    pub settings: ExportSettings,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let pipeline = StockPipeline::from_app_config(config)?;
        let exporter = match (&config.sheet_template_id, &config.google_access_token) {
            (Some(_), Some(token)) => Some(Arc::new(SheetExporter {
                client: SheetsClient::new(token, config.request_timeout_secs)?,
                settings: ExportSettings::from_app_config(config)?,
            })),
            _ => {
                tracing::warn!(
                    "GOOGLE_SHEET_TEMPLATE_ID or GOOGLE_ACCESS_TOKEN not set; sheet export disabled"
                );
                None
            }
        };

        let workbook = match XlsxSettings::from_app_config(config) {
            Ok(settings) => Some(Arc::new(settings)),
            Err(_) => {
                tracing::warn!("STOCKPULL_XLSX_TEMPLATE not set; workbook export disabled");
                None
            }
        };

        Ok(Self {
            pipeline: Arc::new(pipeline),
            exporter,
            workbook,
        })
    }
}

/// JSON error body: `{success: false, error, stage?, request_id}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    pub request_id: String,
}

impl ApiError {
    pub fn new(status: StatusCode, request_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status,
            success: false,
            error: error.into(),
            stage: None,
            request_id: request_id.into(),
        }
    }

    #[must_use]
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    /// Maps a failed run: rejected credentials are `401`, everything else is
    /// `500` with the failing stage attached.
    pub fn from_pipeline(request_id: impl Into<String>, error: &PipelineError) -> Self {
        match error {
            PipelineError::Authentication => {
                tracing::warn!("odoo authentication failed");
                Self::new(StatusCode::UNAUTHORIZED, request_id, "Odoo authentication failed")
                    .with_stage(stockpull_pipeline::Stage::Authenticating.as_str())
            }
            PipelineError::Configuration(e) => {
                tracing::error!(error = %e, "pipeline misconfigured");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, request_id, e.to_string())
                    .with_stage("configuration")
            }
            PipelineError::Transport { stage, source } => {
                tracing::error!(stage = %stage, error = %source, "pipeline failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, request_id, error.to_string())
                    .with_stage(stage.as_str())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

/// CORS for the configured origins only. Unparseable origins are skipped
/// with a warning.
fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

pub fn build_app(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/download-stock", post(stock::download_stock))
        .route("/api/create-sheet", post(stock::create_sheet))
        .route("/api/generate-excel", post(stock::generate_excel))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(request_id))
                .layer(build_cors(allowed_origins)),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(HealthData { status: "ok" })
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
