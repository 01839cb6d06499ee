use stockpull_core::{
    AppConfig, CategoryRoots, LocationId, PipelineRequest, PricelistId, ProductId, StockReport,
};
use stockpull_odoo::{ErpGateway, OdooClient, OdooCredentials, OdooError, Uid};

use crate::aggregate::aggregate;
use crate::assemble::assemble;
use crate::category::filter_by_category;
use crate::erp;
use crate::error::{PipelineError, Stage};
use crate::pricing::{PriceResolver, RuleIndex};

/// Settings that stay fixed across invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub category_roots: CategoryRoots,
    pub price_concurrency: usize,
}

impl PipelineSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            category_roots: config.category_roots,
            price_concurrency: config.price_concurrency,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            category_roots: CategoryRoots::default(),
            price_concurrency: 8,
        }
    }
}

/// Runs the stock export pipeline against an ERP gateway.
///
/// Each call to [`StockPipeline::run`] is independent: nothing is cached
/// between invocations and the same request always issues the same reads.
pub struct StockPipeline<G> {
    gateway: G,
    settings: PipelineSettings,
}

impl StockPipeline<OdooClient> {
    /// Builds a pipeline backed by the Odoo instance named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`OdooError`] if the HTTP client cannot be built or the
    /// configured URL is invalid.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, OdooError> {
        let credentials = OdooCredentials {
            db: config.odoo_db.clone(),
            username: config.odoo_username.clone(),
            password: config.odoo_password.clone(),
        };
        let client = OdooClient::new(&config.odoo_url, credentials, config.request_timeout_secs)?;
        Ok(Self::new(client, PipelineSettings::from_app_config(config)))
    }
}

impl<G: ErpGateway> StockPipeline<G> {
    pub fn new(gateway: G, settings: PipelineSettings) -> Self {
        Self { gateway, settings }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Produces the stock report for `request`.
    ///
    /// Empty intermediate results end the run early with an empty report and
    /// an explanatory message; they are not errors.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Configuration`] if the request selects a category
    ///   whose root is not configured. No ERP call is made in that case.
    /// - [`PipelineError::Authentication`] if the ERP rejects the credentials.
    /// - [`PipelineError::Transport`] if a mandatory read fails or returns
    ///   malformed rows.
    pub async fn run(&self, request: PipelineRequest) -> Result<StockReport, PipelineError> {
        let root = self.settings.category_roots.root_for(request.category)?;
        let location = request.location_id;

        tracing::info!(
            location_id = location,
            pricelist_id = request.pricelist_id,
            category = %request.category,
            "starting stock pipeline"
        );

        enter(Stage::Authenticating);
        let uid = self
            .gateway
            .authenticate()
            .await
            .map_err(PipelineError::transport(Stage::Authenticating))?
            .ok_or(PipelineError::Authentication)?;

        enter(Stage::FetchingQuants);
        let quant_ids = erp::search_quant_ids(&self.gateway, uid, location)
            .await
            .map_err(PipelineError::transport(Stage::FetchingQuants))?;
        if quant_ids.is_empty() {
            return Ok(done_empty(request, format!("No stock found in location {location}")));
        }
        let records = erp::read_stock_records(&self.gateway, uid, &quant_ids)
            .await
            .map_err(PipelineError::transport(Stage::FetchingQuants))?;
        tracing::debug!(quants = records.len(), "quants read");

        enter(Stage::Aggregating);
        let quantities = aggregate(&records);
        if quantities.is_empty() {
            return Ok(done_empty(
                request,
                format!("No available stock found in location {location}"),
            ));
        }

        enter(Stage::FilteringCategory);
        let candidates: Vec<ProductId> = quantities.keys().copied().collect();
        let product_ids = filter_by_category(&self.gateway, uid, candidates, root)
            .await
            .map_err(PipelineError::transport(Stage::FilteringCategory))?;
        if product_ids.is_empty() {
            return Ok(done_empty(
                request,
                format!(
                    "No products in category {} with stock in location {location}",
                    request.category
                ),
            ));
        }

        enter(Stage::FetchingProductInfo);
        let products = erp::read_products(&self.gateway, uid, &product_ids)
            .await
            .map_err(PipelineError::transport(Stage::FetchingProductInfo))?;

        enter(Stage::ResolvingPrices);
        let prices = self
            .resolver(uid, request.pricelist_id)
            .await
            .resolve_all(&products)
            .await;

        enter(Stage::Assembling);
        let output = assemble(&products, &quantities, &prices);
        if output.is_empty() {
            return Ok(done_empty(request, no_available_stock(location)));
        }

        let message = format!(
            "Found {} products with stock in location {location}",
            output.len()
        );
        enter(Stage::Done);
        tracing::info!(
            location_id = location,
            total_products = output.len(),
            "stock pipeline finished"
        );
        Ok(StockReport::new(request, output, message))
    }

    async fn resolver(&self, uid: Uid, pricelist_id: PricelistId) -> PriceResolver<'_, G> {
        let rules = RuleIndex::load(&self.gateway, uid, pricelist_id).await;
        PriceResolver::new(
            &self.gateway,
            uid,
            pricelist_id,
            rules,
            self.settings.price_concurrency,
        )
    }
}

fn enter(stage: Stage) {
    tracing::debug!(stage = %stage, "pipeline stage");
}

fn done_empty(request: PipelineRequest, message: String) -> StockReport {
    enter(Stage::Done);
    tracing::info!(location_id = request.location_id, %message, "stock pipeline finished empty");
    StockReport::empty(request, message)
}

fn no_available_stock(location: LocationId) -> String {
    format!("No products with available stock found in location {location}")
}
