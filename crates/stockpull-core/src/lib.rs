pub mod app_config;
pub mod category;
pub mod config;
pub mod stock;

pub use app_config::AppConfig;
pub use category::{CategoryRoots, CategorySelector};
pub use config::{load_app_config, load_app_config_from_env};
pub use stock::{
    CategoryId, ComputeMode, LocationId, OutputRecord, PipelineRequest, PriceRule, PricelistId,
    ProductId, ProductInfo, StockRecord, StockReport, DEFAULT_LOCATION_ID, DEFAULT_PRICELIST_ID,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("no root category configured for selector '{0}'")]
    MissingCategoryRoot(CategorySelector),
}
