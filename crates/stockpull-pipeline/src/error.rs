use std::fmt;

use stockpull_core::ConfigError;
use stockpull_odoo::OdooError;
use thiserror::Error;

/// Pipeline states, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Authenticating,
    FetchingQuants,
    Aggregating,
    FilteringCategory,
    FetchingProductInfo,
    ResolvingPrices,
    Assembling,
    Done,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Authenticating => "authenticating",
            Stage::FetchingQuants => "fetching_quants",
            Stage::Aggregating => "aggregating",
            Stage::FilteringCategory => "filtering_category",
            Stage::FetchingProductInfo => "fetching_product_info",
            Stage::ResolvingPrices => "resolving_prices",
            Stage::Assembling => "assembling",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Required settings are missing; raised before any remote call.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The ERP accepted the request but returned no user id.
    #[error("authentication failed: the ERP returned no user id for the configured credentials")]
    Authentication,

    /// A call on the mandatory path failed.
    #[error("{stage} failed: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: OdooError,
    },
}

impl PipelineError {
    /// The state the run was in when it failed. Configuration errors happen
    /// before the first state is entered.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Configuration(_) => None,
            PipelineError::Authentication => Some(Stage::Authenticating),
            PipelineError::Transport { stage, .. } => Some(*stage),
        }
    }

    pub(crate) fn transport(stage: Stage) -> impl FnOnce(OdooError) -> Self {
        move |source| PipelineError::Transport { stage, source }
    }
}
