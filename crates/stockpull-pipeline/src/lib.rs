//! Stock aggregation and price resolution pipeline.
//!
//! Given a stock location and a price list, [`StockPipeline::run`] reads the
//! location's quants from the ERP, nets out reservations per product,
//! optionally narrows to a category subtree, resolves a unit price per product
//! through an ordered fallback chain, and returns a sorted, rounded
//! [`StockReport`](stockpull_core::StockReport).

pub mod aggregate;
pub mod assemble;
pub mod category;
pub mod erp;
pub mod error;
pub mod orchestrator;
pub mod pricing;

pub use aggregate::{aggregate, ProductQuantity};
pub use assemble::{assemble, round2, strip_bracket_tag, ExportPriceAdjustment};
pub use category::intersect_preserving_order;
pub use error::{PipelineError, Stage};
pub use orchestrator::{PipelineSettings, StockPipeline};
pub use pricing::{PriceQuote, PriceResolver, PriceStrategy, Resolution, ResolvedPrices, RuleIndex};
