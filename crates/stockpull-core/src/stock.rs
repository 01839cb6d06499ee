//! Stock and pricing records exchanged between the ERP client, the pipeline
//! and the export surfaces.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::category::CategorySelector;

pub type ProductId = i64;
pub type CategoryId = i64;
pub type LocationId = i64;
pub type PricelistId = i64;

pub const DEFAULT_LOCATION_ID: LocationId = 8;
pub const DEFAULT_PRICELIST_ID: PricelistId = 5;

/// One stock quant read from the ERP.
#[derive(Debug, Clone, PartialEq)]
pub struct StockRecord {
    pub product_id: ProductId,
    pub quantity_on_hand: Decimal,
    pub quantity_reserved: Decimal,
}

/// Product metadata needed for pricing and display.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInfo {
    pub id: ProductId,
    pub name: String,
    pub display_name: String,
    pub default_code: Option<String>,
    pub list_price: Decimal,
    pub category_id: Option<CategoryId>,
}

/// How a price-list rule derives a price from the product's list price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeMode {
    Fixed,
    Percentage,
    Base,
}

impl ComputeMode {
    /// Maps the ERP's `compute_price` value. Anything other than `fixed` or
    /// `percentage` (including `formula`) leaves the list price untouched.
    #[must_use]
    pub fn from_erp(value: &str) -> Self {
        match value {
            "fixed" => ComputeMode::Fixed,
            "percentage" => ComputeMode::Percentage,
            _ => ComputeMode::Base,
        }
    }
}

/// A category-scoped price-list rule.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRule {
    pub category_id: CategoryId,
    pub compute_mode: ComputeMode,
    pub fixed_price: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
}

/// One exported product line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub product_id: ProductId,
    pub name: String,
    pub display_name: String,
    pub qty_available: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl OutputRecord {
    /// Key used for the canonical ordering: the display name, or the plain
    /// name when the display name is empty.
    #[must_use]
    pub fn sort_key(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

/// Parameters of a single pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRequest {
    #[serde(default = "default_location_id")]
    pub location_id: LocationId,
    #[serde(default = "default_pricelist_id")]
    pub pricelist_id: PricelistId,
    #[serde(default)]
    pub category: CategorySelector,
}

fn default_location_id() -> LocationId {
    DEFAULT_LOCATION_ID
}

fn default_pricelist_id() -> PricelistId {
    DEFAULT_PRICELIST_ID
}

impl Default for PipelineRequest {
    fn default() -> Self {
        Self {
            location_id: DEFAULT_LOCATION_ID,
            pricelist_id: DEFAULT_PRICELIST_ID,
            category: CategorySelector::None,
        }
    }
}

/// Successful pipeline outcome, including the empty-result case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockReport {
    pub products: Vec<OutputRecord>,
    pub total_products: usize,
    pub location_id: LocationId,
    pub pricelist_id: PricelistId,
    pub category: CategorySelector,
    pub message: String,
    pub generated_at: DateTime<Utc>,
}

impl StockReport {
    #[must_use]
    pub fn new(request: PipelineRequest, products: Vec<OutputRecord>, message: String) -> Self {
        Self {
            total_products: products.len(),
            products,
            location_id: request.location_id,
            pricelist_id: request.pricelist_id,
            category: request.category,
            message,
            generated_at: Utc::now(),
        }
    }

    /// Builds the report for a run that legitimately found nothing to export.
    #[must_use]
    pub fn empty(request: PipelineRequest, message: String) -> Self {
        Self::new(request, Vec::new(), message)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_to_main_warehouse_and_pricelist() {
        let request: PipelineRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, PipelineRequest::default());
        assert_eq!(request.location_id, 8);
        assert_eq!(request.pricelist_id, 5);
        assert_eq!(request.category, CategorySelector::None);
    }

    #[test]
    fn request_accepts_partial_body() {
        let request: PipelineRequest =
            serde_json::from_str(r#"{"location_id": 12, "category": "b"}"#).unwrap();
        assert_eq!(request.location_id, 12);
        assert_eq!(request.pricelist_id, 5);
        assert_eq!(request.category, CategorySelector::B);
    }

    #[test]
    fn compute_mode_maps_formula_to_base() {
        assert_eq!(ComputeMode::from_erp("fixed"), ComputeMode::Fixed);
        assert_eq!(ComputeMode::from_erp("percentage"), ComputeMode::Percentage);
        assert_eq!(ComputeMode::from_erp("formula"), ComputeMode::Base);
    }

    #[test]
    fn sort_key_falls_back_to_name() {
        let record = OutputRecord {
            product_id: 1,
            name: "Widget".to_owned(),
            display_name: String::new(),
            qty_available: 3,
            price: Decimal::new(1050, 2),
        };
        assert_eq!(record.sort_key(), "Widget");
    }

    #[test]
    fn output_record_serializes_price_as_number() {
        let record = OutputRecord {
            product_id: 7,
            name: "Widget".to_owned(),
            display_name: "Widget".to_owned(),
            qty_available: 8,
            price: Decimal::new(15000, 2),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["price"], serde_json::json!(150.0));
        assert_eq!(json["qty_available"], serde_json::json!(8));
    }

    #[test]
    fn empty_report_counts_zero() {
        let report = StockReport::empty(PipelineRequest::default(), "nothing".to_owned());
        assert!(report.is_empty());
        assert_eq!(report.total_products, 0);
        assert_eq!(report.message, "nothing");
    }
}
