use std::collections::BTreeMap;

use rust_decimal::Decimal;
use stockpull_core::{ProductId, StockRecord};

/// Net available quantity per product, keyed in ascending id order.
pub type ProductQuantity = BTreeMap<ProductId, Decimal>;

/// Sums `on_hand - max(reserved, 0)` per product across every record, then
/// drops the products whose total is not positive.
///
/// The drop happens after all records are folded so that one over-reserved
/// quant cannot hide stock held in another quant of the same product.
#[must_use]
pub fn aggregate(records: &[StockRecord]) -> ProductQuantity {
    let mut totals = ProductQuantity::new();
    for record in records {
        let reserved = record.quantity_reserved.max(Decimal::ZERO);
        *totals.entry(record.product_id).or_insert(Decimal::ZERO) +=
            record.quantity_on_hand - reserved;
    }
    totals.retain(|_, total| *total > Decimal::ZERO);
    totals
}
