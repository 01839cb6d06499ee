//! Typed ERP queries used by the pipeline.
//!
//! Each function issues one `execute` call through an [`ErpGateway`] and
//! decodes the returned rows into `stockpull_core` types. Rows that are
//! missing mandatory fields surface as [`OdooError::Decode`].

use rust_decimal::Decimal;
use stockpull_core::{
    CategoryId, ComputeMode, LocationId, PriceRule, PricelistId, ProductId, ProductInfo,
    StockRecord,
};
use stockpull_odoo::{ErpGateway, OdooError, Uid, Value};

const QUANT_MODEL: &str = "stock.quant";
const PRODUCT_MODEL: &str = "product.product";
const PRICELIST_MODEL: &str = "product.pricelist";
const PRICELIST_ITEM_MODEL: &str = "product.pricelist.item";

const QUANT_FIELDS: [&str; 3] = ["product_id", "quantity", "reserved_quantity"];
const PRODUCT_FIELDS: [&str; 5] = ["name", "display_name", "default_code", "list_price", "categ_id"];
const RULE_FIELDS: [&str; 5] = [
    "categ_id",
    "compute_price",
    "fixed_price",
    "percent_price",
    "price_discount",
];

/// Ids of the positive, active-product quants at `location_id`.
///
/// # Errors
///
/// Propagates the gateway error, or [`OdooError::Decode`] if the result is
/// not a list of ids.
pub async fn search_quant_ids<G: ErpGateway>(
    gateway: &G,
    uid: Uid,
    location_id: LocationId,
) -> Result<Vec<i64>, OdooError> {
    let domain = Value::Array(vec![
        Value::condition("location_id", "=", location_id),
        Value::condition("quantity", ">", 0),
        Value::condition("product_id.active", "=", true),
    ]);
    let result = gateway
        .execute(uid, QUANT_MODEL, "search", vec![domain])
        .await?;
    decode_ids(&result, "stock.quant search")
}

/// Reads the quantity fields of the given quants.
///
/// # Errors
///
/// Propagates the gateway error, or [`OdooError::Decode`] when a row lacks
/// a product or a quantity.
pub async fn read_stock_records<G: ErpGateway>(
    gateway: &G,
    uid: Uid,
    quant_ids: &[i64],
) -> Result<Vec<StockRecord>, OdooError> {
    let result = gateway
        .execute(
            uid,
            QUANT_MODEL,
            "read",
            vec![Value::from(quant_ids.to_vec()), Value::from(QUANT_FIELDS.to_vec())],
        )
        .await?;
    rows(&result, "stock.quant read")?
        .iter()
        .map(decode_stock_record)
        .collect()
}

/// Reads display and pricing metadata for `product_ids`.
///
/// # Errors
///
/// Propagates the gateway error, or [`OdooError::Decode`] when a row has no id.
pub async fn read_products<G: ErpGateway>(
    gateway: &G,
    uid: Uid,
    product_ids: &[ProductId],
) -> Result<Vec<ProductInfo>, OdooError> {
    let result = gateway
        .execute(
            uid,
            PRODUCT_MODEL,
            "read",
            vec![
                Value::from(product_ids.to_vec()),
                Value::from(PRODUCT_FIELDS.to_vec()),
            ],
        )
        .await?;
    rows(&result, "product.product read")?
        .iter()
        .map(decode_product)
        .collect()
}

/// Ids among `product_ids` whose category is `root` or one of its descendants.
///
/// # Errors
///
/// Propagates the gateway error, or [`OdooError::Decode`] if the result is
/// not a list of ids.
pub async fn search_products_in_category<G: ErpGateway>(
    gateway: &G,
    uid: Uid,
    product_ids: &[ProductId],
    root: CategoryId,
) -> Result<Vec<ProductId>, OdooError> {
    let domain = Value::Array(vec![
        Value::condition("id", "in", product_ids.to_vec()),
        Value::condition("categ_id", "child_of", root),
    ]);
    let result = gateway
        .execute(uid, PRODUCT_MODEL, "search", vec![domain])
        .await?;
    decode_ids(&result, "product.product search")
}

/// Category-scoped rules of `pricelist_id`, in the ERP's sequence order.
///
/// Rows without a category (product- or global-scoped rules) are skipped.
///
/// # Errors
///
/// Propagates the gateway error, or [`OdooError::Decode`] if the result is
/// not a list of rows.
pub async fn search_price_rules<G: ErpGateway>(
    gateway: &G,
    uid: Uid,
    pricelist_id: PricelistId,
) -> Result<Vec<PriceRule>, OdooError> {
    let domain = Value::Array(vec![Value::condition("pricelist_id", "=", pricelist_id)]);
    let result = gateway
        .execute(
            uid,
            PRICELIST_ITEM_MODEL,
            "search_read",
            vec![domain, Value::from(RULE_FIELDS.to_vec())],
        )
        .await?;
    Ok(rows(&result, "product.pricelist.item search_read")?
        .iter()
        .filter_map(decode_price_rule)
        .collect())
}

/// Price-list methods that quote a single product, in the order they are
/// tried. Older ERPs answer `price_get`; newer ones only know
/// `get_product_price`.
pub const QUOTE_METHODS: [&str; 2] = ["price_get", "get_product_price"];

/// Asks the ERP to price one unit of `product_id` on `pricelist_id` through
/// `method`, one of [`QUOTE_METHODS`].
///
/// Returns the raw value; interpreting it is the caller's job.
///
/// # Errors
///
/// Propagates the gateway error.
pub async fn quote_price<G: ErpGateway>(
    gateway: &G,
    uid: Uid,
    method: &str,
    pricelist_id: PricelistId,
    product_id: ProductId,
) -> Result<Value, OdooError> {
    gateway
        .execute(
            uid,
            PRICELIST_MODEL,
            method,
            vec![Value::Int(pricelist_id), Value::Int(product_id), Value::Int(1)],
        )
        .await
}

/// Converts an ERP float into a `Decimal`.
#[must_use]
pub fn decimal_from(value: &Value) -> Option<Decimal> {
    match value {
        Value::Int(i) => Some(Decimal::from(*i)),
        other => other.as_f64().and_then(|f| Decimal::try_from(f).ok()),
    }
}

fn rows<'a>(result: &'a Value, context: &str) -> Result<&'a [Value], OdooError> {
    result.as_array().ok_or_else(|| OdooError::Decode {
        context: context.to_owned(),
        reason: format!("expected a list of records, got {result:?}"),
    })
}

fn decode_ids(result: &Value, context: &str) -> Result<Vec<i64>, OdooError> {
    rows(result, context)?
        .iter()
        .map(|v| {
            v.as_i64().ok_or_else(|| OdooError::Decode {
                context: context.to_owned(),
                reason: format!("expected an integer id, got {v:?}"),
            })
        })
        .collect()
}

fn decode_stock_record(row: &Value) -> Result<StockRecord, OdooError> {
    let missing = |field: &str| OdooError::Decode {
        context: "stock.quant read".to_owned(),
        reason: format!("row without {field}: {row:?}"),
    };

    let product_id = row
        .get("product_id")
        .and_then(Value::as_many2one_id)
        .ok_or_else(|| missing("product_id"))?;
    let quantity_on_hand = row
        .get("quantity")
        .and_then(decimal_from)
        .ok_or_else(|| missing("quantity"))?;
    // Odoo sends `false` for an unset reservation.
    let quantity_reserved = row
        .get("reserved_quantity")
        .and_then(decimal_from)
        .unwrap_or(Decimal::ZERO);

    Ok(StockRecord {
        product_id,
        quantity_on_hand,
        quantity_reserved,
    })
}

fn decode_product(row: &Value) -> Result<ProductInfo, OdooError> {
    let id = row
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| OdooError::Decode {
            context: "product.product read".to_owned(),
            reason: format!("row without id: {row:?}"),
        })?;

    let name = row
        .get("name")
        .and_then(Value::as_opt_str)
        .unwrap_or_default()
        .to_owned();
    let display_name = row
        .get("display_name")
        .and_then(Value::as_opt_str)
        .map_or_else(|| name.clone(), ToOwned::to_owned);

    Ok(ProductInfo {
        id,
        display_name,
        name,
        default_code: row
            .get("default_code")
            .and_then(Value::as_opt_str)
            .map(ToOwned::to_owned),
        list_price: row
            .get("list_price")
            .and_then(decimal_from)
            .unwrap_or(Decimal::ZERO),
        category_id: row.get("categ_id").and_then(Value::as_many2one_id),
    })
}

fn decode_price_rule(row: &Value) -> Option<PriceRule> {
    let category_id = row.get("categ_id").and_then(Value::as_many2one_id)?;
    let compute_mode = row
        .get("compute_price")
        .and_then(Value::as_str)
        .map_or(ComputeMode::Base, ComputeMode::from_erp);

    let percent = row
        .get("percent_price")
        .and_then(decimal_from)
        .filter(|d| !d.is_zero());
    let discount_percent = percent.or_else(|| row.get("price_discount").and_then(decimal_from));

    Some(PriceRule {
        category_id,
        compute_mode,
        fixed_price: row.get("fixed_price").and_then(decimal_from),
        discount_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m2o(id: i64, name: &str) -> Value {
        Value::Array(vec![Value::Int(id), Value::from(name)])
    }

    #[test]
    fn decimal_from_keeps_short_representation() {
        assert_eq!(decimal_from(&Value::Double(0.1)), Some(Decimal::new(1, 1)));
        assert_eq!(decimal_from(&Value::Int(5)), Some(Decimal::from(5)));
        assert_eq!(decimal_from(&Value::Bool(false)), None);
    }

    #[test]
    fn stock_record_treats_false_reservation_as_zero() {
        let row = Value::structure([
            ("product_id", m2o(7, "Widget")),
            ("quantity", Value::Double(4.0)),
            ("reserved_quantity", Value::Bool(false)),
        ]);
        let record = decode_stock_record(&row).unwrap();
        assert_eq!(record.product_id, 7);
        assert_eq!(record.quantity_on_hand, Decimal::from(4));
        assert_eq!(record.quantity_reserved, Decimal::ZERO);
    }

    #[test]
    fn stock_record_without_product_is_decode_error() {
        let row = Value::structure([
            ("product_id", Value::Bool(false)),
            ("quantity", Value::Double(4.0)),
        ]);
        let err = decode_stock_record(&row).unwrap_err();
        assert!(matches!(err, OdooError::Decode { .. }), "got: {err:?}");
    }

    #[test]
    fn product_display_name_falls_back_to_name() {
        let row = Value::structure([
            ("id", Value::Int(3)),
            ("name", Value::from("Widget")),
            ("display_name", Value::Bool(false)),
            ("default_code", Value::Bool(false)),
            ("list_price", Value::Double(12.5)),
            ("categ_id", m2o(9, "All / Tools")),
        ]);
        let product = decode_product(&row).unwrap();
        assert_eq!(product.display_name, "Widget");
        assert_eq!(product.default_code, None);
        assert_eq!(product.list_price, Decimal::new(125, 1));
        assert_eq!(product.category_id, Some(9));
    }

    #[test]
    fn price_rule_without_category_is_skipped() {
        let row = Value::structure([
            ("categ_id", Value::Bool(false)),
            ("compute_price", Value::from("fixed")),
        ]);
        assert!(decode_price_rule(&row).is_none());
    }

    #[test]
    fn price_rule_discount_falls_back_to_price_discount() {
        let row = Value::structure([
            ("categ_id", m2o(4, "Drinks")),
            ("compute_price", Value::from("percentage")),
            ("fixed_price", Value::Double(0.0)),
            ("percent_price", Value::Double(0.0)),
            ("price_discount", Value::Double(15.0)),
        ]);
        let rule = decode_price_rule(&row).unwrap();
        assert_eq!(rule.category_id, 4);
        assert_eq!(rule.compute_mode, ComputeMode::Percentage);
        assert_eq!(rule.discount_percent, Some(Decimal::from(15)));
    }

    #[test]
    fn decode_ids_rejects_non_integer_entries() {
        let result = Value::Array(vec![Value::Int(1), Value::from("2")]);
        let err = decode_ids(&result, "test").unwrap_err();
        assert!(matches!(err, OdooError::Decode { .. }), "got: {err:?}");
    }
}
