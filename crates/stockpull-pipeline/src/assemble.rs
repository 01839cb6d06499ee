//! Joins quantities, product metadata and prices into sorted output rows.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use stockpull_core::{OutputRecord, ProductInfo};

use crate::aggregate::ProductQuantity;
use crate::pricing::ResolvedPrices;

static BRACKET_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[.*?\]\s*").expect("valid regex"));

/// Rounds to two decimals, midpoint away from zero.
#[must_use]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Removes a leading `[TAG]` (usually the internal reference) and trims.
#[must_use]
pub fn strip_bracket_tag(name: &str) -> String {
    BRACKET_TAG.replace(name, "").trim().to_owned()
}

/// Builds the output rows.
///
/// Products absent from `quantities` are skipped. Quantities are floored and
/// rows whose floored quantity is not positive are dropped. A product with no
/// entry in `prices` is priced at zero.
#[must_use]
pub fn assemble(
    products: &[ProductInfo],
    quantities: &ProductQuantity,
    prices: &ResolvedPrices,
) -> Vec<OutputRecord> {
    let mut records: Vec<OutputRecord> = products
        .iter()
        .filter_map(|product| {
            let quantity = quantities.get(&product.id)?;
            let qty_available = quantity.floor().to_i64()?;
            if qty_available <= 0 {
                return None;
            }
            let price = prices
                .get(&product.id)
                .map_or(Decimal::ZERO, |quote| quote.price);
            Some(OutputRecord {
                product_id: product.id,
                name: strip_bracket_tag(&product.name),
                display_name: strip_bracket_tag(&product.display_name),
                qty_available,
                price: round2(price),
            })
        })
        .collect();

    records.sort_by(|a, b| locale_cmp(a.sort_key(), b.sort_key()));
    records
}

/// Multiplies export prices by a configured factor.
///
/// Applied by the spreadsheet export only; the JSON report always carries the
/// resolved price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportPriceAdjustment {
    pub factor: Decimal,
}

impl ExportPriceAdjustment {
    #[must_use]
    pub fn new(factor: Decimal) -> Self {
        Self { factor }
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.factor == Decimal::ONE
    }

    /// Scales `price`, saturating at `Decimal::MAX` instead of overflowing.
    #[must_use]
    pub fn apply(&self, price: Decimal) -> Decimal {
        round2(price.saturating_mul(self.factor))
    }

    /// Returns `records` with every price adjusted.
    #[must_use]
    pub fn apply_all(&self, records: &[OutputRecord]) -> Vec<OutputRecord> {
        records
            .iter()
            .map(|record| OutputRecord {
                price: self.apply(record.price),
                ..record.clone()
            })
            .collect()
    }
}

impl Default for ExportPriceAdjustment {
    fn default() -> Self {
        Self::new(Decimal::ONE)
    }
}

/// Case-insensitive, accent-folding comparison. Names that differ only in
/// case put the lowercase letter first, so the order is total and stable
/// across runs.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| case_key(a).cmp(case_key(b)))
}

fn case_key(s: &str) -> impl Iterator<Item = (bool, char)> + '_ {
    s.chars().map(|c| (c.is_uppercase(), c))
}

fn collation_key(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).map(fold_accent).collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}
