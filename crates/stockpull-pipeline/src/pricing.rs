//! Unit price resolution.
//!
//! Every product gets exactly one price. The resolver walks an ordered chain
//! of [`PriceStrategy`] values per product and keeps the first one that
//! resolves. The last strategy in the default chain always resolves, so a
//! product can never come out without a price.

use std::collections::HashMap;
use std::fmt;

use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use stockpull_core::{CategoryId, ComputeMode, PriceRule, PricelistId, ProductId, ProductInfo};
use stockpull_odoo::{ErpGateway, Uid, Value};

use crate::erp;

/// One way of pricing a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceStrategy {
    /// Ask the ERP to evaluate the price list for the product.
    DirectQuote,
    /// Apply the price list's rule for the product's category.
    CategoryRule,
    /// Use the product's own list price, or zero.
    ListPrice,
}

impl PriceStrategy {
    /// Order in which strategies are tried.
    pub const CHAIN: [PriceStrategy; 3] = [
        PriceStrategy::DirectQuote,
        PriceStrategy::CategoryRule,
        PriceStrategy::ListPrice,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PriceStrategy::DirectQuote => "direct_quote",
            PriceStrategy::CategoryRule => "category_rule",
            PriceStrategy::ListPrice => "list_price",
        }
    }
}

impl fmt::Display for PriceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single strategy attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Decimal),
    Unresolved,
}

/// A resolved unit price and the strategy that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    pub price: Decimal,
    pub strategy: PriceStrategy,
}

pub type ResolvedPrices = HashMap<ProductId, PriceQuote>;

/// Category-scoped price-list rules, one per category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleIndex {
    rules: HashMap<CategoryId, PriceRule>,
}

impl RuleIndex {
    /// Indexes `rules` by category. When a category has several rules the
    /// first one wins, matching the ERP's sequence ordering.
    #[must_use]
    pub fn from_rules(rules: impl IntoIterator<Item = PriceRule>) -> Self {
        let mut index = HashMap::new();
        for rule in rules {
            index.entry(rule.category_id).or_insert(rule);
        }
        Self { rules: index }
    }

    /// Fetches the rules of `pricelist_id`. A failed fetch is logged and
    /// yields an empty index; price resolution then falls through to the
    /// list price.
    pub async fn load<G: ErpGateway>(gateway: &G, uid: Uid, pricelist_id: PricelistId) -> Self {
        match erp::search_price_rules(gateway, uid, pricelist_id).await {
            Ok(rules) => {
                let index = Self::from_rules(rules);
                tracing::debug!(pricelist_id, rules = index.len(), "price-list rules indexed");
                index
            }
            Err(e) => {
                tracing::warn!(
                    pricelist_id,
                    error = %e,
                    "failed to load price-list rules; continuing without category rules"
                );
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn get(&self, category_id: CategoryId) -> Option<&PriceRule> {
        self.rules.get(&category_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Prices `product` with the rule for its category.
    #[must_use]
    pub fn price_for(&self, product: &ProductInfo) -> Resolution {
        let Some(rule) = product.category_id.and_then(|id| self.get(id)) else {
            return Resolution::Unresolved;
        };
        let price = match rule.compute_mode {
            ComputeMode::Fixed => rule.fixed_price.unwrap_or(Decimal::ZERO),
            ComputeMode::Percentage => {
                let discount = rule.discount_percent.unwrap_or(Decimal::ZERO);
                let factor = Decimal::ONE - discount / Decimal::ONE_HUNDRED;
                let Some(price) = product.list_price.checked_mul(factor) else {
                    tracing::warn!(
                        product_id = product.id,
                        category_id = rule.category_id,
                        %discount,
                        "category rule price overflows; skipping rule"
                    );
                    return Resolution::Unresolved;
                };
                price
            }
            ComputeMode::Base => product.list_price,
        };
        Resolution::Resolved(price)
    }
}

/// Interprets the ERP's answer to a direct price-list quote.
///
/// Accepts a bare number, or a struct with a single numeric member (the
/// `{pricelist_id: price}` shape of older `price_get`). Zero, negative and
/// non-numeric answers mean the price list has no opinion.
#[must_use]
pub fn interpret_quote(value: &Value) -> Resolution {
    let number = match value {
        Value::Struct(members) if members.len() == 1 => {
            members.values().next().and_then(erp::decimal_from)
        }
        Value::Int(_) | Value::Double(_) => erp::decimal_from(value),
        _ => None,
    };
    match number {
        Some(price) if price > Decimal::ZERO => Resolution::Resolved(price),
        _ => Resolution::Unresolved,
    }
}

/// Resolves unit prices for one pipeline run.
pub struct PriceResolver<'a, G> {
    gateway: &'a G,
    uid: Uid,
    pricelist_id: PricelistId,
    rules: RuleIndex,
    concurrency: usize,
    chain: Vec<PriceStrategy>,
}

impl<'a, G: ErpGateway> PriceResolver<'a, G> {
    #[must_use]
    pub fn new(
        gateway: &'a G,
        uid: Uid,
        pricelist_id: PricelistId,
        rules: RuleIndex,
        concurrency: usize,
    ) -> Self {
        Self {
            gateway,
            uid,
            pricelist_id,
            rules,
            concurrency: concurrency.max(1),
            chain: PriceStrategy::CHAIN.to_vec(),
        }
    }

    /// Replaces the strategy chain. A chain that does not end in
    /// [`PriceStrategy::ListPrice`] may leave products at zero.
    #[must_use]
    pub fn with_chain(mut self, chain: Vec<PriceStrategy>) -> Self {
        self.chain = chain;
        self
    }

    /// Resolves every product concurrently, at most `concurrency` quotes in
    /// flight at once.
    pub async fn resolve_all(&self, products: &[ProductInfo]) -> ResolvedPrices {
        let tasks: Vec<_> = products
            .iter()
            .map(|product| async move { (product.id, self.resolve(product).await) })
            .collect();
        stream::iter(tasks)
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    /// Folds the chain for one product, stopping at the first resolved
    /// strategy. The price is clamped at zero.
    pub async fn resolve(&self, product: &ProductInfo) -> PriceQuote {
        for &strategy in &self.chain {
            if let Resolution::Resolved(price) = self.attempt(strategy, product).await {
                tracing::trace!(product_id = product.id, %strategy, %price, "price resolved");
                return PriceQuote {
                    price: price.max(Decimal::ZERO),
                    strategy,
                };
            }
        }
        PriceQuote {
            price: Decimal::ZERO,
            strategy: PriceStrategy::ListPrice,
        }
    }

    async fn attempt(&self, strategy: PriceStrategy, product: &ProductInfo) -> Resolution {
        match strategy {
            PriceStrategy::DirectQuote => self.direct_quote(product).await,
            PriceStrategy::CategoryRule => self.rules.price_for(product),
            PriceStrategy::ListPrice => {
                Resolution::Resolved(product.list_price.max(Decimal::ZERO))
            }
        }
    }

    /// Tries each quote method in turn. A method that fails or answers
    /// without a usable number hands over to the next one.
    async fn direct_quote(&self, product: &ProductInfo) -> Resolution {
        for method in erp::QUOTE_METHODS {
            match erp::quote_price(self.gateway, self.uid, method, self.pricelist_id, product.id)
                .await
            {
                Ok(value) => {
                    let resolution = interpret_quote(&value);
                    if resolution != Resolution::Unresolved {
                        return resolution;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        product_id = product.id,
                        pricelist_id = self.pricelist_id,
                        method,
                        error = %e,
                        "direct price quote failed"
                    );
                }
            }
        }
        Resolution::Unresolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(category_id: Option<CategoryId>, list_price: Decimal) -> ProductInfo {
        ProductInfo {
            id: 1,
            name: "Widget".to_owned(),
            display_name: "Widget".to_owned(),
            default_code: None,
            list_price,
            category_id,
        }
    }

    fn rule(category_id: CategoryId, mode: ComputeMode) -> PriceRule {
        PriceRule {
            category_id,
            compute_mode: mode,
            fixed_price: Some(Decimal::from(42)),
            discount_percent: Some(Decimal::from(20)),
        }
    }

    #[test]
    fn first_rule_per_category_wins() {
        let index = RuleIndex::from_rules([
            rule(3, ComputeMode::Fixed),
            rule(3, ComputeMode::Percentage),
            rule(4, ComputeMode::Base),
        ]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(3).unwrap().compute_mode, ComputeMode::Fixed);
    }

    #[test]
    fn percentage_rule_discounts_list_price() {
        let index = RuleIndex::from_rules([rule(3, ComputeMode::Percentage)]);
        assert_eq!(
            index.price_for(&product(Some(3), Decimal::from(50))),
            Resolution::Resolved(Decimal::from(40))
        );
    }

    #[test]
    fn overflowing_markup_leaves_rule_unresolved() {
        let mut markup = rule(3, ComputeMode::Percentage);
        markup.discount_percent = Some(Decimal::from(-100_000));
        let index = RuleIndex::from_rules([markup]);
        assert_eq!(
            index.price_for(&product(Some(3), Decimal::MAX)),
            Resolution::Unresolved
        );
    }

    #[test]
    fn fixed_rule_without_price_is_zero() {
        let mut fixed = rule(3, ComputeMode::Fixed);
        fixed.fixed_price = None;
        let index = RuleIndex::from_rules([fixed]);
        assert_eq!(
            index.price_for(&product(Some(3), Decimal::from(50))),
            Resolution::Resolved(Decimal::ZERO)
        );
    }

    #[test]
    fn base_rule_uses_list_price() {
        let index = RuleIndex::from_rules([rule(3, ComputeMode::Base)]);
        assert_eq!(
            index.price_for(&product(Some(3), Decimal::new(995, 2))),
            Resolution::Resolved(Decimal::new(995, 2))
        );
    }

    #[test]
    fn product_without_matching_rule_is_unresolved() {
        let index = RuleIndex::from_rules([rule(3, ComputeMode::Base)]);
        assert_eq!(
            index.price_for(&product(Some(9), Decimal::ONE)),
            Resolution::Unresolved
        );
        assert_eq!(
            index.price_for(&product(None, Decimal::ONE)),
            Resolution::Unresolved
        );
    }

    #[test]
    fn quote_accepts_numbers_and_single_member_struct() {
        assert_eq!(
            interpret_quote(&Value::Double(12.5)),
            Resolution::Resolved(Decimal::new(125, 1))
        );
        assert_eq!(
            interpret_quote(&Value::Int(7)),
            Resolution::Resolved(Decimal::from(7))
        );
        assert_eq!(
            interpret_quote(&Value::structure([("5", Value::Double(3.0))])),
            Resolution::Resolved(Decimal::from(3))
        );
    }

    #[test]
    fn quote_rejects_falsy_and_non_numeric_answers() {
        assert_eq!(interpret_quote(&Value::Bool(false)), Resolution::Unresolved);
        assert_eq!(interpret_quote(&Value::Nil), Resolution::Unresolved);
        assert_eq!(interpret_quote(&Value::Double(0.0)), Resolution::Unresolved);
        assert_eq!(interpret_quote(&Value::Int(-3)), Resolution::Unresolved);
        assert_eq!(interpret_quote(&Value::from("12.5")), Resolution::Unresolved);
        assert_eq!(
            interpret_quote(&Value::structure([
                ("5", Value::Double(3.0)),
                ("6", Value::Double(4.0)),
            ])),
            Resolution::Unresolved
        );
    }

    #[test]
    fn chain_ends_with_list_price() {
        assert_eq!(PriceStrategy::CHAIN.last(), Some(&PriceStrategy::ListPrice));
        assert_eq!(PriceStrategy::CategoryRule.to_string(), "category_rule");
    }
}
