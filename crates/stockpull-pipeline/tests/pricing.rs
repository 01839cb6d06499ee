//! Price resolver behaviour against an in-memory ERP.

mod support;

use rust_decimal::Decimal;
use stockpull_core::ProductInfo;
use stockpull_odoo::Value;
use stockpull_pipeline::{PriceResolver, PriceStrategy, RuleIndex};
use support::{percentage_rule, quoted_product, FakeErp};

fn product(id: i64, list_price: i64, category_id: Option<i64>) -> ProductInfo {
    ProductInfo {
        id,
        name: format!("Product {id}"),
        display_name: format!("Product {id}"),
        default_code: None,
        list_price: Decimal::from(list_price),
        category_id,
    }
}

#[tokio::test]
async fn direct_quote_wins_when_positive() {
    let erp = FakeErp::new().returning(
        "product.pricelist",
        "get_product_price",
        Value::Double(150.0),
    );
    let resolver = PriceResolver::new(&erp, 2, 5, RuleIndex::default(), 4);

    let quote = resolver.resolve(&product(1, 90, None)).await;
    assert_eq!(quote.price, Decimal::from(150));
    assert_eq!(quote.strategy, PriceStrategy::DirectQuote);
    // No `price_get` handler: the fault hands over to `get_product_price`.
    assert_eq!(erp.call_count("product.pricelist", "price_get"), 1);
}

#[tokio::test]
async fn price_get_struct_answer_is_used_first() {
    let erp = FakeErp::new()
        .returning(
            "product.pricelist",
            "price_get",
            Value::structure([("5", Value::Double(77.0))]),
        )
        .returning("product.pricelist", "get_product_price", Value::Bool(false));
    let resolver = PriceResolver::new(&erp, 2, 5, RuleIndex::default(), 4);

    let quote = resolver.resolve(&product(1, 10, None)).await;
    assert_eq!(quote.price, Decimal::from(77));
    assert_eq!(quote.strategy, PriceStrategy::DirectQuote);
    assert_eq!(
        erp.calls(),
        vec![("product.pricelist".to_owned(), "price_get".to_owned())]
    );
}

#[tokio::test]
async fn non_numeric_price_get_falls_back_to_get_product_price() {
    let erp = FakeErp::new()
        .returning("product.pricelist", "price_get", Value::Bool(false))
        .returning("product.pricelist", "get_product_price", Value::Double(33.0));
    let resolver = PriceResolver::new(&erp, 2, 5, RuleIndex::default(), 4);

    let quote = resolver.resolve(&product(1, 10, None)).await;
    assert_eq!(quote.price, Decimal::from(33));
    assert_eq!(quote.strategy, PriceStrategy::DirectQuote);
    assert_eq!(erp.call_count("product.pricelist", "price_get"), 1);
    assert_eq!(erp.call_count("product.pricelist", "get_product_price"), 1);
}

#[tokio::test]
async fn failed_quote_falls_back_to_category_rule() {
    let erp = FakeErp::new()
        .failing("product.pricelist", "get_product_price", "boom")
        .returning(
            "product.pricelist.item",
            "search_read",
            Value::Array(vec![percentage_rule(3, 20.0)]),
        );
    let rules = RuleIndex::load(&erp, 2, 5).await;
    assert_eq!(rules.len(), 1);

    let resolver = PriceResolver::new(&erp, 2, 5, rules, 4);
    let quote = resolver.resolve(&product(1, 100, Some(3))).await;
    assert_eq!(quote.price, Decimal::from(80));
    assert_eq!(quote.strategy, PriceStrategy::CategoryRule);
}

#[tokio::test]
async fn false_quote_without_rule_uses_list_price() {
    let erp = FakeErp::new().returning(
        "product.pricelist",
        "get_product_price",
        Value::Bool(false),
    );
    let resolver = PriceResolver::new(&erp, 2, 5, RuleIndex::default(), 4);

    let quote = resolver.resolve(&product(1, 42, Some(3))).await;
    assert_eq!(quote.price, Decimal::from(42));
    assert_eq!(quote.strategy, PriceStrategy::ListPrice);
}

#[tokio::test]
async fn negative_list_price_resolves_to_zero() {
    let erp = FakeErp::new().returning("product.pricelist", "get_product_price", Value::Int(0));
    let resolver = PriceResolver::new(&erp, 2, 5, RuleIndex::default(), 1);

    let quote = resolver.resolve(&product(1, -5, None)).await;
    assert_eq!(quote.price, Decimal::ZERO);
}

#[tokio::test]
async fn rule_index_load_failure_yields_empty_index() {
    let erp = FakeErp::new().failing("product.pricelist.item", "search_read", "denied");
    let rules = RuleIndex::load(&erp, 2, 5).await;
    assert!(rules.is_empty());
}

#[tokio::test]
async fn resolve_all_prices_every_product() {
    let erp = FakeErp::new().on("product.pricelist", "get_product_price", |args| {
        // Odd products have a quote, even ones fall through.
        let id = quoted_product(args);
        if id % 2 == 1 {
            Ok(Value::Int(id * 10))
        } else {
            Ok(Value::Bool(false))
        }
    });
    let products: Vec<ProductInfo> = (1..=20).map(|id| product(id, 7, None)).collect();
    let resolver = PriceResolver::new(&erp, 2, 5, RuleIndex::default(), 3);

    let prices = resolver.resolve_all(&products).await;

    assert_eq!(prices.len(), products.len());
    for p in &products {
        let quote = prices[&p.id];
        assert!(quote.price >= Decimal::ZERO);
        if p.id % 2 == 1 {
            assert_eq!(quote.price, Decimal::from(p.id * 10));
        } else {
            assert_eq!(quote.price, Decimal::from(7));
        }
    }
    assert_eq!(erp.call_count("product.pricelist", "get_product_price"), 20);
}

#[tokio::test]
async fn quote_errors_stay_with_their_product() {
    let erp = FakeErp::new()
        .failing("product.pricelist", "price_get", "not supported")
        .on("product.pricelist", "get_product_price", |args| {
            // Multiples of three time out, the rest are quoted.
            let id = quoted_product(args);
            if id % 3 == 0 {
                Err(support::fault(&format!("timeout for {id}")))
            } else {
                Ok(Value::Int(id * 10))
            }
        })
        .returning(
            "product.pricelist.item",
            "search_read",
            Value::Array(vec![percentage_rule(3, 50.0)]),
        );
    let rules = RuleIndex::load(&erp, 2, 5).await;
    let products: Vec<ProductInfo> = (1..=12).map(|id| product(id, 8, Some(3))).collect();
    let resolver = PriceResolver::new(&erp, 2, 5, rules, 4);

    let prices = resolver.resolve_all(&products).await;

    assert_eq!(prices.len(), products.len());
    for p in &products {
        let quote = prices[&p.id];
        if p.id % 3 == 0 {
            assert_eq!(quote.strategy, PriceStrategy::CategoryRule, "product {}", p.id);
            assert_eq!(quote.price, Decimal::from(4));
        } else {
            assert_eq!(quote.strategy, PriceStrategy::DirectQuote, "product {}", p.id);
            assert_eq!(quote.price, Decimal::from(p.id * 10));
        }
    }
}

#[tokio::test]
async fn custom_chain_skips_remote_quote() {
    let erp = FakeErp::new();
    let resolver = PriceResolver::new(&erp, 2, 5, RuleIndex::default(), 2)
        .with_chain(vec![PriceStrategy::CategoryRule, PriceStrategy::ListPrice]);

    let quote = resolver.resolve(&product(1, 12, None)).await;
    assert_eq!(quote.price, Decimal::from(12));
    assert!(erp.calls().is_empty());
}
