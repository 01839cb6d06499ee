use std::collections::HashSet;

use stockpull_core::{CategoryId, ProductId};
use stockpull_odoo::{ErpGateway, OdooError, Uid};

use crate::erp;

/// Keeps the entries of `ids` that also appear in `allowed`, in `ids` order,
/// without duplicates.
#[must_use]
pub fn intersect_preserving_order(ids: &[ProductId], allowed: &[ProductId]) -> Vec<ProductId> {
    let allowed: HashSet<ProductId> = allowed.iter().copied().collect();
    let mut seen = HashSet::with_capacity(allowed.len());
    ids.iter()
        .copied()
        .filter(|id| allowed.contains(id) && seen.insert(*id))
        .collect()
}

/// Narrows `product_ids` to the subtree rooted at `root`. With no root the
/// input is returned unchanged and the ERP is not called.
pub(crate) async fn filter_by_category<G: ErpGateway>(
    gateway: &G,
    uid: Uid,
    product_ids: Vec<ProductId>,
    root: Option<CategoryId>,
) -> Result<Vec<ProductId>, OdooError> {
    let Some(root) = root else {
        return Ok(product_ids);
    };
    let in_subtree = erp::search_products_in_category(gateway, uid, &product_ids, root).await?;
    Ok(intersect_preserving_order(&product_ids, &in_subtree))
}
