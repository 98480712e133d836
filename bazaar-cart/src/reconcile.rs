use std::collections::HashMap;

use uuid::Uuid;

use crate::catalog::Product;
use crate::models::{CartItem, CartItemKey};

/// Merge a locally-held cart into a server-held cart on sign-in.
///
/// The map is seeded with `remote` lines, then `local` lines are overlaid:
/// a shared key keeps the remote line but takes the local quantity (local
/// reflects the user's most recent in-session edits), a new key inserts the
/// local line as-is. Every merged line gets a fresh id; neither side's ids
/// survive the merge.
///
/// The output is provisional: price, sale price, thumbnail and origin must
/// be refreshed from the current catalog before persisting, and lines whose
/// product no longer exists dropped. Pure function, no I/O.
pub fn merge(local: &[CartItem], remote: &[CartItem]) -> Vec<CartItem> {
    let mut merged: Vec<CartItem> = Vec::with_capacity(remote.len() + local.len());
    let mut index: HashMap<CartItemKey, usize> = HashMap::new();

    for item in remote {
        index.insert(item.key(), merged.len());
        merged.push(item.clone());
    }

    for item in local {
        match index.get(&item.key()) {
            Some(&slot) => merged[slot].quantity = item.quantity,
            None => {
                index.insert(item.key(), merged.len());
                merged.push(item.clone());
            }
        }
    }

    for item in &mut merged {
        item.id = Uuid::new_v4();
    }
    merged
}

/// Refresh merged lines against the current catalog: price, sale price,
/// thumbnail, weight and origin are re-read, and lines whose product has
/// been removed are dropped.
pub fn refresh_from_catalog(items: Vec<CartItem>, catalog: &[Product]) -> Vec<CartItem> {
    let by_id: HashMap<Uuid, &Product> = catalog.iter().map(|p| (p.id, p)).collect();

    items
        .into_iter()
        .filter_map(|mut item| {
            let product = by_id.get(&item.product_id)?;
            item.unit_price = product.price;
            item.unit_sale_price = product.sale_price;
            item.product_name = product.name.clone();
            item.thumbnail = product.thumbnail.clone();
            item.unit_weight_kg = product.weight_kg;
            item.origin = product.origin.clone();
            Some(item)
        })
        .collect()
}
