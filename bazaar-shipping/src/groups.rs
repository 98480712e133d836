use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_cart::models::{CartItem, Origin};

use crate::rates::ShippingRate;

/// Checkout-time grouping of cart items by fulfillment origin, prior to
/// order persistence. A group always has exactly one origin and at least
/// one item — it is only created when the first item for its origin is seen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingGroup {
    pub origin: Origin,
    pub items: Vec<CartItem>,
    pub items_total: f64,
    pub total_weight_kg: f64,
    pub selected_rate: Option<ShippingRate>,
}

impl ShippingGroup {
    fn seed(origin: Origin) -> Self {
        Self {
            origin,
            items: Vec::new(),
            items_total: 0.0,
            total_weight_kg: 0.0,
            selected_rate: None,
        }
    }

    fn push(&mut self, item: CartItem) {
        self.items_total += item.line_total();
        self.total_weight_kg += item.line_weight_kg();
        self.items.push(item);
    }
}

/// Split checkout items into one group per fulfillment origin. Ordering is
/// stable: groups appear in the order their origin was first seen, so the
/// same input always yields the same group sequence.
pub fn partition(items: &[CartItem]) -> Vec<ShippingGroup> {
    let mut groups: Vec<ShippingGroup> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for item in items {
        let slot = *index.entry(item.origin.seller_id).or_insert_with(|| {
            groups.push(ShippingGroup::seed(item.origin.clone()));
            groups.len() - 1
        });
        groups[slot].push(item.clone());
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(seller_id: Uuid, price: f64, quantity: u32, weight: f64) -> CartItem {
        CartItem {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            size: None,
            color: None,
            quantity,
            unit_price: price,
            unit_sale_price: None,
            product_name: "dupatta".to_string(),
            thumbnail: "https://img.example.com/dupatta.jpg".to_string(),
            unit_weight_kg: weight,
            origin: Origin {
                seller_id,
                pincode: "400001".to_string(),
                city: "Mumbai".to_string(),
                state: "Maharashtra".to_string(),
            },
        }
    }

    #[test]
    fn test_partition_is_total_and_disjoint() {
        let seller_a = Uuid::new_v4();
        let seller_b = Uuid::new_v4();
        let items = vec![
            item(seller_a, 100.0, 1, 0.2),
            item(seller_b, 200.0, 2, 0.3),
            item(seller_a, 50.0, 3, 0.1),
        ];

        let groups = partition(&items);
        assert_eq!(groups.len(), 2);

        let grouped: usize = groups.iter().map(|g| g.items.len()).sum();
        assert_eq!(grouped, items.len());

        for input in &items {
            let appearances = groups
                .iter()
                .flat_map(|g| g.items.iter())
                .filter(|i| i.id == input.id)
                .count();
            assert_eq!(appearances, 1);
        }
    }

    #[test]
    fn test_totals_and_weight_accumulate() {
        let seller = Uuid::new_v4();
        let items = vec![item(seller, 100.0, 2, 0.5), item(seller, 50.0, 1, 0.25)];

        let groups = partition(&items);
        assert_eq!(groups.len(), 1);
        assert!(bazaar_shared::approx_eq(groups[0].items_total, 250.0));
        assert!((groups[0].total_weight_kg - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_group_order_follows_first_seen_origin() {
        let seller_a = Uuid::new_v4();
        let seller_b = Uuid::new_v4();
        let items = vec![
            item(seller_b, 10.0, 1, 0.1),
            item(seller_a, 10.0, 1, 0.1),
            item(seller_b, 10.0, 1, 0.1),
        ];

        let groups = partition(&items);
        assert_eq!(groups[0].origin.seller_id, seller_b);
        assert_eq!(groups[1].origin.seller_id, seller_a);
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(partition(&[]).is_empty());
    }
}
