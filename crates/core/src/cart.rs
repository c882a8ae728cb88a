//! Cart reconciliation.
//!
//! The backend only stores `{productId, qty}` pairs. To display a cart the
//! storefront joins those entries against the product catalog, producing
//! [`CartItem`]s that carry everything a cart line needs to render.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{CartEntry, Price, Product, ProductId};

/// A displayable cart line: the full product plus the quantity in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub qty: u32,
}

impl CartItem {
    /// Product ID of this line.
    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// Cost of this line (unit cost times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.cost * self.qty
    }
}

/// A reconciled cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    /// Number of backend entries that referenced products missing from the
    /// catalog and were therefore left out.
    #[serde(default)]
    pub unmatched: usize,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            unmatched: 0,
        }
    }

    /// Whether the cart has no displayable lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `cost * qty` over all lines.
    #[must_use]
    pub fn total_value(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.qty).sum()
    }

    /// Whether a product is already in the cart.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|item| item.product_id() == product_id)
    }

    /// Quantity of a product in the cart, zero if absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.items
            .iter()
            .find(|item| item.product_id() == product_id)
            .map_or(0, |item| item.qty)
    }
}

/// Join backend cart entries with the catalog.
///
/// - Entry order is preserved.
/// - Entries whose product is not in `catalog` are dropped and counted in
///   [`Cart::unmatched`].
/// - Entries with a zero quantity are dropped.
/// - Repeated entries for the same product are merged into the line of the
///   first occurrence, summing quantities.
#[must_use]
pub fn generate_cart_items(entries: &[CartEntry], catalog: &[Product]) -> Cart {
    let by_id: HashMap<&ProductId, &Product> =
        catalog.iter().map(|product| (&product.id, product)).collect();

    let mut cart = Cart::empty();
    let mut positions: HashMap<&ProductId, usize> = HashMap::new();

    for entry in entries {
        if entry.qty == 0 {
            continue;
        }

        let Some(product) = by_id.get(&entry.product_id) else {
            cart.unmatched += 1;
            continue;
        };

        if let Some(&index) = positions.get(&entry.product_id) {
            if let Some(item) = cart.items.get_mut(index) {
                item.qty = item.qty.saturating_add(entry.qty);
            }
            continue;
        }

        positions.insert(&entry.product_id, cart.items.len());
        cart.items.push(CartItem {
            product: (*product).clone(),
            qty: entry.qty,
        });
    }

    cart
}

/// Whether a product with the given ID is already in the cart.
#[must_use]
pub fn is_item_in_cart(cart: &Cart, product_id: &ProductId) -> bool {
    cart.contains(product_id)
}

/// Apply a +/- step from the cart controls, saturating at zero.
///
/// A result of zero means the line should be removed.
#[must_use]
pub const fn next_quantity(current: u32, delta: i32) -> u32 {
    if delta >= 0 {
        current.saturating_add(delta.unsigned_abs())
    } else {
        current.saturating_sub(delta.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, cost: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            category: "Misc".to_string(),
            cost: Price::from_dollars(cost),
            rating: 4,
            image: format!("https://img.example/{id}.jpg"),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("KCRwjF7lN97HnEaY", "Tan Leatherette Weekender Duffle", 150),
            product("BW0jAAeDJmlZCF8i", "Atomberg 1200mm BLDC Fan", 100),
            product("upLK9JbQ4rMhTwt4", "Basketball", 50),
        ]
    }

    #[test]
    fn test_reconcile_preserves_entry_order() {
        let entries = vec![
            CartEntry::new("BW0jAAeDJmlZCF8i", 1),
            CartEntry::new("KCRwjF7lN97HnEaY", 3),
        ];
        let cart = generate_cart_items(&entries, &catalog());

        let names: Vec<_> = cart.items.iter().map(|i| i.product.name.as_str()).collect();
        assert_eq!(
            names,
            ["Atomberg 1200mm BLDC Fan", "Tan Leatherette Weekender Duffle"]
        );
        assert_eq!(cart.items[1].qty, 3);
        assert_eq!(cart.unmatched, 0);
    }

    #[test]
    fn test_reconcile_drops_unknown_products() {
        let entries = vec![
            CartEntry::new("gone", 2),
            CartEntry::new("upLK9JbQ4rMhTwt4", 1),
        ];
        let cart = generate_cart_items(&entries, &catalog());

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.unmatched, 1);
        assert!(cart.contains(&ProductId::new("upLK9JbQ4rMhTwt4")));
    }

    #[test]
    fn test_reconcile_drops_zero_quantity() {
        let entries = vec![CartEntry::new("upLK9JbQ4rMhTwt4", 0)];
        assert!(generate_cart_items(&entries, &catalog()).is_empty());
    }

    #[test]
    fn test_reconcile_merges_duplicates_at_first_position() {
        let entries = vec![
            CartEntry::new("upLK9JbQ4rMhTwt4", 1),
            CartEntry::new("BW0jAAeDJmlZCF8i", 1),
            CartEntry::new("upLK9JbQ4rMhTwt4", 2),
        ];
        let cart = generate_cart_items(&entries, &catalog());

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[0].product.name, "Basketball");
        assert_eq!(cart.items[0].qty, 3);
    }

    #[test]
    fn test_reconcile_with_empty_catalog() {
        let entries = vec![CartEntry::new("upLK9JbQ4rMhTwt4", 1)];
        let cart = generate_cart_items(&entries, &[]);
        assert!(cart.is_empty());
        assert_eq!(cart.unmatched, 1);
    }

    #[test]
    fn test_totals() {
        let entries = vec![
            CartEntry::new("KCRwjF7lN97HnEaY", 3),
            CartEntry::new("BW0jAAeDJmlZCF8i", 1),
        ];
        let cart = generate_cart_items(&entries, &catalog());

        assert_eq!(cart.total_value(), Price::from_dollars(550));
        assert_eq!(cart.total_items(), 4);
        assert_eq!(Cart::empty().total_value(), Price::ZERO);
    }

    #[test]
    fn test_is_item_in_cart_and_quantity() {
        let entries = vec![CartEntry::new("KCRwjF7lN97HnEaY", 2)];
        let cart = generate_cart_items(&entries, &catalog());

        assert!(is_item_in_cart(&cart, &ProductId::new("KCRwjF7lN97HnEaY")));
        assert!(!is_item_in_cart(&cart, &ProductId::new("BW0jAAeDJmlZCF8i")));
        assert_eq!(cart.quantity_of(&ProductId::new("KCRwjF7lN97HnEaY")), 2);
        assert_eq!(cart.quantity_of(&ProductId::new("BW0jAAeDJmlZCF8i")), 0);
    }

    #[test]
    fn test_next_quantity() {
        assert_eq!(next_quantity(1, 1), 2);
        assert_eq!(next_quantity(1, -1), 0);
        assert_eq!(next_quantity(0, -1), 0);
        assert_eq!(next_quantity(u32::MAX, 1), u32::MAX);
    }
}
