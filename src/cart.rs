//! Cart

use rust_decimal::Decimal;

use crate::{
    items::CartLineItem,
    pricing::{CartTotals, compute_totals},
    products::{ProductId, ProductSnapshot},
};

/// A cart: ordered line items, unique by product, with totals derived from them.
///
/// Fields are private so every mutation goes through a method that recomputes the totals.
/// [`Cart::default`] is the canonical empty cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartLineItem>,
    totals: CartTotals,
}

impl Cart {
    /// Build a cart from line items.
    ///
    /// Lines sharing a product are merged into the first occurrence (quantities summed), and
    /// lines with a zero quantity are dropped.
    pub fn from_items(items: impl IntoIterator<Item = CartLineItem>) -> Self {
        let mut merged: Vec<CartLineItem> = Vec::new();

        for item in items {
            if item.quantity == 0 {
                continue;
            }

            match merged
                .iter_mut()
                .find(|existing| existing.product_id == item.product_id)
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => merged.push(item),
            }
        }

        let totals = compute_totals(&merged);

        Self {
            items: merged,
            totals,
        }
    }

    /// Line items in insertion order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Consume the cart, returning its line items.
    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    /// Derived totals.
    pub fn totals(&self) -> &CartTotals {
        &self.totals
    }

    /// Sum of `unit_price * quantity`.
    pub fn total(&self) -> Decimal {
        self.totals.total
    }

    /// Sum of quantities.
    pub fn item_count(&self) -> u64 {
        self.totals.item_count
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The line for a product, if present.
    pub fn get(&self, product: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.product_id == product)
    }

    /// Quantity of a product in the cart, zero when absent.
    pub fn quantity_of(&self, product: ProductId) -> u32 {
        self.get(product).map_or(0, |item| item.quantity)
    }

    /// Add `quantity` units of a product, inserting a new line priced from the snapshot when
    /// the product is not yet in the cart.
    pub fn add(&mut self, product: &ProductSnapshot, quantity: u32) {
        if quantity == 0 {
            return;
        }

        match self.items.iter_mut().find(|item| item.product_id == product.id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(quantity);
                item.refresh_display(product);
            }
            None => self.items.push(CartLineItem::from_snapshot(product, quantity)),
        }

        self.recalculate();
    }

    /// Set the absolute quantity of an existing line; zero removes it.
    ///
    /// Returns `false` when the product is not in the cart, in which case nothing changes.
    pub fn set_quantity(&mut self, product: ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product);
        }

        let Some(item) = self.items.iter_mut().find(|item| item.product_id == product) else {
            return false;
        };

        item.quantity = quantity;

        self.recalculate();

        true
    }

    /// Remove a product's line, returning whether it was present.
    pub fn remove(&mut self, product: ProductId) -> bool {
        let before = self.items.len();

        self.items.retain(|item| item.product_id != product);

        let removed = self.items.len() != before;

        if removed {
            self.recalculate();
        }

        removed
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
        self.recalculate();
    }

    fn recalculate(&mut self) {
        self.totals = compute_totals(&self.items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, cents: i64) -> ProductSnapshot {
        ProductSnapshot::new(ProductId::new(id), format!("Product {id}"), Decimal::new(cents, 2))
    }

    #[test]
    fn test_empty_cart_is_zero_value() {
        let cart = Cart::default();

        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart, Cart::from_items([]));
    }

    #[test]
    fn test_add_increments_existing_line() {
        let mut cart = Cart::default();

        cart.add(&product(7, 200), 2);
        cart.add(&product(7, 200), 1);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(7)), 3);
        assert_eq!(cart.total(), Decimal::new(600, 2));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_add_keeps_price_snapshot() {
        let mut cart = Cart::default();

        cart.add(&product(1, 1000), 1);
        cart.add(&product(1, 1500), 1);

        assert_eq!(cart.total(), Decimal::new(2000, 2));
    }

    #[test]
    fn test_set_quantity_is_absolute() {
        let mut cart = Cart::default();

        cart.add(&product(7, 100), 2);

        assert!(cart.set_quantity(ProductId::new(7), 3));
        assert_eq!(cart.quantity_of(ProductId::new(7)), 3);

        assert!(cart.set_quantity(ProductId::new(7), 3));
        assert_eq!(cart.quantity_of(ProductId::new(7)), 3);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::default();

        cart.add(&product(7, 100), 2);

        assert!(cart.set_quantity(ProductId::new(7), 0));
        assert!(cart.get(ProductId::new(7)).is_none());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_set_quantity_missing_is_noop() {
        let mut cart = Cart::default();

        cart.add(&product(1, 100), 1);

        assert!(!cart.set_quantity(ProductId::new(2), 4));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cart = Cart::default();

        assert!(!cart.remove(ProductId::new(1)));
        assert_eq!(cart, Cart::default());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut cart = Cart::default();

        cart.add(&product(1, 100), 1);
        cart.clear();

        let once = cart.clone();

        cart.clear();

        assert_eq!(cart, once);
        assert_eq!(cart, Cart::default());
    }

    #[test]
    fn test_from_items_merges_duplicates_and_drops_empty_lines() {
        let a = CartLineItem::from_snapshot(&product(1, 100), 1);
        let b = CartLineItem::from_snapshot(&product(2, 100), 0);
        let c = CartLineItem::from_snapshot(&product(1, 100), 2);

        let cart = Cart::from_items([a, b, c]);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 3);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_uniqueness_after_mixed_operations() {
        let mut cart = Cart::default();

        for round in 0..5_u32 {
            cart.add(&product(1, 100), 1);
            cart.add(&product(2, 100), 1);
            cart.set_quantity(ProductId::new(1), round + 1);
            cart.add(&product(1, 100), 1);
        }

        let mut ids: Vec<_> = cart.items().iter().map(|item| item.product_id).collect();

        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), cart.len());
    }
}
