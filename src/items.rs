//! Items

use rust_decimal::Decimal;

use crate::products::{ProductId, ProductSnapshot};

/// A single product line in a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineItem {
    /// Product this line refers to; unique within a cart
    pub product_id: ProductId,

    /// Number of units, always at least one
    pub quantity: u32,

    /// Price per unit used for totals
    pub unit_price: Decimal,

    /// Display name
    pub name: String,

    /// Image reference
    pub image: Option<String>,

    /// Whether the product was in stock when last seen
    pub in_stock: bool,
}

impl CartLineItem {
    /// Create a line from a catalog snapshot, capturing its current price.
    pub fn from_snapshot(product: &ProductSnapshot, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            quantity,
            unit_price: product.price,
            name: product.name.clone(),
            image: product.image.clone(),
            in_stock: product.in_stock,
        }
    }

    /// Price of all units on this line, saturating at the bounds of [`Decimal`].
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }

    /// Price of all units on this line, or `None` when it does not fit in a [`Decimal`].
    pub fn checked_line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }

    /// Replace the presentation fields with fresh catalog data, leaving price and quantity alone.
    pub fn refresh_display(&mut self, product: &ProductSnapshot) {
        self.name.clone_from(&product.name);
        self.image.clone_from(&product.image);
        self.in_stock = product.in_stock;
    }
}

/// Pick the unit price for a line: the stored snapshot, else the catalog price, else zero.
pub fn resolve_unit_price(stored: Option<Decimal>, catalog: Option<Decimal>) -> Decimal {
    stored.or(catalog).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let item = CartLineItem::from_snapshot(
            &ProductSnapshot::new(ProductId::new(1), "Tea", Decimal::new(333, 2)),
            3,
        );

        assert_eq!(item.line_total(), Decimal::new(999, 2));
        assert_eq!(item.checked_line_total(), Some(Decimal::new(999, 2)));
    }

    #[test]
    fn test_line_total_saturates() {
        let item = CartLineItem::from_snapshot(
            &ProductSnapshot::new(ProductId::new(1), "Yacht", Decimal::MAX),
            2,
        );

        assert_eq!(item.line_total(), Decimal::MAX);
        assert_eq!(item.checked_line_total(), None);
    }

    #[test]
    fn test_price_precedence() {
        let stored = Some(Decimal::new(500, 2));
        let catalog = Some(Decimal::new(700, 2));

        assert_eq!(resolve_unit_price(stored, catalog), Decimal::new(500, 2));
        assert_eq!(resolve_unit_price(None, catalog), Decimal::new(700, 2));
        assert_eq!(resolve_unit_price(None, None), Decimal::ZERO);
    }

    #[test]
    fn test_refresh_display_keeps_price() {
        let mut item = CartLineItem::from_snapshot(
            &ProductSnapshot::new(ProductId::new(1), "Tea", Decimal::new(300, 2)),
            2,
        );

        let mut renamed = ProductSnapshot::new(ProductId::new(1), "Green Tea", Decimal::new(900, 2));
        renamed.in_stock = false;

        item.refresh_display(&renamed);

        assert_eq!(item.name, "Green Tea");
        assert!(!item.in_stock);
        assert_eq!(item.unit_price, Decimal::new(300, 2));
        assert_eq!(item.quantity, 2);
    }
}
