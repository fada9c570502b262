//! Prices

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso};

use crate::items::CartLineItem;

/// Aggregate values derived from a cart's line items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of `unit_price * quantity`, unrounded
    pub total: Decimal,

    /// Sum of quantities
    pub item_count: u64,
}

impl CartTotals {
    /// The total rendered as currency text.
    pub fn display_total(&self) -> String {
        format_amount(self.total)
    }
}

/// Calculates the total and item count of a list of line items.
///
/// Used identically by the local and server paths, so both modes agree on totals. Sums saturate
/// at the bounds of [`Decimal`] and `u64`; use [`checked_totals`] to detect that case.
pub fn compute_totals(items: &[CartLineItem]) -> CartTotals {
    items
        .iter()
        .fold(CartTotals::default(), |totals, item| CartTotals {
            total: totals.total.saturating_add(item.line_total()),
            item_count: totals.item_count.saturating_add(u64::from(item.quantity)),
        })
}

/// Like [`compute_totals`], but `None` when any line or sum overflows.
pub fn checked_totals(items: &[CartLineItem]) -> Option<CartTotals> {
    items.iter().try_fold(CartTotals::default(), |totals, item| {
        Some(CartTotals {
            total: totals.total.checked_add(item.checked_line_total()?)?,
            item_count: totals.item_count.checked_add(u64::from(item.quantity))?,
        })
    })
}

/// Round an amount to whole cents.
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert an amount to minor units (cents), saturating on overflow.
pub fn to_minor_units(amount: Decimal) -> i64 {
    round_to_cents(amount)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|minor| minor.to_i64())
        .unwrap_or(if amount.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        })
}

/// Render an amount as currency text, rounding to cents.
pub fn format_amount(amount: Decimal) -> String {
    Money::from_minor(to_minor_units(amount), iso::USD).to_string()
}

#[cfg(test)]
mod tests {
    use crate::products::{ProductId, ProductSnapshot};

    use super::*;

    fn line(id: i64, price: Decimal, quantity: u32) -> CartLineItem {
        CartLineItem::from_snapshot(&ProductSnapshot::new(ProductId::new(id), "item", price), quantity)
    }

    #[test]
    fn test_compute_totals() {
        let items = [
            line(1, Decimal::new(1999, 2), 2),
            line(2, Decimal::new(550, 2), 1),
        ];

        let totals = compute_totals(&items);

        assert_eq!(totals.total, Decimal::new(4548, 2));
        assert_eq!(totals.item_count, 3);
    }

    #[test]
    fn test_compute_totals_empty() {
        let totals = compute_totals(&[]);

        assert_eq!(totals.total, Decimal::ZERO);
        assert_eq!(totals.item_count, 0);
    }

    #[test]
    fn test_no_float_drift() {
        let items: Vec<_> = (1..=10).map(|id| line(id, Decimal::new(10, 2), 1)).collect();

        assert_eq!(compute_totals(&items).total, Decimal::ONE);
    }

    #[test]
    fn test_rounding_only_at_presentation() {
        let items = [line(1, Decimal::new(3333, 3), 3)];
        let totals = compute_totals(&items);

        assert_eq!(totals.total, Decimal::new(9999, 3));
        assert_eq!(round_to_cents(totals.total), Decimal::new(1000, 2));
        assert_eq!(to_minor_units(totals.total), 1000);
    }

    #[test]
    fn test_overflowing_totals_saturate() {
        let items = [
            line(1, Decimal::MAX, 1),
            line(2, Decimal::from_i128_with_scale(7 * 10_i128.pow(28), 0), 2),
        ];

        assert_eq!(compute_totals(&items).total, Decimal::MAX);
        assert_eq!(checked_totals(&items), None);
        assert_eq!(to_minor_units(Decimal::MAX), i64::MAX);
        assert_eq!(to_minor_units(Decimal::MIN), i64::MIN);
    }

    #[test]
    fn test_checked_totals_agree_when_in_range() {
        let items = [
            line(1, Decimal::new(1999, 2), 2),
            line(2, Decimal::new(550, 2), 1),
        ];

        assert_eq!(checked_totals(&items), Some(compute_totals(&items)));
    }

    #[test]
    fn test_display_total_matches_money() {
        let totals = compute_totals(&[line(1, Decimal::new(1250, 2), 2)]);

        assert_eq!(
            totals.display_total(),
            Money::from_minor(2500, iso::USD).to_string()
        );
    }
}
