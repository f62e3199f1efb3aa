use hardalum_core::Price;

use super::LineItem;

/// Derived money values for a set of line items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Price,
    /// The flat rate when the subtotal is positive, otherwise zero.
    pub shipping: Price,
    pub total: Price,
}

impl CartTotals {
    /// Compute totals for `items` with the given flat shipping rate.
    #[must_use]
    pub fn for_items(items: &[LineItem], shipping_flat_rate: Price) -> Self {
        let subtotal: Price = items.iter().map(LineItem::line_total).sum();
        let shipping = if subtotal.is_positive() {
            shipping_flat_rate
        } else {
            Price::ZERO
        };

        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }
}
