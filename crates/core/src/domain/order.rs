use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One matched order line. `product_name` is the catalog canonical name,
/// never the raw text the customer typed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub line_total: Decimal,
}

impl OrderLine {
    pub fn new(product_name: impl Into<String>, unit_price: Decimal, quantity: u32) -> Self {
        let quantity = quantity.max(1);
        Self {
            product_name: product_name.into(),
            unit_price,
            quantity,
            line_total: unit_price * Decimal::from(quantity),
        }
    }
}

/// Ephemeral draft produced by the matcher. Built fresh per parse call and
/// handed to the external order store on confirmation; never persisted here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub lines: Vec<OrderLine>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

impl OrderDraft {
    /// The delivery fee applies only when there is something to deliver; an
    /// empty draft totals to zero.
    pub fn from_lines(lines: Vec<OrderLine>, delivery_fee: Decimal) -> Self {
        let subtotal: Decimal = lines.iter().map(|line| line.line_total).sum();
        let delivery_fee = if lines.is_empty() { Decimal::ZERO } else { delivery_fee };
        Self { total: subtotal + delivery_fee, lines, subtotal, delivery_fee }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{OrderDraft, OrderLine};

    #[test]
    fn line_total_is_unit_price_times_quantity() {
        let line = OrderLine::new("Cappuccino", Decimal::new(350, 2), 2);
        assert_eq!(line.line_total, Decimal::new(700, 2));
    }

    #[test]
    fn zero_quantity_is_clamped_to_one() {
        let line = OrderLine::new("Croissant", Decimal::new(225, 2), 0);
        assert_eq!(line.quantity, 1);
        assert_eq!(line.line_total, Decimal::new(225, 2));
    }

    #[test]
    fn draft_totals_add_the_delivery_fee() {
        let draft = OrderDraft::from_lines(
            vec![
                OrderLine::new("Cappuccino", Decimal::new(350, 2), 2),
                OrderLine::new("Croissant", Decimal::new(225, 2), 1),
            ],
            Decimal::new(150, 2),
        );

        assert_eq!(draft.subtotal, Decimal::new(925, 2));
        assert_eq!(draft.total, Decimal::new(1075, 2));
    }

    #[test]
    fn empty_draft_carries_no_delivery_fee() {
        let draft = OrderDraft::from_lines(Vec::new(), Decimal::new(150, 2));
        assert!(draft.is_empty());
        assert_eq!(draft.total, Decimal::ZERO);
    }
}
