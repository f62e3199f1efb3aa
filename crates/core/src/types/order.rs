//! Placed orders as listed in a user's order history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OrderId, OrderStatus, Price};

/// A single line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub quantity: i64,
    pub price_at_purchase: Price,
    pub product_name: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
}

impl OrderItem {
    /// Price paid for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price_at_purchase.times(self.quantity)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_date: DateTime<Utc>,
    pub total_amount: Price,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub billing_address: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_history_entry() {
        let order: Order = serde_json::from_str(
            r#"{
                "id": 12,
                "order_date": "2025-06-02T08:30:00.000Z",
                "total_amount": "95.00",
                "status": "processing",
                "shipping_address": "1 Main St, Springfield, 12345",
                "billing_address": "1 Main St, Springfield, 12345",
                "items": [
                    {
                        "quantity": 2,
                        "price_at_purchase": "40.00",
                        "product_name": "Round Aluminum Tubing",
                        "imageUrl": "https://img/555.jpg",
                        "dimension": "1/2\" Diameter"
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.unit_count(), 2);
        assert_eq!(order.items[0].line_total(), Price::from_cents(8000));
        assert_eq!(order.total_amount, Price::from_cents(9500));
    }
}
