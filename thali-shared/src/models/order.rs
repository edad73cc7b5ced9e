/// Order and transaction documents
///
/// These records live inside the `orders` and `transactions` JSONB columns
/// of the `users` table. No endpoint writes them yet; they define the
/// document shape that clients and future order flows agree on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

/// An order placed by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub products: Vec<OrderItem>,

    pub total_amount: f64,

    /// Free-form status, "pending" until something moves it on
    #[serde(default = "default_order_status")]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_order_status() -> String {
    "pending".to_string()
}

impl Order {
    /// Creates a pending order from line items, totalling their prices
    pub fn new(products: Vec<OrderItem>) -> Self {
        let total_amount = products
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum();

        Self {
            products,
            total_amount,
            status: default_order_status(),
            otp: None,
            transaction_id: None,
            created_at: Utc::now(),
        }
    }
}

/// Direction of a money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Payment,
    Refund,
}

/// Outcome of a money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Failed,
}

/// A payment or refund recorded against a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub amount: f64,

    #[serde(rename = "type")]
    pub kind: TransactionType,

    pub status: TransactionStatus,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}
