//! Order and order item models
//!
//! An order owns an ordered set of items; each item's `files` column is a
//! JSON array of [`FileRef`] and is the authoritative record of which stored
//! upload files are claimed. The recovery job's orphan test is defined
//! purely in terms of that column.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Order lifecycle states (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Draft,
    Pending,
    Processing,
    Completed,
    Cancelled,
    /// Needs operator attention; used for system-generated recovery orders
    OnHold,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Draft,
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::OnHold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "DRAFT",
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::OnHold => "ON_HOLD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub status: String,
    pub customer_name: String,
    pub customer_first_name: Option<String>,
    pub customer_last_name: Option<String>,
    pub customer_phone: String,
    pub customer_email: String,
    pub delivery_method: String,
    pub total_amount: f64,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order item row
///
/// `options` and `files` are JSON text columns, matching what the
/// storefront client submits at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub item_type: String,
    pub name: String,
    pub quantity: i64,
    pub price: f64,
    pub subtotal: f64,
    pub options: String,
    pub files: String,
}

/// Reference to a stored upload file, as serialized into `order_item.files`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRef {
    /// Client-side filename at upload time
    pub original: String,
    /// Path relative to the upload root, `<orderNumber>/<storedName>`
    pub server: String,
}

/// New order payload (checkout or system-generated)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_name: String,
    #[serde(default)]
    pub customer_first_name: Option<String>,
    #[serde(default)]
    pub customer_last_name: Option<String>,
    pub customer_phone: String,
    pub customer_email: String,
    #[serde(default = "default_delivery_method")]
    pub delivery_method: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<NewOrderItem>,
}

fn default_delivery_method() -> String {
    "PICKUP".to_string()
}

/// New order item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub name: String,
    /// When set, the server reprices the line from the volume-discount
    /// ladder and the submitted price/subtotal are ignored
    #[serde(default)]
    pub print_size_id: Option<i64>,
    pub quantity: i64,
    pub price: f64,
    pub subtotal: f64,
    #[serde(default)]
    pub options: Option<serde_json::Value>,
    #[serde(default)]
    pub files: Vec<FileRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("SHIPPED"), None);
    }
}
