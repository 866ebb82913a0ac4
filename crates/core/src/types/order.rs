//! Orders as listed on the account page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OrderId, OrderStatus, Price};

/// A customer order.
///
/// Only the fields the account pages read are typed; everything else the
/// backend sends is preserved in `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Document id used in order detail URLs.
    #[serde(rename = "_id")]
    pub id: OrderId,
    /// Human-facing order number.
    pub order_id: String,
    pub order_date: DateTime<Utc>,
    pub order_status: OrderStatus,
    /// The backend historically misspells this field as `paymnetInfo`.
    #[serde(alias = "paymnetInfo")]
    pub payment_info: PaymentInfo,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// Payment summary of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub payment_amount: Price,
}
