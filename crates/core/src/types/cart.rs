//! Cart line items.

use serde::{Deserialize, Serialize};

use crate::{Price, ProductId, SkuId};

/// One SKU-quantity-price entry in a cart.
///
/// Carts hold at most one line per `sku_id`; quantity changes go through an
/// update of the existing line, never a second add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub sku_id: SkuId,
    pub quantity: u32,
    pub price: Price,
    pub product_ref: ProductRef,
}

impl LineItem {
    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// The product a line item was added from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
