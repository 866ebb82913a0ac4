//! Cart editing and checkout.
//!
//! All cart changes go through the [`CartStore`]; the persistence observer
//! installed on it mirrors every change to storage. This service keeps the
//! one-line-per-SKU rule by turning a repeated add into an update.

use std::sync::Arc;

use digi_core::{LineItem, Price, ProductRef, SkuId};
use tracing::{info, instrument};

use super::{Notice, ValidationError};
use crate::api::ApiClient;
use crate::api::types::Product;
use crate::error::Result;
use crate::state::cart::{subtotal, unit_count};
use crate::state::{CartAction, CartStore};

/// Totals shown next to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    pub lines: usize,
    pub units: u32,
    pub subtotal: Price,
}

/// Cart and checkout service.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    api: ApiClient,
    cart: Arc<CartStore>,
}

impl CheckoutService {
    #[must_use]
    pub const fn new(api: ApiClient, cart: Arc<CartStore>) -> Self {
        Self { api, cart }
    }

    /// Build a cart line for one SKU of a product.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a zero quantity or an unknown SKU.
    pub fn line_for(product: &Product, sku_id: &SkuId, quantity: u32) -> Result<LineItem> {
        if quantity == 0 {
            return Err(ValidationError::InvalidQuantity.into());
        }
        let sku = product.sku(sku_id).ok_or(ValidationError::UnknownSku)?;

        Ok(LineItem {
            sku_id: sku.id.clone(),
            quantity,
            price: sku.price,
            product_ref: ProductRef {
                id: product.id.clone(),
                name: product.product_name.clone(),
                image: product.image.clone(),
            },
        })
    }

    /// Current cart lines.
    #[must_use]
    pub fn items(&self) -> Vec<LineItem> {
        self.cart.state()
    }

    /// Line count, unit count and subtotal.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        self.cart.with_state(|items| CartSummary {
            lines: items.len(),
            units: unit_count(items),
            subtotal: subtotal(items),
        })
    }

    /// Add a line, or raise the quantity of the line with the same SKU.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a zero quantity.
    pub fn add(&self, item: LineItem) -> Result<()> {
        if item.quantity == 0 {
            return Err(ValidationError::InvalidQuantity.into());
        }

        // Read and update under one lock so concurrent adds of the same SKU
        // merge into a single line.
        self.cart.dispatch_with(|items| {
            let action = match items.iter().find(|line| line.sku_id == item.sku_id) {
                Some(line) => CartAction::UpdateCart(LineItem {
                    quantity: line.quantity.saturating_add(item.quantity),
                    ..item
                }),
                None => CartAction::AddToCart(item),
            };
            Some(action)
        });
        Ok(())
    }

    /// Set the quantity of a line. Returns `false` if the SKU is not in the cart.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a zero quantity.
    pub fn set_quantity(&self, sku_id: &SkuId, quantity: u32) -> Result<bool> {
        if quantity == 0 {
            return Err(ValidationError::InvalidQuantity.into());
        }

        Ok(self.cart.dispatch_with(|items| {
            items
                .iter()
                .find(|line| &line.sku_id == sku_id)
                .map(|line| {
                    CartAction::UpdateCart(LineItem {
                        quantity,
                        ..line.clone()
                    })
                })
        }))
    }

    /// Remove the line with this SKU.
    pub fn remove(&self, sku_id: &SkuId) {
        self.cart.dispatch(CartAction::RemoveFromCart {
            sku_id: sku_id.clone(),
        });
    }

    /// Empty the cart and delete its persisted copy.
    pub fn clear(&self) {
        self.cart.dispatch(CartAction::ClearCart);
    }

    /// Start a payment session for the cart and return its URL.
    ///
    /// The cart is kept; it is cleared once the payment is confirmed.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCart` without calling the API, otherwise the API failure.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<Notice<String>> {
        let items = self.cart.state();
        if items.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }

        let accepted = self.api.orders().checkout_session(&items).await?;
        let message = accepted.message.clone();
        let url = accepted.into_result()?.url().to_string();

        info!(lines = items.len(), "Checkout session created");
        Ok(Notice::new(message, url))
    }
}
