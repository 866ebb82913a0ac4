//! Order history of the logged-in customer.

use digi_core::{Order, OrderId, OrderStatus};
use tracing::instrument;

use super::Notice;
use crate::api::ApiClient;
use crate::error::Result;

/// Account pages service.
#[derive(Debug, Clone)]
pub struct AccountService {
    api: ApiClient,
}

impl AccountService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// List orders, optionally only those in `status`.
    ///
    /// A response without `result` is treated as no orders.
    ///
    /// # Errors
    ///
    /// Returns the API failure.
    #[instrument(skip(self))]
    pub async fn orders(&self, status: Option<OrderStatus>) -> Result<Notice<Vec<Order>>> {
        let accepted = self.api.orders().list(status).await?;
        Ok(Notice::new(
            accepted.message,
            accepted.result.unwrap_or_default(),
        ))
    }

    /// One order with its line details.
    ///
    /// # Errors
    ///
    /// Returns the API failure, or `MissingResult` if the order is absent.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order(&self, id: &OrderId) -> Result<Notice<Order>> {
        let accepted = self.api.orders().get(id).await?;
        let message = accepted.message.clone();
        Ok(Notice::new(message, accepted.into_result()?))
    }
}
