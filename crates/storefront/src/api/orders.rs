//! Order endpoints.

use digi_core::{LineItem, Order, OrderId, OrderStatus};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ApiClient, ApiResult, Body, RequestOptions, segment};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutRequest<'a> {
    checkout_details: &'a [LineItem],
}

/// `result` of a checkout session request.
///
/// Older backends answer with the URL string, newer ones with an object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CheckoutSession {
    Url(String),
    Session { url: String },
}

impl CheckoutSession {
    /// URL of the hosted payment page.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) | Self::Session { url } => url,
        }
    }
}

/// Order endpoint group, borrowed from an [`ApiClient`].
#[derive(Debug, Clone, Copy)]
pub struct Orders<'a> {
    client: &'a ApiClient,
}

impl<'a> Orders<'a> {
    pub(super) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Start a payment session for the given cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn checkout_session(&self, items: &[LineItem]) -> ApiResult<CheckoutSession> {
        let body = Body::json(&CheckoutRequest {
            checkout_details: items,
        })?;
        self.client
            .send_to(Method::POST, "orders/checkout", body)
            .await?
            .into_accepted()
    }

    /// List the current user's orders, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self))]
    pub async fn list(&self, status: Option<OrderStatus>) -> ApiResult<Vec<Order>> {
        let query = status.map(|status| ("status", status.as_str()));
        let url = self.client.endpoint_with_query("orders", query)?;
        self.client
            .request(Method::GET, url, Body::Empty, RequestOptions::default())
            .await?
            .into_accepted()
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get(&self, id: &OrderId) -> ApiResult<Order> {
        self.client
            .get(&format!("orders/{}", segment(id.as_str())))
            .await?
            .into_accepted()
    }
}
