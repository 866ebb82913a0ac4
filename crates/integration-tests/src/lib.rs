//! End-to-end tests for the Digi storefront client.
//!
//! Every test runs a full [`AppContext`] (stores, persistence observers,
//! API client with the 401 recovery installed) against a `mockito` server
//! standing in for the REST API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p digi-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_recovery` - 401 interception and recovery
//! - `cart_persistence` - cart mirroring and hydration
//! - `auth_flow` - registration, login and CSRF bootstrap

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use digi_core::{Email, LineItem, Price, ProductId, ProductRef, SkuId, User, UserId};
use digi_storefront::AppContext;
use digi_storefront::config::StorefrontConfig;
use digi_storefront::navigation::HistoryNavigator;
use digi_storefront::state::SessionAction;
use digi_storefront::state::persistence::save_user;
use digi_storefront::storage::{MemoryStore, Storage};
use mockito::{Mock, ServerGuard};
use url::Url;

/// Body the API sends with a 401.
pub const UNAUTHORIZED_BODY: &str = r#"{"success":false,"message":"Unauthorized"}"#;

/// A storefront context wired to a mock API.
pub struct TestContext {
    pub server: ServerGuard,
    pub ctx: AppContext,
    pub storage: Storage,
    pub navigator: Arc<HistoryNavigator>,
}

impl TestContext {
    /// Context over an in-memory store.
    pub async fn new() -> Self {
        Self::with_storage(Arc::new(MemoryStore::new())).await
    }

    /// Context over the given store.
    ///
    /// # Panics
    ///
    /// Panics if the mock server URL is not a valid base URL.
    pub async fn with_storage(storage: Storage) -> Self {
        let server = mockito::Server::new_async().await;
        let navigator = Arc::new(HistoryNavigator::new());
        let base = Url::parse(&server.url()).expect("mock server URL");

        let ctx = AppContext::new(StorefrontConfig::new(base), storage.clone(), navigator.clone())
            .expect("context");

        Self {
            server,
            ctx,
            storage,
            navigator,
        }
    }

    /// Persist and log in a user, as after a successful login.
    ///
    /// # Panics
    ///
    /// Panics if the store cannot be written.
    pub fn seed_user(&self) -> User {
        let user = user();
        save_user(self.storage.as_ref(), &user).expect("persist user");
        self.ctx
            .session()
            .dispatch(SessionAction::Login(Some(user.clone())));
        user
    }

    /// Mock `PUT /users/logout` answering `status`, expected `hits` times.
    pub async fn mock_logout(&mut self, status: usize, hits: usize) -> Mock {
        let body = if status == 200 {
            r#"{"success":true,"message":"Logged out"}"#
        } else {
            UNAUTHORIZED_BODY
        };
        self.server
            .mock("PUT", "/users/logout")
            .with_status(status)
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    /// Mock a 401 on `GET path`.
    pub async fn mock_unauthorized_get(&mut self, path: &str) -> Mock {
        self.server
            .mock("GET", path)
            .with_status(401)
            .with_body(UNAUTHORIZED_BODY)
            .create_async()
            .await
    }
}

/// The user every test logs in as.
///
/// # Panics
///
/// Never; the address is valid.
#[must_use]
pub fn user() -> User {
    User::new(
        UserId::new("u1"),
        Email::parse("jane@example.com").expect("valid email"),
    )
    .with_name("Jane")
}

/// A cart line for `sku`.
#[must_use]
pub fn line(sku: &str) -> LineItem {
    LineItem {
        sku_id: SkuId::new(sku),
        quantity: 1,
        price: Price::from_paise(1_999),
        product_ref: ProductRef {
            id: ProductId::new(format!("product-{sku}")),
            name: format!("Product {sku}"),
            image: None,
        },
    }
}
