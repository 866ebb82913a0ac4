//! Application context shared by a front end.
//!
//! Owns the two stores, the persisted storage, the API client with its 401
//! recovery installed, and the services built on them. Front ends create one
//! context at startup and pass clones around; nothing here is global.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, instrument, warn};

use crate::api::ApiClient;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::navigation::Navigator;
use crate::recovery::AuthRecovery;
use crate::services::{AccountService, AuthService, CatalogService, CheckoutService};
use crate::state::persistence::{CartPersistence, bootstrap_session, load_cart};
use crate::state::{CartAction, CartStore, SessionStore};
use crate::storage::Storage;

/// Application context.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppContext {
    inner: Arc<AppContextInner>,
}

struct AppContextInner {
    config: StorefrontConfig,
    api: ApiClient,
    session: Arc<SessionStore>,
    cart: Arc<CartStore>,
    storage: Storage,
    navigator: Arc<dyn Navigator>,
    auth: AuthService,
    account: AccountService,
    catalog: CatalogService,
    checkout: CheckoutService,
    started: AtomicBool,
}

impl AppContext {
    /// Wire up stores, API client and services.
    ///
    /// No I/O happens here; call [`AppContext::start`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: StorefrontConfig,
        storage: Storage,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        let session = Arc::new(SessionStore::default());
        let cart = Arc::new(CartStore::default().with_observer(CartPersistence::new(storage.clone())));

        api.install_unauthorized_handler(Arc::new(AuthRecovery::new(
            session.clone(),
            storage.clone(),
            navigator.clone(),
            config.auth_path.clone(),
        )));

        let auth = AuthService::new(
            api.clone(),
            session.clone(),
            storage.clone(),
            navigator.clone(),
            config.auth_path.clone(),
        );
        let account = AccountService::new(api.clone());
        let catalog = CatalogService::new(api.clone(), config.catalog_cache_ttl);
        let checkout = CheckoutService::new(api.clone(), cart.clone());

        Ok(Self {
            inner: Arc::new(AppContextInner {
                config,
                api,
                session,
                cart,
                storage,
                navigator,
                auth,
                account,
                catalog,
                checkout,
                started: AtomicBool::new(false),
            }),
        })
    }

    /// Restore the session and fetch the CSRF token.
    ///
    /// Runs once per context; later calls return `false` without doing
    /// anything. A failed CSRF fetch is logged, and requests then go out
    /// without the header.
    #[instrument(skip(self))]
    pub async fn start(&self) -> bool {
        if self
            .inner
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        bootstrap_session(&self.inner.session, self.inner.storage.as_ref());

        if let Err(e) = self.inner.api.fetch_csrf_token().await {
            warn!(error = %e, "Failed to fetch CSRF token");
        }

        info!(
            authenticated = self.inner.session.with_state(|s| s.is_authenticated()),
            "Storefront context started"
        );
        true
    }

    /// Hydrate the cart from storage.
    ///
    /// An absent or unreadable entry hydrates an empty cart. Returns the
    /// number of restored lines.
    pub fn restore_cart(&self) -> usize {
        let items = load_cart(self.inner.storage.as_ref())
            .unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable persisted cart");
                None
            })
            .unwrap_or_default();
        let lines = items.len();
        self.inner.cart.dispatch(CartAction::GetCartItems(items));
        lines
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the persisted storage.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.inner.storage
    }

    /// Get a reference to the navigator.
    #[must_use]
    pub fn navigator(&self) -> &dyn Navigator {
        self.inner.navigator.as_ref()
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn account(&self) -> &AccountService {
        &self.inner.account
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("api", &self.inner.api)
            .field("started", &self.inner.started.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use digi_core::{Email, User, UserId};
    use url::Url;

    use super::*;
    use crate::navigation::HistoryNavigator;
    use crate::state::persistence::save_user;
    use crate::storage::{KeyValueStore, MemoryStore, keys};

    fn context(base: &str, storage: Arc<MemoryStore>) -> AppContext {
        AppContext::new(
            StorefrontConfig::new(Url::parse(base).unwrap()),
            storage,
            Arc::new(HistoryNavigator::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_start_runs_once() {
        let mut server = mockito::Server::new_async().await;
        let csrf = server
            .mock("GET", "/csrf-token")
            .with_status(200)
            .with_body(r#"{"success":true,"message":"","result":"tok"}"#)
            .expect(1)
            .create_async()
            .await;

        let storage = Arc::new(MemoryStore::new());
        let user = User::new(UserId::new("u1"), Email::parse("a@b.com").unwrap());
        save_user(storage.as_ref(), &user).unwrap();

        let ctx = context(&server.url(), storage);
        assert!(ctx.start().await);
        assert!(!ctx.start().await);

        assert_eq!(ctx.session().state().user, Some(user));
        assert!(ctx.api().has_csrf_token());
        csrf.assert_async().await;
    }

    #[tokio::test]
    async fn test_csrf_failure_is_not_fatal() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/csrf-token")
            .with_status(500)
            .create_async()
            .await;

        let ctx = context(&server.url(), Arc::new(MemoryStore::new()));
        assert!(ctx.start().await);
        assert!(!ctx.api().has_csrf_token());
        assert!(ctx.session().state().user.is_none());
    }

    #[test]
    fn test_restore_cart_hydrates_without_writing() {
        let storage = Arc::new(MemoryStore::new());
        storage
            .set(
                keys::CART,
                r#"[{"skuId":"s1","quantity":1,"price":"29.99","productRef":{"id":"p1","name":"Office"}}]"#,
            )
            .unwrap();
        let before = storage.get(keys::CART).unwrap();

        let ctx = context("http://127.0.0.1:9", storage.clone());
        assert_eq!(ctx.restore_cart(), 1);
        assert_eq!(ctx.cart().state().len(), 1);
        assert_eq!(storage.get(keys::CART).unwrap(), before);
    }

    #[test]
    fn test_restore_corrupt_cart_is_empty() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(keys::CART, "not json").unwrap();

        let ctx = context("http://127.0.0.1:9", storage);
        assert_eq!(ctx.restore_cart(), 0);
        assert!(ctx.cart().state().is_empty());
    }
}
