//! Recovery from an authorization failure.
//!
//! When the API answers 401 to a request that is not itself part of a
//! recovery, [`AuthRecovery`] ends the remote session, clears the local
//! session and its persisted copy, and sends the user to the auth screen.

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::api::{ApiClient, ApiError, BoxFuture, RequestOptions, UnauthorizedHandler};
use crate::error::{add_breadcrumb, clear_sentry_user};
use crate::navigation::Navigator;
use crate::state::persistence::forget_user;
use crate::state::{SessionAction, SessionStore};
use crate::storage::Storage;

/// Logout-and-redirect sequence installed on the [`ApiClient`].
pub struct AuthRecovery {
    session: Arc<SessionStore>,
    storage: Storage,
    navigator: Arc<dyn Navigator>,
    auth_path: String,
}

impl AuthRecovery {
    #[must_use]
    pub fn new(
        session: Arc<SessionStore>,
        storage: Storage,
        navigator: Arc<dyn Navigator>,
        auth_path: impl Into<String>,
    ) -> Self {
        Self {
            session,
            storage,
            navigator,
            auth_path: auth_path.into(),
        }
    }

    /// Run the sequence once.
    ///
    /// The remote logout is tagged [`RequestOptions::retry`], so a 401 on it
    /// is returned here instead of starting another recovery.
    ///
    /// # Errors
    ///
    /// Returns the logout failure; local state is left untouched in that case.
    #[instrument(skip_all)]
    pub async fn recover(&self, client: &ApiClient) -> Result<(), ApiError> {
        add_breadcrumb("auth", "Session rejected by API", None);

        client.users().logout_with(RequestOptions::retry()).await?;

        self.session.dispatch(SessionAction::Logout);
        if let Err(e) = forget_user(self.storage.as_ref()) {
            let event_id = sentry::capture_error(&e);
            error!(
                error = %e,
                sentry_event_id = %event_id,
                "Failed to delete persisted session"
            );
        }
        clear_sentry_user();

        info!(path = %self.auth_path, "Session expired, redirecting to sign in");
        self.navigator.navigate(&self.auth_path);
        Ok(())
    }
}

impl UnauthorizedHandler for AuthRecovery {
    fn on_unauthorized<'a>(&'a self, client: &'a ApiClient) -> BoxFuture<'a, Result<(), ApiError>> {
        Box::pin(self.recover(client))
    }
}

impl std::fmt::Debug for AuthRecovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRecovery")
            .field("auth_path", &self.auth_path)
            .finish_non_exhaustive()
    }
}
