//! Authentication service.
//!
//! Account creation with OTP e-mail verification, cookie-session login,
//! password reset by e-mail, logout and profile updates. Passwords are
//! hashed by the backend; this side only validates form input.

mod error;

use std::sync::Arc;

pub use error::ValidationError;

use digi_core::{Email, User};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

use super::Notice;
use crate::api::ApiClient;
use crate::api::users::{Credentials, NewCustomer, ProfileUpdate};
use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::navigation::Navigator;
use crate::state::persistence::{forget_user, load_user, save_user};
use crate::state::{SessionAction, SessionStore};
use crate::storage::Storage;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Where a successful login lands.
const HOME_PATH: &str = "/";

/// Registration form.
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

/// Login form.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
}

/// Account settings form.
#[derive(Debug, Clone)]
pub struct ProfileForm {
    pub name: String,
    /// New password; `None` keeps the current one.
    pub password: Option<SecretString>,
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    session: Arc<SessionStore>,
    storage: Storage,
    navigator: Arc<dyn Navigator>,
    auth_path: String,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(
        api: ApiClient,
        session: Arc<SessionStore>,
        storage: Storage,
        navigator: Arc<dyn Navigator>,
        auth_path: impl Into<String>,
    ) -> Self {
        Self {
            api,
            session,
            storage,
            navigator,
            auth_path: auth_path.into(),
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a customer. The backend mails an OTP to verify the address.
    ///
    /// Returns the registered e-mail so the OTP form can be prefilled.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, otherwise the API failure.
    #[instrument(skip(self, form))]
    pub async fn register(&self, form: &RegisterForm) -> Result<Notice<Email>> {
        let customer = validate_registration(form)?;

        let accepted = self.api.users().register(&customer).await?;
        info!(email = %customer.email, "Customer registered");

        Ok(Notice::new(accepted.message, customer.email))
    }

    /// Mail a new OTP.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad address, otherwise the API failure.
    #[instrument(skip(self))]
    pub async fn resend_otp(&self, email: &str) -> Result<Notice> {
        let email = Email::parse(email).map_err(|_| ValidationError::InvalidEmail)?;

        let accepted = self.api.users().resend_otp(&email).await?;
        Ok(Notice::new(accepted.message, ()))
    }

    /// Verify an address with its OTP.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, otherwise the API failure.
    #[instrument(skip(self, otp))]
    pub async fn verify_otp(&self, otp: &str, email: &str) -> Result<Notice> {
        let email = Email::parse(email).map_err(|_| ValidationError::InvalidEmail)?;
        let otp = otp.trim();
        if otp.is_empty() {
            return Err(ValidationError::MissingOtp.into());
        }

        let accepted = self.api.users().verify_otp(otp, &email).await?;
        info!(email = %email, "Email verified");
        Ok(Notice::new(accepted.message, ()))
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Log in and start a session.
    ///
    /// On success the user is persisted, dispatched as `LOGIN`, attached to
    /// the Sentry scope, and the front end is sent home.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, otherwise the API failure.
    #[instrument(skip(self, form))]
    pub async fn login(&self, form: &LoginForm) -> Result<Notice<User>> {
        let credentials = validate_login(form)?;

        let accepted = self.api.users().login(&credentials).await?;
        let message = accepted.message.clone();
        let user = accepted.into_result()?.user;

        // The in-memory session is authoritative; a lost copy only costs
        // the restore on next start.
        if let Err(e) = save_user(self.storage.as_ref(), &user) {
            let event_id = sentry::capture_error(&e);
            warn!(error = %e, sentry_event_id = %event_id, "Failed to persist session");
        }

        self.session.dispatch(SessionAction::Login(Some(user.clone())));
        set_sentry_user(&user.id, Some(user.email.as_str()));
        add_breadcrumb("auth", "Logged in", None);
        info!(user_id = %user.id, "User logged in");

        self.navigator.navigate(HOME_PATH);
        Ok(Notice::new(message, user))
    }

    /// End the session remotely and locally.
    ///
    /// # Errors
    ///
    /// Returns the API failure; the local session is kept in that case.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<Notice> {
        let accepted = self.api.users().logout().await?;

        self.session.dispatch(SessionAction::Logout);
        forget_user(self.storage.as_ref())?;
        clear_sentry_user();
        add_breadcrumb("auth", "Logged out", None);
        info!("User logged out");

        self.navigator.navigate(&self.auth_path);
        Ok(Notice::new(accepted.message, ()))
    }

    /// Ask the backend to mail a new password.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad address, otherwise the API failure.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<Notice> {
        let email = Email::parse(email).map_err(|_| ValidationError::InvalidRecoveryEmail)?;

        let accepted = self.api.users().forgot_password(&email).await?;
        Ok(Notice::new(accepted.message, ()))
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Change the current user's name and optionally password.
    ///
    /// The updated user is dispatched as `UPDATE_USER` and, if a session is
    /// persisted, written back with the new name. A storage failure at that
    /// point is reported but does not fail the update.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input or without a session,
    /// otherwise the API failure.
    #[instrument(skip(self, form))]
    pub async fn update_profile(&self, form: &ProfileForm) -> Result<Notice<User>> {
        let current = self
            .session
            .with_state(|state| state.user.clone())
            .ok_or(ValidationError::NotLoggedIn)?;
        let update = validate_profile(form)?;

        let accepted = self
            .api
            .users()
            .update_name_password(&current.id, &update)
            .await?;

        let user = current.with_name(update.name);
        self.session.dispatch(SessionAction::UpdateUser(user.clone()));
        info!(user_id = %user.id, "Profile updated");

        // The backend already accepted the change; a stale persisted copy is
        // corrected by the next login.
        let persisted = load_user(self.storage.as_ref())
            .and_then(|stored| stored.map_or(Ok(()), |_| save_user(self.storage.as_ref(), &user)));
        if let Err(e) = persisted {
            let event_id = sentry::capture_error(&e);
            warn!(error = %e, sentry_event_id = %event_id, "Failed to persist updated profile");
        }

        Ok(Notice::new(accepted.message, user))
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("api", &self.api)
            .field("auth_path", &self.auth_path)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Validation
// =============================================================================

fn password_len(password: &SecretString) -> usize {
    password.expose_secret().chars().count()
}

/// Registration rules, checked in form order.
fn validate_registration(form: &RegisterForm) -> std::result::Result<NewCustomer, ValidationError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(ValidationError::InvalidName);
    }

    let email = Email::parse(&form.email).map_err(|_| ValidationError::InvalidEmail)?;

    if form.password.expose_secret() != form.confirm_password.expose_secret() {
        return Err(ValidationError::PasswordMismatch);
    }

    if password_len(&form.password) < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }

    Ok(NewCustomer {
        name: name.to_string(),
        email,
        password: form.password.clone(),
    })
}

fn validate_login(form: &LoginForm) -> std::result::Result<Credentials, ValidationError> {
    if form.email.is_empty() || form.password.expose_secret().is_empty() {
        return Err(ValidationError::MissingCredentials);
    }

    let email = Email::parse(&form.email).map_err(|_| ValidationError::InvalidEmail)?;

    if password_len(&form.password) < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::LoginPasswordTooShort);
    }

    Ok(Credentials {
        email,
        password: form.password.clone(),
    })
}

fn validate_profile(form: &ProfileForm) -> std::result::Result<ProfileUpdate, ValidationError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(ValidationError::InvalidName);
    }

    // An empty password field means "keep the current one"
    let password = form
        .password
        .as_ref()
        .filter(|password| !password.expose_secret().is_empty());
    if let Some(password) = password
        && password_len(password) < MIN_PASSWORD_LENGTH
    {
        return Err(ValidationError::PasswordTooShort);
    }

    Ok(ProfileUpdate {
        name: name.to_string(),
        password: password.cloned(),
    })
}
