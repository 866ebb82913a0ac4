//! User-facing flows built on the API client and the stores.
//!
//! # Services
//!
//! - `auth` - register, OTP verification, login, password reset, logout,
//!   profile update
//! - `account` - order history
//! - `catalog` - landing page and product detail, cached
//! - `checkout` - cart editing and payment session
//!
//! Every flow validates its input first and returns [`crate::AppError`] on
//! failure; on success it returns a [`Notice`] carrying the message the
//! front end should show.

pub mod account;
pub mod auth;
pub mod catalog;
pub mod checkout;

pub use account::AccountService;
pub use auth::{AuthService, LoginForm, ProfileForm, RegisterForm, ValidationError};
pub use catalog::CatalogService;
pub use checkout::CheckoutService;

/// Outcome of a successful flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice<T = ()> {
    /// Success notification text; may be empty.
    pub message: String,
    pub value: T,
}

impl<T> Notice<T> {
    #[must_use]
    pub fn new(message: impl Into<String>, value: T) -> Self {
        Self {
            message: message.into(),
            value,
        }
    }
}
