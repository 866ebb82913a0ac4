//! Form validation errors.
//!
//! The display text of each variant is the notification shown to the user.

use thiserror::Error;

/// Input rejected before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid name")]
    InvalidName,

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Password does not match")]
    PasswordMismatch,

    /// Registration and profile forms.
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    /// Login form with an empty field.
    #[error("Invalid email or password")]
    MissingCredentials,

    /// Login form.
    #[error("Password is too short. Minimum 6 characters")]
    LoginPasswordTooShort,

    #[error("Invalid OTP")]
    MissingOtp,

    /// Forgot-password form.
    #[error("Invalid email. Please enter a valid email and we will send you a password")]
    InvalidRecoveryEmail,

    /// Operation requires a logged-in user.
    #[error("Please log in to continue")]
    NotLoggedIn,

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    /// Cart line for a SKU the product does not offer.
    #[error("This option is no longer available")]
    UnknownSku,
}
