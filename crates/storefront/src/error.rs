//! Unified error handling with Sentry integration.
//!
//! Every service operation returns `Result<T, AppError>`. Front ends turn an
//! error into notifications with [`AppError::messages`] and skip errors for
//! which [`AppError::is_silent`] holds.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::ValidationError;
use crate::storage::StorageError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Form input rejected before any network call.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// API call failed or was rejected.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Persisted store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Messages to show the user, one notification each.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation(err) => vec![err.to_string()],
            Self::Api(err) => err.messages(),
            Self::Storage(_) => vec!["Could not access local storage".to_string()],
            Self::Config(err) => vec![err.to_string()],
        }
    }

    /// Whether the error was already handled and needs no notification.
    ///
    /// True for a request whose 401 was absorbed by the recovery sequence.
    #[must_use]
    pub const fn is_silent(&self) -> bool {
        matches!(self, Self::Api(ApiError::SessionExpired))
    }

    /// Capture unexpected failures to Sentry.
    ///
    /// User mistakes and API business rejections are not reported.
    pub fn report(&self) {
        let unexpected = match self {
            Self::Api(err) => err.is_unexpected(),
            Self::Storage(_) => true,
            Self::Validation(_) | Self::Config(_) => false,
        };

        if unexpected {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront operation failed"
            );
        } else {
            tracing::debug!(error = %self, "Storefront operation rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after a successful login to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of dispatched
/// actions and API calls leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    sentry::add_breadcrumb(breadcrumb(category, message, data));
}

fn breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) -> sentry::Breadcrumb {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    breadcrumb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Validation(ValidationError::PasswordMismatch);
        assert_eq!(err.to_string(), "Validation error: Password does not match");
    }

    #[test]
    fn test_messages_follow_taxonomy() {
        let err = AppError::Validation(ValidationError::InvalidName);
        assert_eq!(err.messages(), vec!["Invalid name".to_string()]);

        let err = AppError::Api(ApiError::Rejected {
            messages: vec!["Email already registered".to_string()],
        });
        assert_eq!(err.messages(), vec!["Email already registered".to_string()]);

        let err = AppError::Api(ApiError::Http {
            status: 500,
            messages: vec![],
        });
        assert_eq!(
            err.messages(),
            vec!["Request failed with status code 500".to_string()]
        );
    }

    #[test]
    fn test_only_absorbed_401_is_silent() {
        assert!(AppError::Api(ApiError::SessionExpired).is_silent());
        assert!(
            !AppError::Api(ApiError::Unauthorized {
                messages: vec!["Unauthorized".to_string()]
            })
            .is_silent()
        );
        assert!(!AppError::Validation(ValidationError::InvalidName).is_silent());
    }

    #[test]
    fn test_breadcrumb_carries_data() {
        let crumb = breadcrumb("state", "ADD_TO_CART", Some(&[("sku_id", "s1")]));
        assert_eq!(crumb.category.as_deref(), Some("state"));
        assert_eq!(crumb.message.as_deref(), Some("ADD_TO_CART"));
        assert_eq!(
            crumb.data.get("sku_id"),
            Some(&serde_json::Value::String("s1".to_string()))
        );

        assert!(breadcrumb("auth", "Logged out", None).data.is_empty());
    }
}
