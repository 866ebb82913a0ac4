//! Session user record.

use serde::{Deserialize, Serialize};

use crate::{Email, UserId, UserRole};

/// The authenticated user as held by the session store.
///
/// This is the record returned by the login endpoint under `result.user`
/// and persisted under the `_digi_user` key. The backend keys its documents
/// with `_id` and reports the role as `type`; both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

impl User {
    /// Create a user with only the mandatory fields set.
    #[must_use]
    pub const fn new(id: UserId, email: Email) -> Self {
        Self {
            id,
            email,
            name: None,
            role: None,
        }
    }

    /// Builder-style name setter.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name to greet the user with, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.email.as_str())
    }
}
