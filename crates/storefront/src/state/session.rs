//! Session reducer.

use serde::{Deserialize, Serialize};

use digi_core::User;

use super::{Action, Reducer};

/// The authenticated user, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub user: Option<User>,
}

impl SessionState {
    /// Whether a user is logged in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Session transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionAction {
    /// Set the user. The payload is taken as-is, `None` included.
    Login(Option<User>),
    /// Clear the user.
    Logout,
    /// Replace the user wholesale.
    UpdateUser(User),
}

impl Action for SessionAction {
    fn kind(&self) -> &'static str {
        match self {
            Self::Login(_) => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::UpdateUser(_) => "UPDATE_USER",
        }
    }
}

/// Reducer for [`SessionState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionReducer;

impl Reducer for SessionReducer {
    type State = SessionState;
    type Action = SessionAction;

    fn reduce(_state: &SessionState, action: &SessionAction) -> SessionState {
        match action {
            SessionAction::Login(user) => SessionState { user: user.clone() },
            SessionAction::Logout => SessionState { user: None },
            SessionAction::UpdateUser(user) => SessionState {
                user: Some(user.clone()),
            },
        }
    }
}
