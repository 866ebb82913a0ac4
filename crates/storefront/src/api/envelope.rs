//! The uniform `{success, message, result}` response envelope.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::ApiError;

/// Message field of the envelope.
///
/// Validation failures arrive as an array of messages, everything else as a
/// single string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiMessage {
    One(String),
    Many(Vec<String>),
}

impl Default for ApiMessage {
    fn default() -> Self {
        Self::One(String::new())
    }
}

impl ApiMessage {
    /// All non-empty messages.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(message) => vec![message],
            Self::Many(messages) => messages,
        }
        .into_iter()
        .filter(|message| !message.is_empty())
        .collect()
    }
}

impl fmt::Display for ApiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(message) => f.write_str(message),
            Self::Many(messages) => f.write_str(&messages.join("; ")),
        }
    }
}

/// Response envelope returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: ApiMessage,
    pub result: Option<T>,
}

/// A successful envelope, unwrapped.
#[derive(Debug, Clone)]
pub struct Accepted<T> {
    /// Message to show the user.
    pub message: String,
    pub result: Option<T>,
}

impl<T> Envelope<T> {
    /// Turn `success: false` into [`ApiError::Rejected`].
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with the API's messages when the
    /// envelope reports failure.
    pub fn into_accepted(self) -> Result<Accepted<T>, ApiError> {
        if self.success {
            Ok(Accepted {
                message: self.message.to_string(),
                result: self.result,
            })
        } else {
            Err(ApiError::Rejected {
                messages: self.message.into_vec(),
            })
        }
    }
}

impl<T> Accepted<T> {
    /// The result, which the endpoint is documented to return.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingResult` if the response carried none.
    pub fn into_result(self) -> Result<T, ApiError> {
        self.result.ok_or(ApiError::MissingResult)
    }
}
