//! API error types.

use thiserror::Error;

/// Errors that can occur when talking to the Digi REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error: {status} - {}", .messages.join("; "))]
    Http { status: u16, messages: Vec<String> },

    /// The API answered `success: false`.
    #[error("Request rejected: {}", .messages.join("; "))]
    Rejected { messages: Vec<String> },

    /// 401 that the recovery sequence could not absorb.
    #[error("Unauthorized: {}", .messages.join("; "))]
    Unauthorized { messages: Vec<String> },

    /// 401 absorbed by the recovery sequence: the user was logged out.
    #[error("Session expired")]
    SessionExpired,

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Decode(String),

    /// Request body could not be encoded.
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The CSRF bootstrap endpoint returned no token.
    #[error("CSRF Token not found")]
    MissingCsrfToken,

    /// A successful response carried no `result`.
    #[error("Response has no result")]
    MissingResult,
}

impl ApiError {
    /// User-facing messages for this error.
    ///
    /// Prefers the messages from the API's error body and falls back to the
    /// transport-level description.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Http { status, messages } => or_status(messages, *status),
            Self::Unauthorized { messages } => or_status(messages, 401),
            Self::Rejected { messages } if messages.is_empty() => {
                vec!["Request failed".to_string()]
            }
            Self::Rejected { messages } => messages.clone(),
            Self::SessionExpired => Vec::new(),
            other => vec![other.to_string()],
        }
    }

    /// Whether this failure points at a bug or an outage rather than a
    /// rejected request.
    #[must_use]
    pub fn is_unexpected(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status >= 500,
            Self::Rejected { .. } | Self::Unauthorized { .. } | Self::SessionExpired => false,
            Self::Transport(_)
            | Self::Decode(_)
            | Self::Encode(_)
            | Self::InvalidUrl(_)
            | Self::MissingCsrfToken
            | Self::MissingResult => true,
        }
    }
}

fn or_status(messages: &[String], status: u16) -> Vec<String> {
    if messages.is_empty() {
        vec![format!("Request failed with status code {status}")]
    } else {
        messages.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_messages() {
        let err = ApiError::Http {
            status: 422,
            messages: vec!["email is required".to_string(), "name is required".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "API error: 422 - email is required; name is required"
        );
        assert_eq!(err.messages().len(), 2);
        assert!(!err.is_unexpected());
    }

    #[test]
    fn test_fallback_messages() {
        assert_eq!(
            ApiError::Unauthorized { messages: vec![] }.messages(),
            vec!["Request failed with status code 401".to_string()]
        );
        assert!(ApiError::SessionExpired.messages().is_empty());
        assert_eq!(
            ApiError::MissingCsrfToken.messages(),
            vec!["CSRF Token not found".to_string()]
        );
    }

    #[test]
    fn test_server_errors_are_unexpected() {
        assert!(
            ApiError::Http {
                status: 502,
                messages: vec![]
            }
            .is_unexpected()
        );
        assert!(ApiError::Decode("eof".to_string()).is_unexpected());
    }
}
