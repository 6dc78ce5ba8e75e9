use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentApiError {
    /// A privileged parameter was set but the client has no bearer token.
    #[error("no bearer token configured for a request that requires one")]
    MissingCredential,

    #[error("malformed URL {url:?}: {reason}")]
    MalformedUrl { url: String, reason: String },

    /// The server answered 2xx but the body broke the API contract.
    #[error("malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error("HTTP error {status}: {message}")]
    Http {
        status: u16,
        message: String,
        /// Parsed error body, when the server sent JSON.
        body: Option<serde_json::Value>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("no identifiers given")]
    EmptyIdentifiers,
}

impl ContentApiError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub(crate) fn malformed_url(url: &str, reason: impl ToString) -> Self {
        Self::MalformedUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed_response(url: &str, reason: impl ToString) -> Self {
        Self::MalformedResponse {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ContentApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_for_http_errors() {
        let err = ContentApiError::Http {
            status: 404,
            message: "not found".into(),
            body: None,
        };
        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());

        assert_eq!(ContentApiError::MissingCredential.status(), None);
        assert!(!ContentApiError::Transport("refused".into()).is_not_found());
    }

    #[test]
    fn test_display_messages() {
        let err = ContentApiError::Http {
            status: 503,
            message: "unavailable".into(),
            body: None,
        };
        assert_eq!(err.to_string(), "HTTP error 503: unavailable");

        let err = ContentApiError::malformed_url("::", "relative URL without a base");
        assert_eq!(
            err.to_string(),
            "malformed URL \"::\": relative URL without a base"
        );
    }
}
