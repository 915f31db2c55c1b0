use thiserror::Error;

use crate::types::UserError;

/// Coarse classification of a [`ShopifyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Request-level failure or non-2xx HTTP status.
    Transport,
    /// The payload did not have the expected shape, or GraphQL reported `errors`.
    Protocol,
    /// The API rejected mutation input via `userErrors`.
    Validation,
}

#[derive(Debug, Error)]
pub enum ShopifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("rate limited by {host} (retry after {retry_after_secs}s)")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("GraphQL errors: {}", .messages.join("; "))]
    Graphql { messages: Vec<String> },

    #[error("missing field `{path}` in {context}")]
    MissingField { context: String, path: String },

    #[error("{operation} rejected: {}", format_user_errors(.errors))]
    UserErrors {
        operation: String,
        errors: Vec<UserError>,
    },

    #[error("pagination limit reached for {url}: exceeded {max_pages} pages")]
    PaginationLimit { url: String, max_pages: usize },

    #[error("invalid store URL \"{url}\": {reason}")]
    InvalidStoreUrl { url: String, reason: String },
}

impl ShopifyError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShopifyError::Http(_)
            | ShopifyError::UnexpectedStatus { .. }
            | ShopifyError::RateLimited { .. }
            | ShopifyError::InvalidStoreUrl { .. } => ErrorKind::Transport,
            ShopifyError::Deserialize { .. }
            | ShopifyError::Graphql { .. }
            | ShopifyError::MissingField { .. }
            | ShopifyError::PaginationLimit { .. } => ErrorKind::Protocol,
            ShopifyError::UserErrors { .. } => ErrorKind::Validation,
        }
    }

    pub(crate) fn missing(context: &str, path: &str) -> Self {
        ShopifyError::MissingField {
            context: context.to_owned(),
            path: path.to_owned(),
        }
    }
}

fn format_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(UserError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_are_transport() {
        let err = ShopifyError::UnexpectedStatus {
            status: 500,
            url: "https://x/orders.json".to_owned(),
            body: "boom".to_owned(),
        };
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn graphql_errors_are_protocol() {
        let err = ShopifyError::Graphql {
            messages: vec!["Throttled".to_owned(), "Field missing".to_owned()],
        };
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(err.to_string(), "GraphQL errors: Throttled; Field missing");
    }

    #[test]
    fn user_errors_are_validation() {
        let err = ShopifyError::UserErrors {
            operation: "customerCreate".to_owned(),
            errors: vec![UserError {
                field: Some(vec!["email".to_owned()]),
                message: "Email has already been taken".to_owned(),
            }],
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(
            err.to_string(),
            "customerCreate rejected: email || Email has already been taken"
        );
    }
}
