use http::StatusCode;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Why a typed schema value could not be coerced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldParseError {
    #[error("invalid integer: {0}")]
    Int(#[from] std::num::ParseIntError),

    #[error("invalid boolean literal: {0}")]
    Bool(String),

    #[error("invalid object id: {0}")]
    Id(String),

    #[error("invalid date (expected YYYY-MM-DD): {0}")]
    Date(#[from] chrono::ParseError),
}

/// Hard failures of a compile call. Any of these means no descriptor was produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid query parameter '{field}': {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("page requires limit")]
    PageRequiresLimit,

    #[error("invalid value for field '{field}': {source}")]
    InvalidField {
        field: String,
        #[source]
        source: FieldParseError,
    },
}

impl QueryError {
    /// The query parameter the error is about, when there is one.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidParameter { field, .. } | Self::InvalidField { field, .. } => Some(field),
            Self::PageRequiresLimit => Some("page"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("payload exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("unexpected status code: {0}")]
    UnexpectedStatus(u16),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("param is nil")]
    MissingRouteParams,
}

impl ApiError {
    /// HTTP status an enclosing handler should answer with.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Query(_)
            | Self::Json(_)
            | Self::Validation(_)
            | Self::MissingRouteParams => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Http(_) | Self::UnexpectedStatus(_) => StatusCode::BAD_GATEWAY,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
