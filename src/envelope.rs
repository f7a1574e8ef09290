//! JSON response envelopes and request-body decoding.

use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::validation::{RuleSet, Validate};

/// Largest request body `decode_body` accepts.
pub const MAX_BODY_BYTES: usize = 1_048_578;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessEnvelope<T> {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub message: String,
    pub status: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<T>,
}

impl<T> SuccessEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            message: "success".into(),
            status: "success".into(),
            code: StatusCode::OK.as_u16(),
            data: Some(data),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub code: u16,
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub error: String,
}

impl From<&ApiError> for ErrorEnvelope {
    fn from(err: &ApiError) -> Self {
        let status = err.status_code();
        let (message, error) = match err {
            ApiError::Validation(_) => ("Bad user input", "Validation Failure".to_string()),
            ApiError::Query(_) | ApiError::Json(_) | ApiError::MissingRouteParams => {
                ("Bad user input", err.to_string())
            }
            ApiError::Unauthorized(_) => ("Not authorized", err.to_string()),
            ApiError::NotFound(_) => ("No documents found!", err.to_string()),
            ApiError::PayloadTooLarge { .. } => ("Payload too large", err.to_string()),
            ApiError::Http(_) | ApiError::UnexpectedStatus(_) => ("Network Error!", err.to_string()),
            ApiError::Config(_) => ("Internal Server Error!", err.to_string()),
        };
        Self {
            code: status.as_u16(),
            status: "Failed to fetch".into(),
            message: message.into(),
            error,
        }
    }
}

/// Serializes an error envelope, logging the failure.
///
/// `context` is an optional note from the handler that is logged alongside the error.
#[must_use]
pub fn error_response(err: &ApiError, context: Option<&str>) -> (StatusCode, String) {
    if let Some(ctx) = context {
        log::error!("{ctx}: {err}");
    } else {
        log::debug!("request failed: {err}");
    }
    let env = ErrorEnvelope::from(err);
    let body = serde_json::to_string(&env).unwrap_or_else(|e| {
        log::error!("json encoding failed: {e}");
        String::new()
    });
    (err.status_code(), body)
}

/// Serializes a success envelope around `data`.
///
/// # Errors
/// Returns `ApiError::Json` if `data` cannot be serialized.
pub fn success_response<T: Serialize>(
    data: T,
    message: Option<&str>,
) -> Result<(StatusCode, String), ApiError> {
    let mut env = SuccessEnvelope::new(data);
    if let Some(m) = message {
        env = env.with_message(m);
    }
    Ok((StatusCode::OK, serde_json::to_string(&env)?))
}

/// Decodes a JSON body and validates it.
///
/// # Errors
/// `PayloadTooLarge` over [`MAX_BODY_BYTES`], `Json` on malformed input,
/// `Validation` when a rule fails.
pub fn decode_body<T>(body: &[u8], rules: &RuleSet) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    if body.len() > MAX_BODY_BYTES {
        return Err(ApiError::PayloadTooLarge { limit: MAX_BODY_BYTES });
    }
    let value: T = serde_json::from_slice(body)?;
    value.validate(rules)?;
    Ok(value)
}
