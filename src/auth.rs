//! Bearer-token authentication delegated to a remote validation service.

use bson::Bson;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::client::HttpClient;
use crate::config::ServiceConfig;
use crate::errors::ApiError;
use crate::query::{FilterTerm, Filters};

const BEARER_PREFIX: &str = "Bearer ";

/// The authenticated caller, attached to the request by the enclosing HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserContext {
    pub user: ObjectId,
}

impl UserContext {
    #[must_use]
    pub fn user_hex(&self) -> String {
        self.user.to_hex()
    }

    /// Ownership scoping for [`crate::query::merge`]: `{ field: <user id> }`.
    #[must_use]
    pub fn scope(&self, field: &str) -> Filters {
        [(field.to_string(), FilterTerm::Value(Bson::ObjectId(self.user)))].into()
    }
}

/// Resolves a token to the user id it was issued for. An empty id means the token is not valid.
pub trait TokenValidator {
    fn validate(&self, token: &str) -> impl Future<Output = Result<String, ApiError>> + Send;
}

#[derive(Debug, Serialize)]
struct ValidateTokenRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ValidateTokenResponse {
    #[serde(default)]
    user_id: String,
}

/// Validates tokens by POSTing `{ "token": ... }` to the configured auth service.
#[derive(Debug, Clone)]
pub struct RemoteTokenValidator {
    client: HttpClient,
    url: String,
}

impl RemoteTokenValidator {
    #[must_use]
    pub fn new(client: HttpClient, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }

    /// # Errors
    /// Returns `ApiError::Config` when the auth service URL or endpoint is not configured.
    pub fn from_config(cfg: &ServiceConfig) -> Result<Self, ApiError> {
        Ok(Self::new(HttpClient::from_config(cfg)?, cfg.validate_token_url()?))
    }
}

impl TokenValidator for RemoteTokenValidator {
    async fn validate(&self, token: &str) -> Result<String, ApiError> {
        let res: ValidateTokenResponse =
            self.client.post_json(&self.url, &ValidateTokenRequest { token }).await?;
        Ok(res.user_id)
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// # Errors
/// `Unauthorized("auth header missing")` or `Unauthorized("invalid auth header")`.
pub fn bearer_token(header: Option<&str>) -> Result<&str, ApiError> {
    let header = header
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("auth header missing".into()))?;
    header
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| ApiError::Unauthorized("invalid auth header".into()))
}

#[derive(Debug, Clone)]
pub struct Authenticator<V> {
    validator: V,
}

impl<V: TokenValidator> Authenticator<V> {
    pub const fn new(validator: V) -> Self {
        Self { validator }
    }

    /// Authenticates a request from its `Authorization` header value.
    ///
    /// # Errors
    /// `ApiError::Unauthorized` for a missing or malformed header, a token the
    /// service rejects, or a user id that is not a valid identifier.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<UserContext, ApiError> {
        let token = bearer_token(authorization)?;
        let user_id = match self.validator.validate(token).await {
            Ok(id) if !id.is_empty() => id,
            Ok(_) => return Err(ApiError::Unauthorized("invalid token".into())),
            Err(e) => {
                log::warn!("token validation failed: {e}");
                return Err(ApiError::Unauthorized("invalid token".into()));
            }
        };
        let user = ObjectId::parse_str(&user_id)
            .map_err(|_| ApiError::Unauthorized("invalid objectid".into()))?;
        Ok(UserContext { user })
    }
}
