use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::ApiError;

/// Service settings shared by the logger, HTTP client and auth layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// `production` switches logging to JSON.
    pub env: Option<String>,
    pub auth_service_url: Option<String>,
    pub auth_validate_endpoint: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub http_timeout_secs: Option<u64>,
}

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

impl ServiceConfig {
    /// Loads with the usual precedence: explicit > environment > TOML file > defaults.
    ///
    /// The file is `file` if given, else `$NEXUSQUERY_CONFIG`, else `./nexusquery.toml`.
    ///
    /// # Errors
    /// Returns `ApiError::Config` when a config file exists but cannot be read or parsed.
    pub fn load(explicit: Self, file: Option<&Path>) -> Result<Self, ApiError> {
        Self::load_with(explicit, file, |k| std::env::var(k).ok())
    }

    /// Like [`load`](Self::load) with an injectable environment lookup.
    ///
    /// # Errors
    /// Returns `ApiError::Config` when a config file exists but cannot be read or parsed.
    pub fn load_with<F>(explicit: Self, file: Option<&Path>, env: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = explicit;
        cfg.fill_from(Self::from_env(&env));

        let path = file
            .map(Path::to_path_buf)
            .or_else(|| env("NEXUSQUERY_CONFIG").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("nexusquery.toml"));
        if path.exists() {
            cfg.fill_from(Self::from_file(&path)?);
        }
        Ok(cfg)
    }

    fn from_env<F: Fn(&str) -> Option<String>>(env: &F) -> Self {
        Self {
            env: env("NEXUSQUERY_ENV"),
            auth_service_url: env("AUTH_SERVICE_URL"),
            auth_validate_endpoint: env("AUTH_VALIDATE_ENDPOINT"),
            log_dir: env("NEXUSQUERY_LOG_DIR").map(PathBuf::from),
            log_level: env("NEXUSQUERY_LOG_LEVEL"),
            http_timeout_secs: env("NEXUSQUERY_HTTP_TIMEOUT_SECS").and_then(|s| s.parse().ok()),
        }
    }

    /// # Errors
    /// Returns `ApiError::Config` if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, ApiError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| ApiError::Config(format!("read {}: {e}", path.display())))?;
        toml::from_str(&s).map_err(|e| ApiError::Config(format!("parse {}: {e}", path.display())))
    }

    /// Fills every unset field from `lower`.
    fn fill_from(&mut self, lower: Self) {
        if self.env.is_none() { self.env = lower.env; }
        if self.auth_service_url.is_none() { self.auth_service_url = lower.auth_service_url; }
        if self.auth_validate_endpoint.is_none() {
            self.auth_validate_endpoint = lower.auth_validate_endpoint;
        }
        if self.log_dir.is_none() { self.log_dir = lower.log_dir; }
        if self.log_level.is_none() { self.log_level = lower.log_level; }
        if self.http_timeout_secs.is_none() { self.http_timeout_secs = lower.http_timeout_secs; }
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        self.env.as_deref() == Some("production")
    }

    #[must_use]
    pub fn http_timeout_secs(&self) -> u64 {
        self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
    }

    /// Full URL of the remote token-validation call.
    ///
    /// # Errors
    /// Returns `ApiError::Config` naming whichever setting is missing.
    pub fn validate_token_url(&self) -> Result<String, ApiError> {
        let base = require(self.auth_service_url.as_deref(), "AUTH_SERVICE_URL")?;
        let endpoint = require(self.auth_validate_endpoint.as_deref(), "AUTH_VALIDATE_ENDPOINT")?;
        Ok(format!("{base}{endpoint}"))
    }
}

fn require<'a>(value: Option<&'a str>, key: &str) -> Result<&'a str, ApiError> {
    value.filter(|v| !v.is_empty()).ok_or_else(|| ApiError::Config(format!("{key} does not exist")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn explicit_beats_env_beats_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("svc.toml");
        std::fs::write(
            &file,
            "env = \"staging\"\nauth_service_url = \"http://file\"\nlog_level = \"warn\"\nhttp_timeout_secs = 3\n",
        )
        .unwrap();
        let explicit = ServiceConfig { log_level: Some("trace".into()), ..Default::default() };
        let env = env_of(&[("AUTH_SERVICE_URL", "http://env"), ("AUTH_VALIDATE_ENDPOINT", "/v")]);
        let cfg = ServiceConfig::load_with(explicit, Some(&file), env).unwrap();
        assert_eq!(cfg.log_level.as_deref(), Some("trace"));
        assert_eq!(cfg.auth_service_url.as_deref(), Some("http://env"));
        assert_eq!(cfg.env.as_deref(), Some("staging"));
        assert_eq!(cfg.http_timeout_secs(), 3);
        assert_eq!(cfg.validate_token_url().unwrap(), "http://env/v");
    }

    #[test]
    fn missing_auth_settings_are_named() {
        let cfg = ServiceConfig { auth_service_url: Some("http://a".into()), ..Default::default() };
        let err = cfg.validate_token_url().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: AUTH_VALIDATE_ENDPOINT does not exist");
        assert_eq!(cfg.http_timeout_secs(), DEFAULT_HTTP_TIMEOUT_SECS);
        assert!(!cfg.is_production());
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bad.toml");
        std::fs::write(&file, "env = [").unwrap();
        let err = ServiceConfig::load_with(ServiceConfig::default(), Some(&file), |_| None)
            .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
