//! Server and client configuration
//!
//! Two layers:
//!
//! - [`ApiConfig`]: server settings, read from `GUARDIO_`-prefixed
//!   environment variables on top of built-in defaults.
//! - [`RuntimeConfig`]: the public client configuration served at
//!   `/runtime-config.json`, read from a JSON file and then overridden by
//!   the matching `ApiConfig` fields.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use validator::Validate;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid runtime configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid runtime configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
    /// HS256 secret; when unset, token signatures are checked by the
    /// identity server only
    pub jwt_secret: Option<String>,
    /// PostgreSQL URL for the notice store; in-memory when unset
    pub database_url: Option<String>,
    /// Timeout for identity server calls
    pub idv_timeout_secs: u64,
    /// Location of the client runtime configuration file
    pub runtime_config_path: String,
    /// Overrides `baseUrl`
    pub identity_server_url: Option<String>,
    /// Overrides `clientID`
    pub client_id: Option<String>,
    /// Overrides `identityVerificationProviderId`
    pub idv_provider_id: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            jwt_secret: None,
            database_url: None,
            idv_timeout_secs: 30,
            runtime_config_path: "runtime-config.json".to_string(),
            identity_server_url: None,
            client_id: None,
            idv_provider_id: None,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `GUARDIO_*` environment variables
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_environment(config::Environment::with_prefix("GUARDIO").try_parsing(true))
    }

    pub fn from_environment(environment: config::Environment) -> Result<Self, ConfigLoadError> {
        Ok(config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()?)
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Applies the override fields to a client configuration
    pub fn apply_overrides(&self, mut runtime: RuntimeConfig) -> RuntimeConfig {
        if let Some(url) = &self.identity_server_url {
            runtime.base_url = url.clone();
        }
        if let Some(id) = &self.client_id {
            runtime.client_id = Some(id.clone());
        }
        if let Some(id) = &self.idv_provider_id {
            runtime.identity_verification_provider_id = Some(id.clone());
        }
        runtime
    }
}

/// Public client configuration consumed by the shopping UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RuntimeConfig {
    /// OIDC client id of the registered application
    #[serde(rename = "clientID", default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Identity server base URL
    #[serde(rename = "baseUrl")]
    #[validate(url)]
    pub base_url: String,

    #[serde(rename = "signInRedirectURL")]
    #[validate(url)]
    pub sign_in_redirect_url: String,

    #[serde(rename = "signOutRedirectURL")]
    #[validate(url)]
    pub sign_out_redirect_url: String,

    #[serde(rename = "userPortalURL", default, skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub user_portal_url: Option<String>,

    #[validate(length(min = 1))]
    pub scope: Vec<String>,

    #[serde(
        rename = "identityVerificationProviderId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub identity_verification_provider_id: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            base_url: "https://localhost:9443".to_string(),
            sign_in_redirect_url: "https://localhost:3000".to_string(),
            sign_out_redirect_url: "https://localhost:3000".to_string(),
            user_portal_url: Some("https://localhost:9443/myaccount".to_string()),
            scope: vec![
                "openid".to_string(),
                "profile".to_string(),
                "internal_login".to_string(),
            ],
            identity_verification_provider_id: None,
        }
    }
}

impl RuntimeConfig {
    /// Reads the configuration file; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigLoadError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// Client id, if set to something non-blank
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// IDV provider id, if set to something non-blank
    pub fn idv_provider_id(&self) -> Option<&str> {
        self.identity_verification_provider_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }
}
