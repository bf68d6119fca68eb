use std::time::Duration;

use reqwest::Url;
use strum::{AsRefStr, Display, EnumString};

use crate::error::ChainGainError;

/// Public gateway resolving certificate content identifiers.
pub const DEFAULT_GATEWAY_URL: &str = "https://ipfs.io/ipfs";

/// Backend deployment to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    /// A backend running on the developer's machine.
    Local,
    /// Testnet-backed staging deployment.
    Staging,
    /// Production deployment.
    Production,
}

/// Target language the learner translates into.
///
/// These are the languages the verification backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    /// French.
    Fr,
    /// German.
    De,
    /// Spanish.
    Es,
}

/// Settings shared by every backend client.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ClientConfig {
    /// Base URL of the backend, without a trailing slash.
    pub base_url: String,
    /// Gateway prefix used to build certificate links.
    pub gateway_url: String,
    /// Language every card is verified against.
    pub language: Language,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries for read-only queries (certificate checks). Account creation
    /// and answer verification are never retried.
    pub check_retries: u32,
    /// Lifetime of the persisted identity entries; `None` never expires.
    pub identity_ttl: Option<Duration>,
    /// Allow plain `http` base URLs.
    pub allow_insecure: bool,
}

impl ClientConfig {
    /// Returns the defaults for a given deployment.
    #[must_use]
    pub fn from_environment(environment: Environment) -> Self {
        let (base_url, allow_insecure) = match environment {
            Environment::Local => ("http://localhost:8080", true),
            Environment::Staging => ("https://api.staging.chaingain.app", false),
            Environment::Production => ("https://api.chaingain.app", false),
        };
        Self {
            base_url: base_url.to_string(),
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            language: Language::De,
            timeout: Duration::from_secs(10),
            check_retries: 3, // total attempts = 4
            identity_ttl: None,
            allow_insecure,
        }
    }

    /// Overrides the backend base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the certificate gateway.
    #[must_use]
    pub fn with_gateway_url(mut self, gateway_url: impl Into<String>) -> Self {
        self.gateway_url = gateway_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the target language.
    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the identity lifetime.
    #[must_use]
    pub fn with_identity_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.identity_ttl = ttl;
        self
    }

    /// Overrides the retry budget for certificate checks.
    #[must_use]
    pub fn with_check_retries(mut self, retries: u32) -> Self {
        self.check_retries = retries;
        self
    }

    /// Allows or forbids plain `http` base URLs.
    #[must_use]
    pub fn with_allow_insecure(mut self, allow: bool) -> Self {
        self.allow_insecure = allow;
        self
    }

    /// Checks that the configured URLs are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ChainGainError::InvalidInput`] if a URL does not parse or the
    /// base URL is not `https` while insecure transport is disallowed.
    pub fn validate(&self) -> Result<(), ChainGainError> {
        let base = Url::parse(&self.base_url).map_err(|err| {
            ChainGainError::InvalidInput {
                attribute: "base_url".to_string(),
                reason: err.to_string(),
            }
        })?;
        match base.scheme() {
            "https" => {}
            "http" if self.allow_insecure => {}
            scheme => {
                return Err(ChainGainError::InvalidInput {
                    attribute: "base_url".to_string(),
                    reason: format!("scheme `{scheme}` is not allowed"),
                })
            }
        }
        Url::parse(&self.gateway_url).map_err(|err| ChainGainError::InvalidInput {
            attribute: "gateway_url".to_string(),
            reason: err.to_string(),
        })?;
        Ok(())
    }

    /// Joins an endpoint path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_environment(Environment::Production)
    }
}
