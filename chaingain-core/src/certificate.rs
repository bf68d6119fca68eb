//! Certificate links and validity checks.

use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::error::ChainGainError;
use crate::http_request::Request;

/// Builds the public link for a certificate content id.
#[must_use]
pub fn certificate_url(gateway_url: &str, certificate: &str) -> String {
    format!("{}/{}", gateway_url.trim_end_matches('/'), certificate.trim())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CheckCertRequest<'a> {
    acc_id: &'a str,
    cert_id: &'a str,
    serial: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct CheckCertResponse {
    valid: Option<bool>,
}

/// Client for the certificate endpoints.
#[derive(Debug, Clone)]
pub struct CertificateClient {
    request: Request,
    url: String,
    gateway_url: String,
}

impl CertificateClient {
    /// Creates a client for the configured backend and gateway.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            request: Request::new(config),
            url: config.endpoint("/checkCert"),
            gateway_url: config.gateway_url.clone(),
        }
    }

    /// The public link for `certificate` on the configured gateway.
    #[must_use]
    pub fn url_for(&self, certificate: &str) -> String {
        certificate_url(&self.gateway_url, certificate)
    }

    /// Asks the backend whether `account_id` holds serial `serial` of
    /// certificate token `certificate_id`.
    ///
    /// The query is read-only, so transient failures are retried.
    ///
    /// # Errors
    ///
    /// Returns [`ChainGainError::InvalidInput`] for blank arguments,
    /// [`ChainGainError::NetworkError`] if the backend cannot be reached or
    /// rejects the query, and [`ChainGainError::SerializationError`] for an
    /// unparseable reply.
    pub async fn check(
        &self,
        account_id: &str,
        certificate_id: &str,
        serial: &str,
    ) -> Result<bool, ChainGainError> {
        for (attribute, value) in [
            ("account_id", account_id),
            ("certificate_id", certificate_id),
            ("serial", serial),
        ] {
            if value.trim().is_empty() {
                return Err(ChainGainError::InvalidInput {
                    attribute: attribute.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }

        let body = CheckCertRequest {
            acc_id: account_id.trim(),
            cert_id: certificate_id.trim(),
            serial: serial.trim(),
        };
        let response = self
            .request
            .send_with_retry(self.request.post(&self.url).json(&body))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("Unknown error"));
            return Err(ChainGainError::NetworkError {
                url: self.url.clone(),
                status: Some(status.as_u16()),
                error,
            });
        }

        let text = response.text().await?;
        let parsed = serde_json::from_str::<CheckCertResponse>(&text).map_err(|e| {
            ChainGainError::SerializationError {
                error: format!("Failed to parse certificate check response: {e}"),
            }
        })?;
        Ok(parsed.valid.unwrap_or(false))
    }
}
