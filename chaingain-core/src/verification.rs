//! Answer verification against `POST /verifyWord`.

use serde::{Deserialize, Serialize};

use crate::config::{ClientConfig, Language};
use crate::error::ChainGainError;
use crate::http_request::Request;

/// Outcome of verifying one answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct VerificationResult {
    /// Whether the answer was accepted.
    pub correct: bool,
    /// The expected answer, when the backend supplies one.
    pub correct_word: Option<String>,
    /// Content id of a certificate minted for this answer.
    pub certificate: Option<String>,
}

impl VerificationResult {
    /// The fail-closed outcome: incorrect, with no hint and no certificate.
    #[must_use]
    pub fn rejected() -> Self {
        Self::default()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct VerifyWordRequest<'a> {
    original_string: &'a str,
    translated_string: &'a str,
    acc_id: &'a str,
    language: &'a str,
}

// Every field is optional on the wire: a missing `Correct` reads as false and
// an empty string means "none".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct VerifyWordResponse {
    correct: Option<bool>,
    correct_word: Option<String>,
    certificate: Option<String>,
}

impl From<VerifyWordResponse> for VerificationResult {
    fn from(response: VerifyWordResponse) -> Self {
        Self {
            correct: response.correct.unwrap_or(false),
            correct_word: response.correct_word.filter(|word| !word.is_empty()),
            certificate: response.certificate.filter(|cid| !cid.is_empty()),
        }
    }
}

/// Client for the verification endpoint. One request per attempt, never
/// retried.
#[derive(Debug, Clone)]
pub struct VerificationClient {
    request: Request,
    url: String,
    language: Language,
}

impl VerificationClient {
    /// Creates a client for the configured backend and target language.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            request: Request::new(config),
            url: config.endpoint("/verifyWord"),
            language: config.language,
        }
    }

    /// The language answers are verified against.
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Verifies `translated` as a translation of `original`, failing closed.
    ///
    /// Any transport error, non-success status or unparseable body yields
    /// [`VerificationResult::rejected`].
    pub async fn verify(
        &self,
        original: &str,
        translated: &str,
        account_id: &str,
    ) -> VerificationResult {
        match self.try_verify(original, translated, account_id).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(word = original, "verification failed, marking incorrect: {err}");
                VerificationResult::rejected()
            }
        }
    }

    /// Verifies an answer, reporting why verification failed.
    ///
    /// # Errors
    ///
    /// Returns [`ChainGainError::NetworkError`] on transport failures or a
    /// non-success status, and [`ChainGainError::SerializationError`] if the
    /// body is not a JSON object.
    pub async fn try_verify(
        &self,
        original: &str,
        translated: &str,
        account_id: &str,
    ) -> Result<VerificationResult, ChainGainError> {
        let body = VerifyWordRequest {
            original_string: original,
            translated_string: translated,
            acc_id: account_id,
            language: self.language.as_ref(),
        };
        tracing::debug!(word = original, language = %self.language, "verifying answer");

        let response = self
            .request
            .send_once(self.request.post(&self.url).json(&body))
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
        let parsed = serde_json::from_str::<VerifyWordResponse>(&text).map_err(|e| {
            ChainGainError::SerializationError {
                error: format!("Failed to parse verification response: {e}"),
            }
        })?;
        Ok(parsed.into())
    }
}
