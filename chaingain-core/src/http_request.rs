use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::{Method, RequestBuilder, Response, StatusCode};

use crate::config::ClientConfig;
use crate::error::ChainGainError;

/// Shared HTTP client. Every request carries a user-agent and the configured
/// timeout; only requests that are safe to repeat go through the retry path.
#[derive(Debug, Clone)]
pub struct Request {
    client: reqwest::Client,
    timeout: Duration,
    max_retries: u32,
}

impl Request {
    /// Initializes a new `Request` instance from the client configuration.
    pub(crate) fn new(config: &ClientConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: config.timeout,
            max_retries: config.check_retries,
        }
    }

    /// Creates a request builder carrying the user-agent. The timeout is
    /// applied when the request is sent.
    pub(crate) fn req(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(
                "User-Agent",
                format!("chaingain-core/{}", env!("CARGO_PKG_VERSION")),
            )
    }

    /// Creates a POST request builder with defaults applied.
    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        self.req(Method::POST, url)
    }

    /// Sends a request exactly once. Used for calls with side effects on the
    /// backend, which must never be repeated implicitly.
    pub(crate) async fn send_once(
        &self,
        request_builder: RequestBuilder,
    ) -> Result<Response, ChainGainError> {
        execute(request_builder.timeout(self.timeout))
            .await
            .map_err(Into::into)
    }

    /// Sends a read-only request, retrying transient failures with exponential backoff.
    pub(crate) async fn send_with_retry(
        &self,
        request_builder: RequestBuilder,
    ) -> Result<Response, ChainGainError> {
        let request_builder = request_builder.timeout(self.timeout);
        let Some(template) = request_builder.try_clone() else {
            return execute(request_builder).await.map_err(Into::into);
        };

        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(200))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(self.max_retries as usize);

        (|| async {
            let attempt = template.try_clone().ok_or_else(|| {
                SendFailure::new(
                    "<unknown>",
                    None,
                    "request body cannot be replayed".to_string(),
                    false,
                )
            })?;
            execute(attempt).await
        })
        .retry(backoff)
        .when(SendFailure::is_transient)
        .notify(|failure: &SendFailure, delay: Duration| {
            tracing::debug!(url = %failure.url, ?delay, "retrying request: {}", failure.error);
        })
        .await
        .map_err(Into::into)
    }
}

/// Why a send failed, and whether trying again could help.
#[derive(Debug)]
struct SendFailure {
    url: String,
    status: Option<u16>,
    error: String,
    transient: bool,
}

impl SendFailure {
    fn new(url: impl Into<String>, status: Option<u16>, error: String, transient: bool) -> Self {
        Self {
            url: url.into(),
            status,
            error,
            transient,
        }
    }

    const fn is_transient(&self) -> bool {
        self.transient
    }
}

impl From<SendFailure> for ChainGainError {
    fn from(failure: SendFailure) -> Self {
        Self::NetworkError {
            url: failure.url,
            status: failure.status,
            error: failure.error,
        }
    }
}

/// Rate limiting and server-side errors may clear up on their own.
fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Executes a request. Transport failures and transient statuses become
/// errors; every other status is handed back for the caller to interpret.
async fn execute(request_builder: RequestBuilder) -> Result<Response, SendFailure> {
    let (client, request) = request_builder.build_split();
    let request = request.map_err(|err| {
        let url = err
            .url()
            .map_or_else(|| "<unknown>".to_string(), ToString::to_string);
        SendFailure::new(url, None, format!("invalid request: {err}"), false)
    })?;
    let url = request.url().to_string();

    let response = client.execute(request).await.map_err(|err| {
        let transient = err.is_timeout() || err.is_connect();
        SendFailure::new(url.as_str(), None, format!("transport error: {err}"), transient)
    })?;

    let status = response.status();
    if is_transient_status(status) {
        return Err(SendFailure::new(
            url,
            Some(status.as_u16()),
            format!("backend answered {status}"),
            true,
        ));
    }
    Ok(response)
}
