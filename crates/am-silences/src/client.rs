//! HTTP client for the Alertmanager silence API.
//!
//! # Example
//!
//! ```rust,no_run
//! use am_silences::client::HttpSilenceClient;
//! use am_silences::SilenceApi;
//! use url::Url;
//!
//! # async fn example() -> Result<(), am_silences::SilenceError> {
//! let base = Url::parse("http://localhost:9093").expect("valid url");
//! let client = HttpSilenceClient::new(base)?;
//! let silences = client.list_silences().await?;
//! println!("{} silences", silences.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::header::ACCEPT;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Result, SilenceError};
use crate::submit::{AddResponse, ListResponse, SilenceApi, SubmitOutcome, silences_url};
use crate::types::Silence;

const USER_AGENT: &str = concat!("amtool/", env!("CARGO_PKG_VERSION"));

/// `reqwest`-backed [`SilenceApi`].
#[derive(Debug, Clone)]
pub struct HttpSilenceClient {
    http: reqwest::Client,
    silences_url: Url,
}

impl HttpSilenceClient {
    /// Creates a client for the Alertmanager at `base`, using the transport's default timeouts.
    ///
    /// # Errors
    ///
    /// Returns `SilenceError::ConfigValidation` if the HTTP client cannot be built.
    pub fn new(base: Url) -> Result<Self> {
        Self::build(base, None)
    }

    /// Creates a client whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `SilenceError::ConfigValidation` if the HTTP client cannot be built.
    pub fn with_timeout(base: Url, timeout: Duration) -> Result<Self> {
        Self::build(base, Some(timeout))
    }

    fn build(base: Url, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| SilenceError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            silences_url: silences_url(&base),
        })
    }

    /// The endpoint silences are listed from and posted to.
    #[must_use]
    pub fn silences_url(&self) -> &Url {
        &self.silences_url
    }
}

impl SilenceApi for HttpSilenceClient {
    async fn list_silences(&self) -> Result<Vec<Silence>> {
        let url = self.silences_url.as_str();
        let network = |e: reqwest::Error| SilenceError::NetworkFailure {
            url: url.to_string(),
            reason: e.to_string(),
        };

        debug!(url, "Fetching silences");
        let response = self
            .http
            .get(self.silences_url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(network)?;
        let status = response.status();
        let body = response.bytes().await.map_err(network)?;
        trace!(%status, bytes = body.len(), "Received silence list");

        let reply: ListResponse =
            serde_json::from_slice(&body).map_err(|e| SilenceError::MalformedResponse {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if reply.is_error() {
            return Err(SilenceError::MalformedResponse {
                url: url.to_string(),
                reason: format!(
                    "[{}] {}",
                    reply.error_type.unwrap_or_default(),
                    reply.error.unwrap_or_default()
                ),
            });
        }

        let silences = reply.into_silences();
        debug!(count = silences.len(), "Fetched silences");
        Ok(silences)
    }

    async fn create_silence(&self, silence: &Silence) -> Result<SubmitOutcome> {
        let url = self.silences_url.as_str();
        let submission = |e: reqwest::Error| SilenceError::SubmissionFailed {
            url: url.to_string(),
            reason: e.to_string(),
        };

        debug!(url, matchers = %silence.matchers, ends_at = %silence.ends_at, "Submitting silence");
        let response = self
            .http
            .post(self.silences_url.clone())
            .header(ACCEPT, "application/json")
            .json(silence)
            .send()
            .await
            .map_err(submission)?;
        let status = response.status();
        let body = response.bytes().await.map_err(submission)?;
        trace!(%status, bytes = body.len(), "Received create reply");

        let reply: AddResponse =
            serde_json::from_slice(&body).map_err(|e| SilenceError::MalformedResponse {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(reply.into_outcome())
    }
}
