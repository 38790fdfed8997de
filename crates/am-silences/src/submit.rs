//! Silence submission: building requests and classifying replies.
//!
//! Building silences and interpreting replies are pure functions; the transport
//! sits behind [`SilenceApi`] so the workflow can be driven by a fake in tests.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::config::EffectiveConfig;
use crate::error::Result;
use crate::expiry::SilenceWindow;
use crate::types::{MatcherGroup, Silence};

/// API path for listing and creating silences, relative to the server base URL.
pub const SILENCES_PATH: &str = "api/v1/silences";

/// Reply status signalling a rejected request.
pub const STATUS_ERROR: &str = "error";

/// Access to the Alertmanager silence API.
pub trait SilenceApi: Send + Sync {
    /// Fetch every silence the server knows about, active or expired.
    ///
    /// # Errors
    ///
    /// Returns `NetworkFailure` or `MalformedResponse`.
    fn list_silences(&self) -> impl Future<Output = Result<Vec<Silence>>> + Send;

    /// Submit one silence and classify the server's reply.
    ///
    /// A server-side rejection is a successful call returning
    /// [`SubmitOutcome::Rejected`].
    ///
    /// # Errors
    ///
    /// Returns `SubmissionFailed` or `MalformedResponse`.
    fn create_silence(&self, silence: &Silence)
    -> impl Future<Output = Result<SubmitOutcome>> + Send;
}

/// Joins [`SILENCES_PATH`] onto `base`, keeping any path prefix of the base URL.
#[must_use]
pub fn silences_url(base: &Url) -> Url {
    let mut url = base.clone();
    let path = format!("{}/{SILENCES_PATH}", base.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// Builds one silence per matcher group, all sharing `window`.
pub fn build_silences(
    groups: Vec<MatcherGroup>,
    config: &EffectiveConfig,
    window: SilenceWindow,
) -> Vec<Silence> {
    groups
        .into_iter()
        .map(|matchers| Silence::new(matchers, window, &config.author, &config.comment))
        .collect()
}

/// How the server answered a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum SubmitOutcome {
    /// The silence was stored.
    #[serde(rename = "success")]
    Created {
        /// Server-assigned silence id.
        silence_id: String,
    },
    /// The server refused the silence.
    #[serde(rename = "error")]
    Rejected {
        /// Server error category, e.g. `bad_data`.
        error_type: String,
        /// Server error message.
        message: String,
    },
}

impl fmt::Display for SubmitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { silence_id } => f.write_str(silence_id),
            Self::Rejected {
                error_type,
                message,
            } => write!(f, "[{error_type}] {message}"),
        }
    }
}

/// Payload of a successful create reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddResponseData {
    /// Server-assigned silence id.
    #[serde(default)]
    pub silence_id: Option<String>,
}

/// Reply to `POST /api/v1/silences`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddResponse {
    /// `success` or `error`.
    pub status: String,
    /// Present on success.
    #[serde(default)]
    pub data: Option<AddResponseData>,
    /// Present on error.
    #[serde(default)]
    pub error_type: Option<String>,
    /// Present on error.
    #[serde(default)]
    pub error: Option<String>,
}

impl AddResponse {
    /// Classifies the reply.
    ///
    /// Any status other than `error` counts as created; a missing silence id
    /// is reported as an empty one.
    #[must_use]
    pub fn into_outcome(self) -> SubmitOutcome {
        if self.status == STATUS_ERROR {
            return SubmitOutcome::Rejected {
                error_type: self.error_type.unwrap_or_default(),
                message: self.error.unwrap_or_default(),
            };
        }

        let silence_id = self.data.and_then(|d| d.silence_id).unwrap_or_default();
        if silence_id.is_empty() {
            warn!(status = %self.status, "Create reply carries no silenceId");
        }
        SubmitOutcome::Created { silence_id }
    }
}

/// Reply to `GET /api/v1/silences`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    /// `success` or `error`.
    pub status: String,
    /// Silences known to the server; `null` when there are none.
    #[serde(default)]
    pub data: Option<Vec<Silence>>,
    /// Present on error.
    #[serde(default)]
    pub error_type: Option<String>,
    /// Present on error.
    #[serde(default)]
    pub error: Option<String>,
}

impl ListResponse {
    /// Whether the server reported an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == STATUS_ERROR
    }

    /// The listed silences.
    #[must_use]
    pub fn into_silences(self) -> Vec<Silence> {
        self.data.unwrap_or_default()
    }
}
