//! Form submission transport.
//!
//! Form stores hand a [`Submission`] to a [`SubmissionTransport`] and only
//! care whether it was accepted. [`HttpTransport`] POSTs the submission as
//! JSON to a per-form endpoint.

use crate::app::forms::FormData;
use crate::domain::error::{ChapelError, Result};
use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::Instrument;

/// Context sent alongside every submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionMetadata {
    pub timestamp: DateTime<Utc>,
    pub user_agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
}

/// The payload of one form submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    /// Form name (`contact`, `prayer`).
    pub form: String,
    pub data: FormData,
    pub metadata: SubmissionMetadata,
}

/// Delivers submissions somewhere. `Err` means the submission was not
/// accepted and the user may retry.
pub trait SubmissionTransport: Send + Sync {
    fn submit<'a>(&'a self, submission: &'a Submission) -> BoxFuture<'a, Result<()>>;
}

/// POSTs submissions as JSON.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoints: HashMap<String, String>,
}

impl HttpTransport {
    /// Builds a client with the given request timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`ChapelError::Config`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ChapelError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoints: HashMap::new(),
        })
    }

    /// Routes submissions of `form` to `url`.
    #[must_use]
    pub fn with_endpoint(mut self, form: impl Into<String>, url: impl Into<String>) -> Self {
        self.endpoints.insert(form.into(), url.into());
        self
    }

    async fn post(&self, submission: &Submission) -> Result<()> {
        let url = self.endpoints.get(&submission.form).ok_or_else(|| {
            ChapelError::Config(format!("no endpoint configured for form {}", submission.form))
        })?;

        let response = self
            .client
            .post(url.as_str())
            .json(submission)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "submission request failed");
                ChapelError::Network(format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "submission rejected");
            return Err(ChapelError::Network(format!("HTTP error: {status}")));
        }
        Ok(())
    }
}

impl SubmissionTransport for HttpTransport {
    fn submit<'a>(&'a self, submission: &'a Submission) -> BoxFuture<'a, Result<()>> {
        let span = tracing::debug_span!("http_submit", form = %submission.form);
        Box::pin(self.post(submission).instrument(span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::forms::FieldValue;

    fn submission(form: &str) -> Submission {
        let mut data = FormData::new();
        data.insert("name".to_string(), FieldValue::from("Ravi"));
        data.insert("consent".to_string(), FieldValue::from(true));
        Submission {
            form: form.to_string(),
            data,
            metadata: SubmissionMetadata {
                timestamp: DateTime::parse_from_rfc3339("2025-03-01T10:00:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
                user_agent: "chapel-test".to_string(),
                referrer: None,
            },
        }
    }

    #[test]
    fn payload_shape() {
        let json = serde_json::to_value(submission("contact")).unwrap();
        assert_eq!(json["form"], "contact");
        assert_eq!(json["data"]["name"], "Ravi");
        assert_eq!(json["data"]["consent"], true);
        assert_eq!(json["metadata"]["userAgent"], "chapel-test");
        assert!(json["metadata"].get("referrer").is_none());
    }

    #[tokio::test]
    async fn unknown_form_is_a_config_error() {
        let transport = HttpTransport::new(Duration::from_secs(1), "chapel-test").unwrap();
        let err = transport.submit(&submission("newsletter")).await.unwrap_err();
        assert!(matches!(err, ChapelError::Config(_)));
    }
}
