//! HTTP client for orchestrator callbacks
//!
//! Delivers success/failure reports as JSON POSTs to the orchestrator's
//! callback endpoint. Delivery is never retried here; a failed request
//! surfaces to the executor's caller so the hosting layer can decide on
//! redelivery of the whole invocation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::{FailureReport, Report, ReportAck, ReportEnvelope, SuccessReport};
use crate::types::ContinuationToken;

use super::CallbackChannel;

// ─────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────

/// Configuration for the HTTP callback channel
#[derive(Debug, Clone)]
pub struct HttpCallbackConfig {
    /// Base URL of the orchestrator callback API
    pub base_url: String,

    /// Request timeout
    pub request_timeout: Duration,

    /// Bearer token for the callback API (if required)
    pub auth_token: Option<String>,
}

impl Default for HttpCallbackConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout: Duration::from_secs(30),
            auth_token: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// HTTP Callback
// ─────────────────────────────────────────────────────────────────

/// Production callback channel: POSTs reports to the orchestrator
pub struct HttpCallback {
    config: HttpCallbackConfig,
    client: reqwest::Client,
}

impl HttpCallback {
    /// Create a new HTTP callback channel
    pub fn new(config: HttpCallbackConfig) -> Result<Self> {
        Url::parse(&config.base_url).map_err(|e| {
            Error::config_field_invalid(
                "orchestrator.callback_url",
                format!("invalid URL '{}': {}", config.base_url, e),
            )
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { config, client })
    }

    /// Endpoint for a callback leaf path ("success" / "failure")
    fn endpoint(&self, leaf: &str) -> String {
        format!(
            "{}/callback/{}",
            self.config.base_url.trim_end_matches('/'),
            leaf
        )
    }

    /// Deliver one report envelope, exactly one attempt
    async fn deliver(&self, leaf: &str, envelope: &ReportEnvelope) -> Result<()> {
        let url = self.endpoint(leaf);
        debug!(
            url = %url,
            report_id = %envelope.id,
            report_type = envelope.report.type_name(),
            "Delivering callback report"
        );

        let mut request = self.client.post(&url).json(envelope);
        if let Some(ref token) = self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::CallbackTimeout {
                    url: url.clone(),
                    timeout_secs: self.config.request_timeout.as_secs(),
                }
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::callback_rejected(status.as_u16(), body));
        }

        // An explicit non-accepted ack counts as rejection too
        if let Ok(ack) = response.json::<ReportAck>().await {
            if !ack.accepted {
                return Err(Error::callback_rejected(
                    status.as_u16(),
                    ack.message.unwrap_or_else(|| "report not accepted".to_string()),
                ));
            }
        }

        info!(
            report_id = %envelope.id,
            report_type = envelope.report.type_name(),
            token = %envelope.report.token(),
            "Callback report delivered"
        );

        Ok(())
    }
}

#[async_trait]
impl CallbackChannel for HttpCallback {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn report_success(&self, token: &ContinuationToken, output: &str) -> Result<()> {
        let envelope = ReportEnvelope::new(Report::TaskSuccess(SuccessReport {
            task_token: token.clone(),
            output: output.to_string(),
        }));
        self.deliver("success", &envelope).await
    }

    async fn report_failure(
        &self,
        token: &ContinuationToken,
        error: &str,
        cause: &str,
    ) -> Result<()> {
        let envelope = ReportEnvelope::new(Report::TaskFailure(FailureReport {
            task_token: token.clone(),
            error: error.to_string(),
            cause: cause.to_string(),
        }));
        self.deliver("failure", &envelope).await
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
