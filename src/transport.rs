// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! HTTP delivery of event envelopes.
//!
//! [`Transport`] is the seam to the HTTP client; [`ReqwestTransport`] is the
//! default implementation. [`Dispatcher`] applies the best-effort policy on
//! top of it: disabled short-circuit, per-request timeout, and logging of
//! every failure instead of returning it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, trace, warn};

use crate::envelope::EventEnvelope;
use crate::error::DeliveryError;
use crate::telemetry::DeliveryStats;

/// A POST request to the metrics endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl TransportRequest {
    /// Look up a header value by (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Decode the body back into an envelope.
    pub fn envelope(&self) -> Result<EventEnvelope, DeliveryError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Response returned by a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client capable of posting a string body with custom headers.
///
/// Implementations do not need to enforce a timeout; the [`Dispatcher`]
/// drops the returned future when the configured timeout elapses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse, DeliveryError>;
}

/// Default transport backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (proxies, TLS roots, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse, DeliveryError> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.body(request.body).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read metrics response body");
            String::new()
        });

        Ok(TransportResponse { status, body })
    }
}

/// Outcome of a delivery attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Skipped,
}

/// Best-effort sender bound to one endpoint.
pub struct Dispatcher {
    endpoint: String,
    headers: Vec<(String, String)>,
    timeout: Duration,
    disabled: bool,
    transport: Arc<dyn Transport>,
    stats: Arc<DeliveryStats>,
}

impl Dispatcher {
    pub fn new(
        endpoint: impl Into<String>,
        headers: Vec<(String, String)>,
        timeout_ms: u64,
        disabled: bool,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let mut all_headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        all_headers.extend(headers);

        Self {
            endpoint: endpoint.into(),
            headers: all_headers,
            timeout: Duration::from_millis(timeout_ms),
            disabled,
            transport,
            stats: Arc::new(DeliveryStats::new()),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn stats(&self) -> &Arc<DeliveryStats> {
        &self.stats
    }

    /// Deliver an event, logging and swallowing any failure.
    pub async fn send<P>(&self, event_type: &str, payload: &P)
    where
        P: Serialize + Sync + ?Sized,
    {
        let start = Instant::now();
        let result = self.try_send(event_type, payload).await;
        let elapsed = start.elapsed();

        match result {
            Ok(Delivery::Skipped) => {
                trace!(event_type, "Metrics disabled, event not sent");
                #[cfg(feature = "stats")]
                self.stats.record_skipped(event_type);
            }
            Ok(Delivery::Sent) => {
                debug!(
                    event_type,
                    duration_ms = elapsed.as_secs_f64() * 1000.0,
                    "Metrics event delivered"
                );
                #[cfg(feature = "stats")]
                self.stats.record_delivered(event_type, elapsed);
            }
            Err(err) => {
                match &err {
                    DeliveryError::Status { status, body } => warn!(
                        event_type,
                        endpoint = %self.endpoint,
                        status,
                        body = %body,
                        "Metrics endpoint rejected event"
                    ),
                    other => error!(
                        event_type,
                        endpoint = %self.endpoint,
                        error = %other,
                        "Failed to send metrics event"
                    ),
                }
                #[cfg(feature = "stats")]
                self.stats.record_failed(event_type, elapsed);
            }
        }
    }

    /// Deliver an event and report the outcome.
    ///
    /// Trackers use [`send`](Self::send); this is for callers that need to
    /// know whether delivery worked, such as a command-line reporter.
    pub async fn try_send<P>(&self, event_type: &str, payload: &P) -> Result<Delivery, DeliveryError>
    where
        P: Serialize + Sync + ?Sized,
    {
        if self.disabled {
            return Ok(Delivery::Skipped);
        }

        let body = EventEnvelope::new(event_type, payload)?.to_body()?;
        let request = TransportRequest {
            url: self.endpoint.clone(),
            headers: self.headers.clone(),
            body,
        };

        let response = tokio::time::timeout(self.timeout, self.transport.post(request))
            .await
            .map_err(|_| DeliveryError::Timeout(self.timeout.as_millis() as u64))??;

        if response.is_ok() {
            Ok(Delivery::Sent)
        } else {
            Err(DeliveryError::status(response.status, response.body))
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}
