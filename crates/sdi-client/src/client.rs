//! SDI API client
//!
//! One POST per analysis, bounded by the configured timeout, with every
//! failure mode collapsing into a safe default. Availability of the
//! protected service must never depend on the backend being up.

use std::sync::Arc;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SdiConfig;
use crate::error::ClientError;
use crate::types::{AnalysisRequest, AnalysisResult};

/// API version segment in backend paths.
const API_VERSION: &str = "v1";

/// Client for the SDI analysis backend.
///
/// Cheap to clone; all clones share one connection pool. Holds no
/// mutable state, so concurrent calls from many in-flight requests
/// need no synchronization.
///
/// # Example
///
/// ```rust,no_run
/// use sdi_client::{AnalysisRequest, SdiClient, SdiConfig};
///
/// # async fn run() {
/// let sdi = SdiClient::new(SdiConfig::new("http://localhost:8080"));
///
/// let request = AnalysisRequest::builder("my-service", "/api/users", "POST")
///     .body(r#"{"user": "data"}"#)
///     .build();
///
/// let result = sdi.analyze(&request).await;
/// if result.anomaly_detected {
///     println!("anomaly, score {}", result.anomaly_score);
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct SdiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: SdiConfig,
    http: reqwest::Client,
}

impl SdiClient {
    /// Create a client from explicit configuration.
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be constructed,
    /// which only happens when the TLS backend fails to initialize.
    /// This is the sole panic path in the crate; every per-call
    /// failure after construction fails open instead.
    pub fn new(config: SdiConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            // the deadline must fire during connect stalls too
            .connect_timeout(config.timeout)
            .build()
            .expect("failed to build HTTP client");

        Self {
            inner: Arc::new(ClientInner { config, http }),
        }
    }

    /// Create a client from `SDI_*` environment variables.
    pub fn from_env() -> Self {
        Self::new(SdiConfig::from_env())
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &SdiConfig {
        &self.inner.config
    }

    /// Analyze a request for anomalies.
    ///
    /// Fails open: connection failures, timeouts, non-2xx statuses and
    /// malformed bodies are reported through tracing and the
    /// `sdi_client_failures_total` counter, then absorbed into
    /// [`AnalysisResult::default`]. This call never returns an error.
    pub async fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult {
        match self.try_analyze(request).await {
            Ok(result) => {
                debug!(
                    service_id = %request.service_id,
                    path = %request.path,
                    anomaly = result.anomaly_detected,
                    severity = %result.severity,
                    "analysis complete"
                );
                counter!("sdi_client_requests_total", "outcome" => "ok").increment(1);
                result
            }
            Err(err) => {
                warn!(
                    service_id = %request.service_id,
                    path = %request.path,
                    error = %err,
                    "analysis failed, failing open"
                );
                counter!("sdi_client_failures_total", "kind" => err.kind()).increment(1);
                AnalysisResult::default()
            }
        }
    }

    async fn try_analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ClientError> {
        let url = self.url("analyze");

        let response = self
            .inner
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::from_send(e, self.inner.config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }

        response.json().await.map_err(ClientError::Decode)
    }

    /// Quick anomaly detection against the lightweight endpoint.
    ///
    /// Returns only the boolean flag; `false` on any failure, under the
    /// same fail-open policy as [`analyze`](Self::analyze).
    pub async fn detect(&self, service_id: &str, path: &str, method: &str, body: &str) -> bool {
        match self.try_detect(service_id, path, method, body).await {
            Ok(detected) => detected,
            Err(err) => {
                warn!(service_id, path, error = %err, "detection failed, failing open");
                counter!("sdi_client_failures_total", "kind" => err.kind()).increment(1);
                false
            }
        }
    }

    async fn try_detect(
        &self,
        service_id: &str,
        path: &str,
        method: &str,
        body: &str,
    ) -> Result<bool, ClientError> {
        let url = self.url("detect");
        let payload = DetectRequest {
            service_id,
            path,
            method,
            body,
        };

        let response = self
            .inner
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ClientError::from_send(e, self.inner.config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }

        let detect: DetectResponse = response.json().await.map_err(ClientError::Decode)?;
        Ok(detect.anomaly_detected)
    }

    /// Probe backend liveness.
    ///
    /// `true` iff `GET /api/v1/health` answers 2xx; never raises.
    pub async fn health_check(&self) -> bool {
        let url = self.url("health");
        match self.inner.http.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!(error = %err, "health check failed");
                false
            }
        }
    }

    fn url(&self, operation: &str) -> String {
        format!(
            "{}/api/{}/{}",
            self.inner.config.base_url, API_VERSION, operation
        )
    }
}

impl std::fmt::Debug for SdiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdiClient")
            .field("base_url", &self.inner.config.base_url)
            .field("timeout", &self.inner.config.timeout)
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectRequest<'a> {
    service_id: &'a str,
    path: &'a str,
    method: &'a str,
    body: &'a str,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DetectResponse {
    anomaly_detected: bool,
}
