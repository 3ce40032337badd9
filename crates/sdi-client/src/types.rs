//! Wire types for the SDI analysis API
//!
//! Field names on the wire are camelCase; that casing is fixed by the
//! backend and must not change.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A request description submitted for analysis.
///
/// Built once per inbound request and discarded after the call. The
/// header map must be a fully materialized snapshot; the client may
/// serialize it after the native request object is gone.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Identifier of the protected service.
    pub service_id: String,
    /// Request path.
    pub path: String,
    /// HTTP method.
    pub method: String,
    /// Request headers snapshot.
    pub headers: HashMap<String, String>,
    /// Raw request body, may be empty.
    pub body: String,
    /// Caller-supplied context (auth principal, trace id, ...).
    pub metadata: HashMap<String, serde_json::Value>,
}

impl AnalysisRequest {
    /// Start building a request from the three mandatory fields.
    pub fn builder(
        service_id: impl Into<String>,
        path: impl Into<String>,
        method: impl Into<String>,
    ) -> AnalysisRequestBuilder {
        AnalysisRequestBuilder {
            request: AnalysisRequest {
                service_id: service_id.into(),
                path: path.into(),
                method: method.into(),
                headers: HashMap::new(),
                body: String::new(),
                metadata: HashMap::new(),
            },
        }
    }
}

/// Builder for [`AnalysisRequest`]
#[derive(Debug, Clone)]
pub struct AnalysisRequestBuilder {
    request: AnalysisRequest,
}

impl AnalysisRequestBuilder {
    /// Add a single header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.headers.insert(name.into(), value.into());
        self
    }

    /// Replace the header snapshot.
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.request.headers = headers;
        self
    }

    /// Set the raw body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.request.body = body.into();
        self
    }

    /// Add a metadata entry.
    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.request.metadata.insert(key.into(), value);
        self
    }

    /// Finish building.
    pub fn build(self) -> AnalysisRequest {
        self.request
    }
}

/// Severity of a detected anomaly, lowest to highest.
///
/// Ordering is derived so a threshold check is a plain comparison.
/// Unknown strings from the backend decode as [`Severity::None`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// No anomaly, or severity not assigned.
    #[default]
    None,
    /// Low risk.
    Low,
    /// Medium risk.
    Medium,
    /// High risk.
    High,
    /// Critical risk; the only level that blocks by default.
    Critical,
}

impl Severity {
    /// Lowercase wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            // "none" and anything the backend invents later
            _ => Severity::None,
        })
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an analysis call.
///
/// Always produced: every failure mode of the transport or backend
/// collapses into [`AnalysisResult::default`], which detects nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisResult {
    /// Whether the backend flagged the request.
    pub anomaly_detected: bool,
    /// Confidence in `[0.0, 1.0]`; meaningful only when detected.
    pub anomaly_score: f64,
    /// Risk classification of the anomaly.
    pub severity: Severity,
    /// Service id echoed by the backend.
    pub service_id: Option<String>,
    /// Backend-assigned timestamp (unix seconds).
    pub timestamp: Option<i64>,
    /// True if the backend kicked off a remediation pipeline.
    pub pipeline_triggered: bool,
}
