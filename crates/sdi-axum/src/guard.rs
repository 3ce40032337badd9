//! Per-service interception configuration

use std::collections::HashMap;

use axum::http::request::Parts;
use sdi_client::{
    AnalysisRequest, AnalysisResult, Decision, EnforcementPolicy, SdiClient,
};

/// Default cap on how much request body is buffered for analysis.
pub const DEFAULT_MAX_BODY_BYTES: usize = 256 * 1024;

/// Binds an [`SdiClient`] to one protected service.
///
/// The `service_id` is mandatory and immutable after construction.
/// Turn the guard into a layer with [`ServiceGuard::into_layer`] and
/// hang it on a router:
///
/// ```rust,no_run
/// use axum::{routing::post, Router};
/// use sdi_axum::ServiceGuard;
/// use sdi_client::{SdiClient, SdiConfig};
///
/// async fn create_user() -> &'static str {
///     "ok"
/// }
///
/// let sdi = SdiClient::new(SdiConfig::from_env());
/// let app: Router = Router::new()
///     .route("/api/users", post(create_user))
///     .layer(ServiceGuard::new(sdi, "my-service").into_layer());
/// ```
#[derive(Debug, Clone)]
pub struct ServiceGuard {
    client: SdiClient,
    service_id: String,
    policy: EnforcementPolicy,
    enabled: bool,
    max_body_bytes: usize,
}

impl ServiceGuard {
    /// Guard the named service with the given client.
    ///
    /// The enable flag is taken from the client's configuration and can
    /// be overridden with [`ServiceGuard::enabled`].
    pub fn new(client: SdiClient, service_id: impl Into<String>) -> Self {
        let enabled = client.config().enabled;
        Self {
            client,
            service_id: service_id.into(),
            policy: EnforcementPolicy::default(),
            enabled,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Override the enforcement policy.
    pub fn policy(mut self, policy: EnforcementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Force the interception on or off.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Cap the buffered body size; bytes past the cap are forwarded to
    /// the host handler unread by the analysis.
    pub fn max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    /// Wrap this guard in a [`crate::SdiLayer`].
    pub fn into_layer(self) -> crate::SdiLayer {
        crate::SdiLayer::new(self)
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn max_body(&self) -> usize {
        self.max_body_bytes
    }

    pub(crate) fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Describe the request and run it past the backend.
    pub(crate) async fn analyze(&self, parts: &Parts, body: String) -> AnalysisResult {
        // materialize the header snapshot; the client may serialize it
        // after the native request is gone
        let mut headers = HashMap::with_capacity(parts.headers.len());
        for (name, value) in parts.headers.iter() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_string(), value.to_string());
            }
        }

        let request = AnalysisRequest::builder(
            self.service_id.clone(),
            parts.uri.path(),
            parts.method.as_str(),
        )
        .headers(headers)
        .body(body)
        .build();

        self.client.analyze(&request).await
    }

    pub(crate) fn decide(&self, result: &AnalysisResult) -> Decision {
        self.policy.decide(result)
    }
}
