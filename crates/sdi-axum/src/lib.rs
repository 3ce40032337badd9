//! SDI interception layer for axum
//!
//! Binds the `sdi-client` analysis contract to axum's request
//! lifecycle: every inbound request is described to the SDI backend
//! before the handler runs. Non-blocking verdicts are attached to the
//! request extensions for downstream logging; a blocking verdict
//! short-circuits with HTTP 403 and the handler never executes. The
//! client fails open, so a dead backend costs at most the configured
//! timeout and never a dropped request.
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{routing::post, Extension, Router};
//! use sdi_axum::ServiceGuard;
//! use sdi_client::{AnalysisResult, SdiClient, SdiConfig};
//!
//! async fn create_user(Extension(verdict): Extension<AnalysisResult>) -> &'static str {
//!     if verdict.anomaly_detected {
//!         tracing::info!(severity = %verdict.severity, "suspicious but allowed");
//!     }
//!     "created"
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let sdi = SdiClient::new(SdiConfig::from_env());
//!     let app: Router = Router::new()
//!         .route("/api/users", post(create_user))
//!         .layer(ServiceGuard::new(sdi, "my-service").into_layer());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

#![warn(missing_docs)]

pub mod guard;
pub mod layer;

pub use guard::{ServiceGuard, DEFAULT_MAX_BODY_BYTES};
pub use layer::{SdiLayer, SdiService};

// the adapter attaches these to request extensions; re-export so hosts
// only need one dependency in simple setups
pub use sdi_client::{AnalysisResult, Decision, EnforcementPolicy, Severity};
