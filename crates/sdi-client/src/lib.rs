//! SDI Rust client
//!
//! Client for the Synthetic Digital Immunity (SDI) analysis service.
//! Each inbound request of a protected service is described to the
//! backend, which answers with an anomaly verdict; this crate owns the
//! network contract and its central invariant: **a result is always
//! produced**. A slow, unreachable or misbehaving backend degrades to
//! the safe default instead of surfacing an error, so the protected
//! service's availability never depends on SDI's.
//!
//! # Example
//!
//! ```rust,no_run
//! use sdi_client::{AnalysisRequest, SdiClient, SdiConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let sdi = SdiClient::new(SdiConfig::from_env());
//!
//!     let request = AnalysisRequest::builder("my-service", "/api/endpoint", "POST")
//!         .body(r#"{"user": "data"}"#)
//!         .build();
//!
//!     let result = sdi.analyze(&request).await;
//!     if result.anomaly_detected {
//!         println!("anomaly detected, score {}", result.anomaly_score);
//!     }
//! }
//! ```
//!
//! Framework adapters (see `sdi-axum`) build on [`SdiClient`] plus
//! [`EnforcementPolicy`], which turns a result into an allow/block
//! decision without the adapter hardcoding severity semantics.

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod policy;
pub mod types;

pub use client::SdiClient;
pub use config::{SdiConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::ClientError;
pub use policy::{Decision, EnforcementPolicy};
pub use types::{AnalysisRequest, AnalysisRequestBuilder, AnalysisResult, Severity};
