//! Tower layer wiring the guard into a request lifecycle
//!
//! Per request: received -> analyzed -> allowed | blocked. The analyzed
//! state is entered unconditionally because the client fails open; the
//! only short-circuit is a blocking decision.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::{stream, StreamExt};
use metrics::counter;
use sdi_client::{AnalysisResult, Decision};
use tower::{Layer, Service};
use tracing::warn;

use crate::guard::ServiceGuard;

/// Layer that intercepts every request through a [`ServiceGuard`].
#[derive(Debug, Clone)]
pub struct SdiLayer {
    guard: Arc<ServiceGuard>,
}

impl SdiLayer {
    /// Build a layer from a configured guard.
    pub fn new(guard: ServiceGuard) -> Self {
        Self {
            guard: Arc::new(guard),
        }
    }
}

impl<S> Layer<S> for SdiLayer {
    type Service = SdiService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SdiService {
            inner,
            guard: Arc::clone(&self.guard),
        }
    }
}

/// Service produced by [`SdiLayer`].
#[derive(Debug, Clone)]
pub struct SdiService<S> {
    inner: S,
    guard: Arc<ServiceGuard>,
}

impl<S> Service<Request<Body>> for SdiService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        // the clone is the ready service, keep it and store the spare
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let guard = Arc::clone(&self.guard);

        Box::pin(async move {
            if !guard.is_enabled() {
                return inner.call(request).await;
            }

            let (parts, body) = request.into_parts();
            let (text, body) = buffer_body(body, guard.max_body()).await;

            let result = guard.analyze(&parts, text).await;

            match guard.decide(&result) {
                Decision::Block => {
                    warn!(
                        service_id = guard.service_id(),
                        path = parts.uri.path(),
                        score = result.anomaly_score,
                        severity = %result.severity,
                        "blocking request"
                    );
                    counter!(
                        "sdi_requests_blocked_total",
                        "service" => guard.service_id().to_string()
                    )
                    .increment(1);
                    Ok(blocked_response(&result))
                }
                Decision::Allow => {
                    let mut request = Request::from_parts(parts, body);
                    request.extensions_mut().insert(result);
                    inner.call(request).await
                }
            }
        })
    }
}

/// Fixed rejection sent for blocked requests.
fn blocked_response(result: &AnalysisResult) -> Response {
    let body = serde_json::json!({
        "error": "request blocked by SDI",
        "anomalyScore": result.anomaly_score,
        "severity": result.severity,
    });
    (StatusCode::FORBIDDEN, Json(body)).into_response()
}

/// Buffer the body up to `limit` bytes and hand back an equivalent body
/// for the inner service.
///
/// The common case (body within the cap) collapses to a single owned
/// buffer. Past the cap the analysis sees only the buffered prefix and
/// the remainder is forwarded unread; a mid-stream read error is
/// replayed to the inner service so the host fails the same way it
/// would have without interception.
async fn buffer_body(body: Body, limit: usize) -> (String, Body) {
    let mut tail = body.into_data_stream();
    let mut chunks: Vec<Bytes> = Vec::new();
    let mut buffered = 0usize;

    while buffered < limit {
        match tail.next().await {
            Some(Ok(chunk)) => {
                buffered += chunk.len();
                chunks.push(chunk);
            }
            Some(Err(err)) => {
                warn!(error = %err, "failed to read request body");
                let text = lossy_text(&chunks);
                let replay = stream::iter(chunks.into_iter().map(Ok::<_, axum::Error>))
                    .chain(stream::once(async move { Err(err) }));
                return (text, Body::from_stream(replay));
            }
            None => {
                let bytes = chunks.concat();
                let text = String::from_utf8_lossy(&bytes).into_owned();
                return (text, Body::from(bytes));
            }
        }
    }

    let text = lossy_text(&chunks);
    let prefix = stream::iter(chunks.into_iter().map(Ok::<_, axum::Error>));
    (text, Body::from_stream(prefix.chain(tail)))
}

fn lossy_text(chunks: &[Bytes]) -> String {
    String::from_utf8_lossy(&chunks.concat()).into_owned()
}
