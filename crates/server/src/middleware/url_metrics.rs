//! URL request counting middleware
//!
//! Counts every request into `<metric_name>{url, method, status}` once the
//! downstream handler has produced a response. The `url` label is the
//! sanitized request path, so dynamic segments collapse to `:id` / `:uuid`.
//!
//! Available both as an axum `from_fn_with_state` middleware and as a tower
//! [`Layer`] for stacks that are not built on axum's router.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    extract::{Request, State},
    http::{self, StatusCode},
    middleware::Next,
    response::Response,
};
use tower::{Layer, Service};
use url_metrics_core::{MetricsConfig, MetricsError, sanitize_label, truncate_label};

use crate::registry::{CounterBinding, MetricsRegistry};

/// Label values derived for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLabels {
    pub url: String,
    pub method: String,
    pub status: String,
}

/// Shared middleware state. Clones share one counter family.
#[derive(Clone)]
pub struct UrlMetrics {
    inner: Arc<UrlMetricsInner>,
}

struct UrlMetricsInner {
    binding: CounterBinding,
    max_label_length: Option<usize>,
}

impl UrlMetrics {
    /// Build the middleware and register its counter family immediately.
    ///
    /// Duplicate or invalid metric names are reported here instead of on the
    /// first request.
    pub fn new(config: &MetricsConfig, registry: &MetricsRegistry) -> Result<Self, MetricsError> {
        let metrics = Self::deferred(config, registry);
        metrics.inner.binding.get().map_err(MetricsError::clone)?;
        Ok(metrics)
    }

    /// Build the middleware, registering the counter family on first request.
    ///
    /// If that registration fails it is logged once and no request is counted.
    pub fn deferred(config: &MetricsConfig, registry: &MetricsRegistry) -> Self {
        Self {
            inner: Arc::new(UrlMetricsInner {
                binding: CounterBinding::new(registry, config.metric_name.clone()),
                max_label_length: config.max_label_length,
            }),
        }
    }

    pub fn metric_name(&self) -> &str {
        self.inner.binding.name()
    }

    /// Tower layer wrapping a service with this middleware
    pub fn layer(&self) -> UrlMetricsLayer {
        UrlMetricsLayer {
            metrics: self.clone(),
        }
    }

    /// Run the one-time registration. Safe to call on every request.
    pub fn ensure_registered(&self) -> bool {
        self.inner.binding.get().is_ok()
    }

    /// Derive the label tuple for a finished request
    pub fn labels(&self, path: &str, method: &str, status: StatusCode) -> RequestLabels {
        let url = sanitize_label(path);
        let url = match self.inner.max_label_length {
            Some(max) => truncate_label(&url, max),
            None => url,
        };
        RequestLabels {
            url,
            method: method.to_string(),
            status: status.as_u16().to_string(),
        }
    }

    /// Count one finished request
    pub fn record(&self, path: &str, method: &str, status: StatusCode) {
        let Ok(counter) = self.inner.binding.get() else {
            return;
        };
        let labels = self.labels(path, method, status);
        tracing::trace!(
            url = %labels.url,
            method = %labels.method,
            status = %labels.status,
            "Counting request"
        );
        counter.increment(&labels.url, &labels.method, &labels.status);
    }
}

/// Middleware that counts requests by sanitized URL, method and status.
///
/// ```ignore
/// let metrics = UrlMetrics::new(&config, &registry)?;
/// let app = Router::new()
///     .route("/", get(handler))
///     .layer(axum::middleware::from_fn_with_state(metrics, url_metrics_middleware));
/// ```
pub async fn url_metrics_middleware(
    State(metrics): State<UrlMetrics>,
    request: Request,
    next: Next,
) -> Response {
    metrics.ensure_registered();

    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    metrics.record(&path, &method, response.status());

    response
}

/// Tower layer for [`UrlMetricsService`]
#[derive(Clone)]
pub struct UrlMetricsLayer {
    metrics: UrlMetrics,
}

impl<S> Layer<S> for UrlMetricsLayer {
    type Service = UrlMetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        UrlMetricsService {
            inner,
            metrics: self.metrics.clone(),
        }
    }
}

/// Service counting each response of the wrapped service
#[derive(Clone)]
pub struct UrlMetricsService<S> {
    inner: S,
    metrics: UrlMetrics,
}

impl<S, ReqBody, ResBody> Service<http::Request<ReqBody>> for UrlMetricsService<S>
where
    S: Service<http::Request<ReqBody>, Response = http::Response<ResBody>>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: http::Request<ReqBody>) -> Self::Future {
        self.metrics.ensure_registered();

        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let metrics = self.metrics.clone();
        let future = self.inner.call(req);

        Box::pin(async move {
            let response = future.await?;
            metrics.record(&path, &method, response.status());
            Ok(response)
        })
    }
}
