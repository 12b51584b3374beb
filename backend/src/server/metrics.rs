//! Request metrics served at `/metrics` when the `metrics` feature is on.
//!
//! Probe traffic is excluded so orchestrator polling does not drown out the
//! account and billing series.

use actix_service::{
    Service, ServiceExt as _, Transform,
    boxed::{self, BoxService},
};
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use futures_util::future::{LocalBoxFuture, ready};

/// Path the exporter answers on.
pub const METRICS_PATH: &str = "/metrics";
const NAMESPACE: &str = "tenantry";
const UNMATCHED_PATTERN: &str = "UNKNOWN";

/// Prometheus middleware labelled for this service.
///
/// # Errors
/// Returns [`std::io::Error`] when the collectors cannot be registered.
pub fn prometheus_metrics() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new(NAMESPACE)
        .endpoint(METRICS_PATH)
        .exclude("/health/ready")
        .exclude("/health/live")
        .mask_unmatched_patterns(UNMATCHED_PATTERN)
        .build()
        .map_err(|err| std::io::Error::other(format!("configure Prometheus metrics: {err}")))
}

/// Wraps the app in Prometheus middleware when one was configured.
///
/// Either way the wrapped service is boxed, so `create_server` sees one
/// concrete app type.
#[derive(Clone, Default)]
pub(crate) struct MetricsLayer(Option<PrometheusMetrics>);

impl MetricsLayer {
    pub(crate) fn new(metrics: Option<PrometheusMetrics>) -> Self {
        Self(metrics)
    }
}

type BoxedService = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;

impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxedService;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let Some(metrics) = self.0.clone() else {
            let plain = service.map(ServiceResponse::map_into_boxed_body);
            return Box::pin(ready(Ok(boxed::service(plain))));
        };
        let pending = Compat::new(metrics).new_transform(service);
        Box::pin(async move { pending.await.map(boxed::service) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    async fn scrape(layer: MetricsLayer) -> (StatusCode, String) {
        let app = test::init_service(
            App::new()
                .wrap(layer)
                .route("/api/v1/entitlement", web::get().to(HttpResponse::Ok))
                .route("/health/live", web::get().to(HttpResponse::Ok)),
        )
        .await;
        for uri in ["/api/v1/entitlement", "/health/live"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            test::call_service(&app, req).await;
        }
        let req = test::TestRequest::get().uri(METRICS_PATH).to_request();
        let res = test::call_service(&app, req).await;
        let status = res.status();
        let body = test::read_body(res).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[rstest]
    #[actix_web::test]
    async fn api_requests_are_counted_but_probes_are_not() {
        let metrics = prometheus_metrics().expect("metrics build");
        let (status, body) = scrape(MetricsLayer::new(Some(metrics))).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("tenantry_http_requests_total"));
        assert!(body.contains("/api/v1/entitlement"));
        assert!(!body.contains("/health/live"));
    }

    #[rstest]
    #[actix_web::test]
    async fn disabled_layer_serves_no_exporter() {
        let (status, _) = scrape(MetricsLayer::default()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
