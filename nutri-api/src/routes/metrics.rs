use actix_web::{HttpResponse, Responder, get, web::ThinData};
use metrics_exporter_prometheus::PrometheusHandle;

/// Renders all recorded metrics in the Prometheus text format.
#[get("/metrics")]
pub async fn metrics(handle: ThinData<PrometheusHandle>) -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(handle.render())
}
