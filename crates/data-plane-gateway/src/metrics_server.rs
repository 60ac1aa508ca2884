//! Internal-only listener for metrics and health.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub fn build_router() -> axum::Router {
    use axum::routing::get;

    let prom = PrometheusBuilder::new()
        .set_buckets(
            &prometheus::exponential_buckets(0.00001, 2.5, 15)
                .expect("calculating histogram buckets"),
        )
        .expect("calculating histogram buckets")
        .install_recorder()
        .expect("failed to install prometheus recorder");

    axum::Router::new()
        .route("/metrics", get(prometheus_metrics))
        .route("/healthz", get(healthz))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(prom)
}

async fn healthz() -> &'static str {
    "OK"
}

#[tracing::instrument(skip_all)]
async fn prometheus_metrics(
    axum::extract::State(prom_handle): axum::extract::State<PrometheusHandle>,
) -> (axum::http::StatusCode, String) {
    (axum::http::StatusCode::OK, prom_handle.render())
}
