//! The REST surface of the base domain: health, the schema-inference
//! passthrough, and CORS.

use anyhow::Context;
use axum::extract::{RawQuery, State};
use axum::response::IntoResponse;
use axum::routing::get;
use http::header;

#[derive(Clone)]
struct RestState {
    http: reqwest::Client,
    inference_address: String,
}

pub fn build_router(inference_address: String, cors_origin: &str) -> anyhow::Result<axum::Router> {
    let router = axum::Router::new()
        .route("/healthz", get(healthz))
        .route("/infer_schema", get(infer_schema))
        .with_state(RestState {
            http: reqwest::Client::new(),
            inference_address,
        })
        .layer(cors_layer(cors_origin)?)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    Ok(router)
}

async fn healthz() -> &'static str {
    "OK"
}

// Pass /infer_schema through to the schema-inference service, preserving the
// query string and response verbatim.
async fn infer_schema(
    State(state): State<RestState>,
    RawQuery(query): RawQuery,
) -> axum::response::Response {
    let url = format!(
        "{}/infer_schema?{}",
        state.inference_address.trim_end_matches('/'),
        query.unwrap_or_default(),
    );

    match state.http.get(&url).send().await {
        Ok(resp) => {
            let status = resp.status().as_u16();
            let body = resp.bytes().await.unwrap_or_default();
            (
                http::StatusCode::from_u16(status).unwrap_or(http::StatusCode::BAD_GATEWAY),
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, url, "schema inference request failed");
            (
                http::StatusCode::SERVICE_UNAVAILABLE,
                axum::Json(serde_json::json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

// CORS in the manner of the original REST gateway: a comma-separated list of
// origin regexes, with `*` admitting any origin.
fn cors_layer(cors_origin: &str) -> anyhow::Result<tower_http::cors::CorsLayer> {
    use tower_http::cors::{AllowOrigin, CorsLayer};

    let layer = CorsLayer::new()
        .allow_methods([http::Method::GET, http::Method::POST, http::Method::OPTIONS])
        .allow_headers([
            header::CACHE_CONTROL,
            header::CONTENT_LANGUAGE,
            header::CONTENT_LENGTH,
            header::CONTENT_TYPE,
            header::EXPIRES,
            header::LAST_MODIFIED,
            header::PRAGMA,
            header::AUTHORIZATION,
        ]);

    if cors_origin == "*" {
        return Ok(layer.allow_origin(tower_http::cors::Any));
    }

    let patterns = cors_origin
        .split(',')
        .map(|pattern| regex::Regex::new(pattern.trim()))
        .collect::<Result<Vec<_>, _>>()
        .context("parsing cors-origin patterns")?;

    Ok(
        layer.allow_origin(AllowOrigin::predicate(move |origin, _parts| {
            origin
                .to_str()
                .is_ok_and(|origin| patterns.iter().any(|re| re.is_match(origin)))
        })),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_healthz() {
        let router = build_router("http://localhost:9090".to_string(), "*").unwrap();
        let resp = router
            .oneshot(
                http::Request::builder()
                    .uri("/healthz")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::OK);
    }

    #[test]
    fn test_invalid_cors_pattern_is_a_startup_error() {
        assert!(cors_layer("https://.*\\.example\\.com").is_ok());
        assert!(cors_layer("[invalid").is_err());
    }
}
