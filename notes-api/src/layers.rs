use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::{self, TraceLayer},
};

use crate::config::CorsOrigins;

/// Headers set on every response unless a handler already set them.
pub const SECURITY_HEADERS: [(&str, &str); 11] = [
    ("cross-origin-resource-policy", "same-origin"),
    ("cross-origin-opener-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Security headers wrap CORS so preflight answers carry them too.
pub fn add_http_layers(app: Router, origins: &CorsOrigins) -> Router {
    let app = app.layer(
        ServiceBuilder::new()
            .layer(cors_layer(origins))
            .layer(CompressionLayer::new()),
    );

    SECURITY_HEADERS.into_iter().fold(app, |app, (name, value)| {
        app.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ))
    })
}

pub fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::POST,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    match origins {
        CorsOrigins::Any => cors.allow_origin(Any),
        CorsOrigins::List(origins) => cors.allow_origin(AllowOrigin::list(origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| tracing::warn!("ignoring invalid CORS origin {origin:?}"))
                .ok()
        }))),
    }
}

pub fn add_tracing_layer(app: Router) -> Router {
    app.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace::DefaultMakeSpan::new().include_headers(false))
                    .on_request(trace::DefaultOnRequest::new())
                    .on_response(trace::DefaultOnResponse::new().include_headers(false))
                    .on_failure(trace::DefaultOnFailure::new()),
            ),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        http::{header, HeaderValue, Method},
        routing::get,
        Json,
    };
    use axum_test::TestServer;
    use serde_json::json;

    use super::*;
    use crate::{db::init_test_db, errors::Result, notes::SqliteNoteStore};

    fn server(origins: CorsOrigins) -> TestServer {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .route("/json", get(|| async { Json(json!({ "message": "x".repeat(64) })) }));
        let app = add_http_layers(app, &origins);
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn sets_security_headers() {
        let response = server(CorsOrigins::List(vec![])).get("/").await;

        for (name, value) in SECURITY_HEADERS {
            assert_eq!(response.headers().get(name).unwrap(), value, "{name}");
        }
    }

    #[tokio::test]
    async fn empty_origin_list_blocks_cross_origin_requests() {
        let response = server(CorsOrigins::List(vec![]))
            .get("/")
            .add_header(header::ORIGIN, HeaderValue::from_static("https://a.example"))
            .await;

        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn listed_origin_is_allowed() {
        let response = server(CorsOrigins::List(vec!["https://a.example".into()]))
            .get("/")
            .add_header(header::ORIGIN, HeaderValue::from_static("https://a.example"))
            .await;

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://a.example"
        );
    }

    #[tokio::test]
    async fn preflight_carries_security_headers() {
        let response = server(CorsOrigins::List(vec!["https://a.example".into()]))
            .method(Method::OPTIONS, "/")
            .add_header(header::ORIGIN, HeaderValue::from_static("https://a.example"))
            .add_header(header::ACCESS_CONTROL_REQUEST_METHOD, HeaderValue::from_static("PUT"))
            .await;

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://a.example"
        );
        assert_eq!(response.headers().get("x-frame-options").unwrap(), "SAMEORIGIN");
    }

    #[tokio::test]
    async fn json_responses_are_gzipped_on_request() {
        let response = server(CorsOrigins::List(vec![]))
            .get("/json")
            .add_header(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"))
            .await;

        assert_eq!(response.headers().get(header::CONTENT_ENCODING).unwrap(), "gzip");
        assert_eq!(response.headers().get("x-content-type-options").unwrap(), "nosniff");
    }

    #[tokio::test]
    async fn app_responses_carry_security_headers() -> Result<()> {
        let store = Arc::new(SqliteNoteStore::new(init_test_db().await?));
        let server = crate::tests::test_server(store, crate::notes::router).await?;

        let response = server.get("/").await;

        assert_eq!(response.headers().get("x-frame-options").unwrap(), "SAMEORIGIN");
        Ok(())
    }
}
