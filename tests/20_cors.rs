mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};

// CORS headers follow the configured origin list. Tests run against the
// development configuration, which allows the two localhost dev origins.

#[tokio::test]
async fn listed_origin_gets_cors_headers() {
    let req = Request::builder()
        .method("GET")
        .uri("/")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let res = common::send(req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );
}

#[tokio::test]
async fn unlisted_origin_gets_no_cors_headers() {
    let req = Request::builder()
        .method("GET")
        .uri("/")
        .header("origin", "https://elsewhere.example.com")
        .body(Body::empty())
        .unwrap();

    let res = common::send(req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("access-control-allow-origin").is_none());
}
