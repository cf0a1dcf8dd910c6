#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use cat_api_rust::auth::{generate_jwt, Claims, Role};

/// Mint a token for a synthetic caller. Tests run against the development
/// configuration, so the signing secret is the built-in dev default.
pub fn token(role: Role) -> String {
    let claims = Claims::new(
        Uuid::new_v4(),
        "testeri".to_string(),
        "testeri@example.com".to_string(),
        role,
    );
    generate_jwt(claims).expect("dev secret is configured")
}

/// Drive one request through a fresh router without binding a socket.
pub async fn send(request: Request<Body>) -> Response<Body> {
    cat_api_rust::app()
        .oneshot(request)
        .await
        .expect("router is infallible")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

pub fn get_authed(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .expect("request builds")
}

pub fn json_authed(method: &str, uri: &str, token: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}
