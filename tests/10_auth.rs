mod common;

use axum::http::StatusCode;
use cat_api_rust::auth::Role;

// Token handling on the protected router. None of these requests get past
// the auth middleware, so no database is needed.

#[tokio::test]
async fn root_endpoint_is_public() {
    let res = common::send(common::get("/")).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = common::body_json(res).await;
    assert_eq!(body["success"], true);
    assert!(body["data"]["endpoints"]["cats"].is_string());
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let res = common::send(common::get("/api/cats")).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = common::body_json(res).await;
    assert_eq!(body["error"], true);
    assert_eq!(body["message"], "Missing Authorization header");
}

#[tokio::test]
async fn non_bearer_scheme_is_unauthorized() {
    let req = axum::http::Request::builder()
        .method("GET")
        .uri("/api/cats")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = common::send(req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = common::body_json(res).await;
    assert_eq!(body["message"], "Authorization header must use Bearer token format");
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let res = common::send(common::get_authed("/api/cats", "not.a.jwt")).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = common::body_json(res).await;
    assert_eq!(body["error"], true);
    assert!(
        body["message"].as_str().unwrap_or("").starts_with("Invalid JWT token"),
        "unexpected message: {}",
        body["message"]
    );
}

#[tokio::test]
async fn valid_token_reaches_validation() {
    // A real token gets past the middleware; the invalid id then fails
    // validation, proving the request reached the handler.
    let token = common::token(Role::User);
    let res = common::send(common::get_authed("/api/cats/not-a-uuid", &token)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
