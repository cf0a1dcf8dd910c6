use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_jwt, password_digest, Claims, Role};
use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::models::user::User;
use crate::database::repository::Repository;
use crate::error::ApiError;
use crate::filter::FilterData;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - Authenticate user and receive JWT token
///
/// The token carries the user id, user_name, email and role; protected cat
/// routes read these from the Bearer header via the auth middleware.
pub async fn login_post(Json(payload): Json<LoginRequest>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let users = Repository::<User>::new("users", pool);

    let user = users
        .select_one(FilterData {
            where_clause: Some(json!({ "email": payload.email })),
            ..Default::default()
        })
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if password_digest(&payload.password) != user.password {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let role = Role::from_db(&user.role);
    let claims = Claims::new(user.id, user.user_name.clone(), user.email.clone(), role);
    let token = generate_jwt(claims).map_err(|e| {
        tracing::error!("Token generation failed: {}", e);
        ApiError::internal_server_error("Something went wrong with the server")
    })?;

    Ok(Json(json!({
        "token": token,
        "user": {
            "id": user.id,
            "user_name": user.user_name,
            "email": user.email,
            "role": role,
        },
        "expires_in": config::config().security.jwt_expiry_hours * 3600,
    })))
}
