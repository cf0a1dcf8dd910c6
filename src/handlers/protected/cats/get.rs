use axum::{extract::Path, response::Json, Extension};
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::models::cat::Cat;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::middleware::auth::AuthUser;
use crate::validation::ValidationErrors;

use super::utils::{cats_to_api, parse_cat_id, reject_invalid, required};

/// GET /api/cats - list every cat
pub async fn cat_list_get() -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let cats = Cat::repository(pool).select_any(FilterData::default()).await?;

    if cats.is_empty() {
        return Err(ApiError::not_found("No cats found"));
    }
    Ok(Json(cats_to_api(&cats)))
}

/// GET /api/cats/user - list the caller's own cats
pub async fn cat_get_by_user(Extension(user): Extension<AuthUser>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let cats = Cat::repository(pool)
        .select_any(FilterData {
            where_clause: Some(json!({ "owner_id": user.id })),
            ..Default::default()
        })
        .await?;

    if cats.is_empty() {
        return Err(ApiError::not_found("No cats found"));
    }
    Ok(Json(cats_to_api(&cats)))
}

/// GET /api/cats/:id - single cat by id
pub async fn cat_get(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let mut errors = ValidationErrors::new();
    let id = parse_cat_id(&id, &mut errors);
    reject_invalid(&errors)?;
    let id = required(id, &errors)?;

    let pool = DatabaseManager::pool().await?;
    let cat = Cat::repository(pool)
        .select_one(FilterData {
            where_clause: Some(json!({ "id": id })),
            ..Default::default()
        })
        .await?
        .ok_or_else(|| ApiError::not_found("No cats found"))?;

    Ok(Json(cat.to_api()))
}
