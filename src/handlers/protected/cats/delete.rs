use axum::{extract::Path, response::Json, Extension};
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::models::cat::Cat;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::middleware::auth::AuthUser;
use crate::validation::ValidationErrors;

use super::utils::{db_message, parse_cat_id, reject_invalid, required};

/// DELETE /api/cats/:id - delete one of the caller's own cats
pub async fn cat_delete(
    Path(id): Path<String>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let mut errors = ValidationErrors::new();
    let id = parse_cat_id(&id, &mut errors);
    reject_invalid(&errors)?;
    let id = required(id, &errors)?;

    let pool = DatabaseManager::pool().await?;
    let cat = Cat::repository(pool)
        .delete_one(FilterData {
            where_clause: Some(json!({ "id": id, "owner_id": user.id })),
            ..Default::default()
        })
        .await?
        .ok_or_else(|| ApiError::not_found("couldn't delete cat"))?;

    Ok(Json(db_message("Cat deleted", &cat)))
}

/// DELETE /api/cats/admin/:id - delete any cat, admin only
pub async fn cat_delete_admin(
    Path(id): Path<String>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let mut errors = ValidationErrors::new();
    let id = parse_cat_id(&id, &mut errors);
    reject_invalid(&errors)?;
    let id = required(id, &errors)?;

    if !user.role.is_admin() {
        return Err(ApiError::forbidden("admin only"));
    }

    let pool = DatabaseManager::pool().await?;
    let cat = Cat::repository(pool)
        .delete_one(FilterData {
            where_clause: Some(json!({ "id": id })),
            ..Default::default()
        })
        .await?
        .ok_or_else(|| ApiError::not_found("couldn't delete cat"))?;

    Ok(Json(db_message("Cat deleted", &cat)))
}
