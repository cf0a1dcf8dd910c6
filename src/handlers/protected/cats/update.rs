use axum::{extract::Path, response::Json, Extension};
use serde_json::{json, Value};
use validator::Validate;

use crate::database::manager::DatabaseManager;
use crate::database::models::cat::{Cat, CatWrite};
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::middleware::auth::AuthUser;
use crate::validation::ValidationErrors;

use super::utils::{db_message, parse_cat_id, reject_invalid, required};

/// PUT /api/cats/:id - update one of the caller's own cats
///
/// The caller's id rides in the filter next to the cat id, so a cat owned by
/// someone else comes back as "not found" rather than "forbidden".
pub async fn cat_put(
    Path(id): Path<String>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CatWrite>,
) -> Result<Json<Value>, ApiError> {
    let mut errors = ValidationErrors::new();
    let id = parse_cat_id(&id, &mut errors);
    if let Err(field_errors) = body.validate() {
        errors.extend_from_validator(&field_errors);
    }
    reject_invalid(&errors)?;
    let id = required(id, &errors)?;

    let pool = DatabaseManager::pool().await?;
    let cat = Cat::repository(pool)
        .update_one(
            FilterData {
                where_clause: Some(json!({ "id": id, "owner_id": user.id })),
                ..Default::default()
            },
            body.changes(),
        )
        .await?
        .ok_or_else(|| ApiError::not_found("couldn't update cat"))?;

    Ok(Json(db_message("Cat updated", &cat)))
}

/// PUT /api/cats/admin/:id - update any cat, admin only
pub async fn cat_put_admin(
    Path(id): Path<String>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CatWrite>,
) -> Result<Json<Value>, ApiError> {
    let mut errors = ValidationErrors::new();
    let id = parse_cat_id(&id, &mut errors);
    if let Err(field_errors) = body.validate() {
        errors.extend_from_validator(&field_errors);
    }
    reject_invalid(&errors)?;
    let id = required(id, &errors)?;

    if !user.role.is_admin() {
        return Err(ApiError::forbidden("admin only"));
    }

    let pool = DatabaseManager::pool().await?;
    let cat = Cat::repository(pool)
        .update_one(
            FilterData {
                where_clause: Some(json!({ "id": id })),
                ..Default::default()
            },
            body.changes(),
        )
        .await?
        .ok_or_else(|| ApiError::not_found("couldn't update cat"))?;

    Ok(Json(db_message("Cat updated", &cat)))
}
