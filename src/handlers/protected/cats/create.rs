use axum::{extract::Multipart, response::Json, Extension};
use serde_json::{json, Value};
use validator::Validate;

use crate::database::manager::DatabaseManager;
use crate::database::models::cat::{Cat, CatWrite};
use crate::error::ApiError;
use crate::geo::LatLng;
use crate::middleware::auth::AuthUser;
use crate::upload;
use crate::validation::ValidationErrors;

use super::utils::{db_message, reject_invalid, required};

/// POST /api/cats - create a cat from a multipart form
///
/// Expects three parts: `cat` (JSON body with the writable fields), `file`
/// (the image) and `coords` (a "lat,lng" pair for the photo location). Owner
/// fields come from the authenticated caller, never from the body.
pub async fn cat_post(
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let parts = upload::collect(&mut multipart).await.map_err(|e| {
        tracing::warn!("Multipart read failed: {}", e);
        ApiError::bad_request("Invalid value: cat")
    })?;

    let mut errors = ValidationErrors::new();

    let body = match parts.cat_json.as_deref() {
        Some(raw) => match serde_json::from_str::<CatWrite>(raw) {
            Ok(body) => {
                if let Err(field_errors) = body.validate() {
                    errors.extend_from_validator(&field_errors);
                    None
                } else {
                    Some(body)
                }
            }
            Err(_) => {
                errors.push("Invalid value", "cat");
                None
            }
        },
        None => {
            errors.push("Invalid value", "cat");
            None
        }
    };

    if parts.file_bytes.is_none() {
        errors.push("Invalid value", "file");
    }

    let coords = match parts.coords_raw.as_deref().and_then(LatLng::parse) {
        Some(coords) => Some(coords),
        None => {
            errors.push("must be a lat,lng pair", "coords");
            None
        }
    };

    reject_invalid(&errors)?;
    let body = required(body, &errors)?;
    let coords = required(coords, &errors)?;
    let file_bytes = required(parts.file_bytes, &errors)?;
    let original_name = parts.file_name.unwrap_or_else(|| "upload".to_string());

    upload::persist(&original_name, &file_bytes).await.map_err(|e| {
        tracing::error!("Upload write failed: {}", e);
        ApiError::internal_server_error("Something went wrong with the server")
    })?;

    let pool = DatabaseManager::pool().await?;
    let cat = Cat::repository(pool)
        .insert_one(insert_columns(&body, &user, coords, &original_name))
        .await?
        .ok_or_else(|| ApiError::not_found("No cats added"))?;

    Ok(Json(db_message("Cat created", &cat)))
}

/// Columns for the new row. The writable fields come from the body; the owner
/// snapshot comes from the authenticated caller and location/filename from
/// the upload parts, so nothing the client puts in the document can set them.
fn insert_columns(
    body: &CatWrite,
    user: &AuthUser,
    coords: LatLng,
    filename: &str,
) -> Vec<(&'static str, Value)> {
    vec![
        ("name", json!(body.name)),
        ("birthdate", json!(body.birthdate)),
        ("weight", json!(body.weight)),
        ("owner_id", json!(user.id)),
        ("owner_name", json!(user.user_name)),
        ("owner_email", json!(user.email)),
        ("lng", json!(coords.lng)),
        ("lat", json!(coords.lat)),
        ("filename", json!(filename)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use std::collections::HashMap;
    use uuid::Uuid;

    // A body that tries to smuggle in its own owner, filename and location.
    const SPOOFED_BODY: &str = r#"{
        "name": "Siiri",
        "birthdate": "2019-04-01",
        "weight": 4.2,
        "owner": {
            "id": "11111111-1111-4111-8111-111111111111",
            "user_name": "mallory",
            "email": "mallory@example.com"
        },
        "filename": "forged.jpg",
        "location": { "type": "Point", "coordinates": [1.0, 2.0] }
    }"#;

    #[test]
    fn body_drops_owner_filename_and_location_keys() {
        let body: CatWrite = serde_json::from_str(SPOOFED_BODY).unwrap();
        assert_eq!(body.name, "Siiri");
        assert_eq!(body.weight, 4.2);

        // The change-set carries only the writable columns
        let columns: Vec<&str> = body.changes().into_iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["name", "birthdate", "weight"]);
    }

    #[test]
    fn owner_and_upload_columns_come_from_the_caller() {
        let body: CatWrite = serde_json::from_str(SPOOFED_BODY).unwrap();
        let user = AuthUser {
            id: Uuid::new_v4(),
            user_name: "matti".to_string(),
            email: "matti@example.com".to_string(),
            role: Role::User,
        };
        let coords = LatLng { lat: 60.1699, lng: 24.9384 };

        let columns = insert_columns(&body, &user, coords, "siiri.jpg");
        let by_name: HashMap<&str, &Value> = columns.iter().map(|(c, v)| (*c, v)).collect();

        assert_eq!(by_name["owner_id"], &json!(user.id));
        assert_eq!(by_name["owner_name"], &json!("matti"));
        assert_eq!(by_name["owner_email"], &json!("matti@example.com"));
        assert_eq!(by_name["filename"], &json!("siiri.jpg"));
        assert_eq!(by_name["lng"], &json!(24.9384));
        assert_eq!(by_name["lat"], &json!(60.1699));

        // Nothing the spoofed body supplied for those fields survives
        for (_, value) in &columns {
            assert_ne!(*value, json!("mallory"));
            assert_ne!(*value, json!("mallory@example.com"));
            assert_ne!(*value, json!("forged.jpg"));
            assert_ne!(*value, json!("11111111-1111-4111-8111-111111111111"));
        }
    }
}
