use axum::{extract::Query, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::models::cat::Cat;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::geo::{rectangle_bounds, LatLng};
use crate::validation::ValidationErrors;

use super::utils::{cats_to_api, reject_invalid, required};

#[derive(Debug, Deserialize)]
pub struct BoundingBoxQuery {
    #[serde(rename = "topRight")]
    pub top_right: Option<String>,
    #[serde(rename = "bottomLeft")]
    pub bottom_left: Option<String>,
}

/// GET /api/cats/area?topRight=lat,lng&bottomLeft=lat,lng
///
/// Returns the cats whose location falls inside the rectangle spanned by the
/// two corners. Store errors surface with their own message rather than the
/// generic one; this endpoint reports everything it catches verbatim.
pub async fn cat_get_by_bounding_box(
    Query(query): Query<BoundingBoxQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut errors = ValidationErrors::new();
    let top_right = parse_corner(query.top_right.as_deref(), "topRight", &mut errors);
    let bottom_left = parse_corner(query.bottom_left.as_deref(), "bottomLeft", &mut errors);
    reject_invalid(&errors)?;
    let top_right = required(top_right, &errors)?;
    let bottom_left = required(bottom_left, &errors)?;

    let polygon = rectangle_bounds(top_right, bottom_left);

    let pool = DatabaseManager::pool()
        .await
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;
    let cats = Cat::repository(pool)
        .select_any(FilterData {
            where_clause: Some(json!({
                "location": { "$geoWithin": polygon.exterior_ring() },
            })),
            ..Default::default()
        })
        .await
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    if cats.is_empty() {
        return Err(ApiError::not_found("Cats not found"));
    }
    Ok(Json(cats_to_api(&cats)))
}

fn parse_corner(raw: Option<&str>, param: &str, errors: &mut ValidationErrors) -> Option<LatLng> {
    match raw.and_then(LatLng::parse) {
        Some(corner) => Some(corner),
        None => {
            errors.push("must be a lat,lng pair", param);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_corner_is_a_field_error() {
        let mut errors = ValidationErrors::new();
        assert!(parse_corner(None, "topRight", &mut errors).is_none());
        assert!(parse_corner(Some("60.2,24.9"), "bottomLeft", &mut errors).is_some());
        assert_eq!(errors.joined_message(), "must be a lat,lng pair: topRight");
    }

    #[test]
    fn both_corners_invalid_aggregates_both_params() {
        let mut errors = ValidationErrors::new();
        parse_corner(Some("garbage"), "topRight", &mut errors);
        parse_corner(Some("99,999"), "bottomLeft", &mut errors);
        assert_eq!(
            errors.joined_message(),
            "must be a lat,lng pair: topRight, must be a lat,lng pair: bottomLeft"
        );
    }
}
