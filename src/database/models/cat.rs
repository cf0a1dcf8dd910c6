use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::database::repository::Repository;
use crate::geo::Point;

pub const CATS_COLLECTION: &str = "cats";

/// A cat document as stored: flat columns, with the owner snapshot
/// denormalized at creation time and the location split into lng/lat.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cat {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub owner_email: String,
    pub lng: f64,
    pub lat: f64,
    pub birthdate: NaiveDate,
    pub weight: f64,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cat {
    pub fn repository(pool: PgPool) -> Repository<Cat> {
        Repository::new(CATS_COLLECTION, pool)
    }

    pub fn location(&self) -> Point {
        Point::new(self.lng, self.lat)
    }

    /// API shape: nested owner snapshot and GeoJSON location.
    pub fn to_api(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "owner": {
                "id": self.owner_id,
                "user_name": self.owner_name,
                "email": self.owner_email,
            },
            "location": self.location(),
            "birthdate": self.birthdate,
            "weight": self.weight,
            "filename": self.filename,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        })
    }
}

/// Client-writable cat fields. Owner, filename and location never appear
/// here; they are injected server-side on create and immutable on update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CatWrite {
    #[validate(length(min = 2, max = 100, message = "must be between 2 and 100 characters"))]
    pub name: String,
    pub birthdate: NaiveDate,
    #[validate(range(min = 0.1, max = 50.0, message = "must be between 0.1 and 50 kg"))]
    pub weight: f64,
}

impl CatWrite {
    /// Column changes for UPDATE, in a fixed order.
    pub fn changes(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", json!(self.name)),
            ("birthdate", json!(self.birthdate)),
            ("weight", json!(self.weight)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Cat {
        Cat {
            id: Uuid::nil(),
            name: "Siiri".to_string(),
            owner_id: Uuid::nil(),
            owner_name: "matti".to_string(),
            owner_email: "matti@example.com".to_string(),
            lng: 24.9384,
            lat: 60.1699,
            birthdate: NaiveDate::from_ymd_opt(2019, 4, 1).unwrap(),
            weight: 4.2,
            filename: "siiri.jpg".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn api_shape_nests_owner_and_location() {
        let api = sample().to_api();
        assert_eq!(api["owner"]["user_name"], "matti");
        assert_eq!(api["location"]["type"], "Point");
        assert_eq!(api["location"]["coordinates"][0], 24.9384);
        assert_eq!(api["location"]["coordinates"][1], 60.1699);
        assert!(api.get("owner_name").is_none());
    }

    #[test]
    fn write_body_rejects_out_of_range_values() {
        let body = CatWrite {
            name: "S".to_string(),
            birthdate: NaiveDate::from_ymd_opt(2019, 4, 1).unwrap(),
            weight: 100.0,
        };
        let errors = body.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("weight"));
    }

    #[test]
    fn changes_keep_fixed_column_order() {
        let body = CatWrite {
            name: "Siiri".to_string(),
            birthdate: NaiveDate::from_ymd_opt(2019, 4, 1).unwrap(),
            weight: 4.2,
        };
        let columns: Vec<&str> = body.changes().into_iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["name", "birthdate", "weight"]);
    }
}
