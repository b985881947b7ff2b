use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::geo::Coordinate;

use super::UserPublic;

/// Flat persistence row for a cat. `location` is stored as two nullable
/// doubles so cats without a known position remain representable.
#[derive(Debug, Clone, FromRow)]
pub struct CatRow {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub species: String,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// API shape of a cat with the owner as a bare id reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cat {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub species: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CatRow> for Cat {
    fn from(row: CatRow) -> Self {
        let location = match (row.location_lat, row.location_lng) {
            (Some(lat), Some(lng)) => Some(Coordinate { lat, lng }),
            _ => None,
        };
        Self {
            id: row.id,
            owner: row.owner,
            name: row.name,
            species: row.species,
            location,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Join row for reads that expand the owner. Only the owner's public
/// fields are ever selected.
#[derive(Debug, Clone, FromRow)]
pub struct CatWithOwnerRow {
    pub id: Uuid,
    pub name: String,
    pub species: String,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_id: Uuid,
    pub owner_user_name: String,
    pub owner_email: String,
}

/// API shape of a cat with the owner expanded to their public projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatWithOwner {
    pub id: Uuid,
    pub name: String,
    pub species: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinate>,
    pub owner: UserPublic,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CatWithOwnerRow> for CatWithOwner {
    fn from(row: CatWithOwnerRow) -> Self {
        let location = match (row.location_lat, row.location_lng) {
            (Some(lat), Some(lng)) => Some(Coordinate { lat, lng }),
            _ => None,
        };
        Self {
            id: row.id,
            name: row.name,
            species: row.species,
            location,
            owner: UserPublic {
                id: row.owner_id,
                user_name: row.owner_user_name,
                email: row.owner_email,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_without_location_maps_to_none() {
        let row = CatRow {
            id: Uuid::new_v4(),
            owner: Uuid::new_v4(),
            name: "Nyx".to_string(),
            species: "korat".to_string(),
            location_lat: Some(61.0),
            location_lng: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(Cat::from(row).location, None);
    }

    #[test]
    fn owner_expansion_serializes_public_fields_only() {
        let row = CatWithOwnerRow {
            id: Uuid::new_v4(),
            name: "Mittens".to_string(),
            species: "tabby".to_string(),
            location_lat: Some(61.5),
            location_lng: Some(23.7),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            owner_id: Uuid::new_v4(),
            owner_user_name: "matti".to_string(),
            owner_email: "matti@example.com".to_string(),
        };
        let value = serde_json::to_value(CatWithOwner::from(row)).unwrap();
        let owner = value["owner"].as_object().unwrap();
        assert!(owner.get("password").is_none());
        assert!(owner.get("role").is_none());
        assert_eq!(value["location"]["lat"], 61.5);
    }
}
