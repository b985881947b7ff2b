use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::geo::{Coordinate, Extent};

use super::manager::DatabaseError;
use super::models::{Cat, CatRow, CatWithOwner, CatWithOwnerRow};

/// Fields required to persist a new cat. Ownership and default location
/// are resolved by the service layer before this reaches the store.
#[derive(Debug, Clone)]
pub struct NewCat {
    pub owner: Uuid,
    pub name: String,
    pub species: String,
    pub location: Option<Coordinate>,
}

/// Partial update; `None` fields are left untouched. `owner` is only
/// honored on the elevated update path.
#[derive(Debug, Clone, Default)]
pub struct CatPatch {
    pub name: Option<String>,
    pub species: Option<String>,
    pub location: Option<Coordinate>,
    pub owner: Option<Uuid>,
}

/// Storage contract for cats. The `*_owned` mutations fold the ownership
/// check into the query predicate; a non-owner caller gets `None` back,
/// indistinguishable from a missing row.
#[async_trait]
pub trait CatStore: Send + Sync {
    async fn insert(&self, cat: NewCat) -> Result<Cat, DatabaseError>;

    async fn find(&self, id: Uuid) -> Result<Option<CatWithOwner>, DatabaseError>;

    async fn list(&self, limit: Option<i64>, offset: i64) -> Result<Vec<Cat>, DatabaseError>;

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<CatWithOwner>, DatabaseError>;

    /// Cats whose location falls inside the given lat/lng extent. Cats
    /// without a location are excluded. The exact polygon containment
    /// test runs in the query engine on top of this prefilter.
    async fn list_located_in(&self, extent: Extent) -> Result<Vec<Cat>, DatabaseError>;

    async fn update_owned(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: CatPatch,
    ) -> Result<Option<Cat>, DatabaseError>;

    async fn update_any(&self, id: Uuid, patch: CatPatch) -> Result<Option<Cat>, DatabaseError>;

    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<Cat>, DatabaseError>;

    async fn delete_any(&self, id: Uuid) -> Result<Option<Cat>, DatabaseError>;
}

const CAT_WITH_OWNER_SELECT: &str = "SELECT c.id, c.name, c.species, c.location_lat, c.location_lng, \
     c.created_at, c.updated_at, \
     u.id AS owner_id, u.user_name AS owner_user_name, u.email AS owner_email \
     FROM cats c JOIN users u ON u.id = c.owner";

/// Postgres-backed cat store.
pub struct PgCatStore {
    pool: PgPool,
}

impl PgCatStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatStore for PgCatStore {
    async fn insert(&self, cat: NewCat) -> Result<Cat, DatabaseError> {
        let row = sqlx::query_as::<_, CatRow>(
            "INSERT INTO cats (id, owner, name, species, location_lat, location_lng) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(cat.owner)
        .bind(&cat.name)
        .bind(&cat.species)
        .bind(cat.location.map(|c| c.lat))
        .bind(cat.location.map(|c| c.lng))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find(&self, id: Uuid) -> Result<Option<CatWithOwner>, DatabaseError> {
        let row = sqlx::query_as::<_, CatWithOwnerRow>(&format!(
            "{} WHERE c.id = $1",
            CAT_WITH_OWNER_SELECT
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn list(&self, limit: Option<i64>, offset: i64) -> Result<Vec<Cat>, DatabaseError> {
        // LIMIT NULL means "no limit" in Postgres
        let rows = sqlx::query_as::<_, CatRow>(
            "SELECT * FROM cats ORDER BY created_at, id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<CatWithOwner>, DatabaseError> {
        let rows = sqlx::query_as::<_, CatWithOwnerRow>(&format!(
            "{} WHERE c.owner = $1 ORDER BY c.created_at, c.id",
            CAT_WITH_OWNER_SELECT
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_located_in(&self, extent: Extent) -> Result<Vec<Cat>, DatabaseError> {
        // NULL locations fail the comparison and drop out, as intended.
        let rows = sqlx::query_as::<_, CatRow>(
            "SELECT * FROM cats \
             WHERE location_lat BETWEEN $1 AND $2 \
             AND location_lng BETWEEN $3 AND $4",
        )
        .bind(extent.min_lat)
        .bind(extent.max_lat)
        .bind(extent.min_lng)
        .bind(extent.max_lng)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: CatPatch,
    ) -> Result<Option<Cat>, DatabaseError> {
        let row = sqlx::query_as::<_, CatRow>(
            "UPDATE cats SET \
             name = COALESCE($3, name), \
             species = COALESCE($4, species), \
             location_lat = COALESCE($5, location_lat), \
             location_lng = COALESCE($6, location_lng), \
             updated_at = now() \
             WHERE id = $1 AND owner = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner)
        .bind(patch.name)
        .bind(patch.species)
        .bind(patch.location.map(|c| c.lat))
        .bind(patch.location.map(|c| c.lng))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn update_any(&self, id: Uuid, patch: CatPatch) -> Result<Option<Cat>, DatabaseError> {
        let row = sqlx::query_as::<_, CatRow>(
            "UPDATE cats SET \
             owner = COALESCE($2, owner), \
             name = COALESCE($3, name), \
             species = COALESCE($4, species), \
             location_lat = COALESCE($5, location_lat), \
             location_lng = COALESCE($6, location_lng), \
             updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(patch.owner)
        .bind(patch.name)
        .bind(patch.species)
        .bind(patch.location.map(|c| c.lat))
        .bind(patch.location.map(|c| c.lng))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<Cat>, DatabaseError> {
        let row = sqlx::query_as::<_, CatRow>(
            "DELETE FROM cats WHERE id = $1 AND owner = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn delete_any(&self, id: Uuid) -> Result<Option<Cat>, DatabaseError> {
        let row = sqlx::query_as::<_, CatRow>("DELETE FROM cats WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }
}
