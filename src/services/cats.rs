use serde::Deserialize;
use uuid::Uuid;

use crate::config;
use crate::database::cats::{CatPatch, CatStore, NewCat};
use crate::database::models::{Cat, CatWithOwner};
use crate::error::ApiError;
use crate::geo::{BoundingPolygon, Coordinate};
use crate::policy::{self, Action, Principal, Role, CAT_CAPS};

use super::Page;

/// Body for creating a cat. `owner` is only honored when the caller is
/// an admin; everyone else becomes the owner of what they create.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCatRequest {
    pub name: String,
    pub species: String,
    pub location: Option<Coordinate>,
    pub owner: Option<Uuid>,
}

/// Body for the owner-path update. Ownership is not expressible here;
/// reassignment goes through the admin path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCatRequest {
    pub name: Option<String>,
    pub species: Option<String>,
    pub location: Option<Coordinate>,
}

/// Body for the admin-path update, which may also reassign ownership.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminUpdateCatRequest {
    pub name: Option<String>,
    pub species: Option<String>,
    pub location: Option<Coordinate>,
    pub owner: Option<Uuid>,
}

/// Query engine and orchestration for cat resources: pagination,
/// spatial containment filtering, and policy enforcement ahead of
/// every mutation.
pub struct CatService<'a, S> {
    store: &'a S,
}

impl<'a, S: CatStore> CatService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn create(&self, principal: Principal, req: CreateCatRequest) -> Result<Cat, ApiError> {
        policy::decide(CAT_CAPS, Action::Create, Some(principal), None)?;

        if req.name.trim().is_empty() {
            return Err(ApiError::validation_error(
                "Cat name must not be empty",
                None,
            ));
        }

        let owner = match (principal.role, req.owner) {
            (Role::Admin, Some(assignee)) => assignee,
            _ => principal.id,
        };
        let location = match req.location {
            Some(c) => validated(c)?,
            None => default_spawn_location()?,
        };

        let cat = self
            .store
            .insert(NewCat {
                owner,
                name: req.name,
                species: req.species,
                location: Some(location),
            })
            .await?;
        tracing::info!(cat_id = %cat.id, owner = %owner, "cat created");
        Ok(cat)
    }

    pub async fn get(&self, id: Uuid) -> Result<CatWithOwner, ApiError> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Cat not found"))
    }

    pub async fn list(&self, page: Page) -> Result<Vec<Cat>, ApiError> {
        Ok(self.store.list(page.limit, page.offset).await?)
    }

    pub async fn list_by_owner(&self, principal: Principal) -> Result<Vec<CatWithOwner>, ApiError> {
        Ok(self.store.list_by_owner(principal.id).await?)
    }

    /// Cats within the bounding box spanned by two raw "lat,lng" corner
    /// strings. The store prefilters on the box extent; the exact
    /// boundary-inclusive containment test runs here. Cats without a
    /// location never appear.
    pub async fn list_within(&self, top_right: &str, bottom_left: &str) -> Result<Vec<Cat>, ApiError> {
        let top_right = Coordinate::parse(top_right)?;
        let bottom_left = Coordinate::parse(bottom_left)?;
        let polygon = BoundingPolygon::from_corners(top_right, bottom_left)?;

        let candidates = self.store.list_located_in(polygon.extent()).await?;
        Ok(candidates
            .into_iter()
            .filter(|cat| cat.location.is_some_and(|loc| polygon.contains(loc)))
            .collect())
    }

    /// Owner-path update. The ownership check is folded into the store
    /// predicate, so updating someone else's cat reports `Cat not found`
    /// rather than confirming the cat exists.
    pub async fn update_owned(
        &self,
        principal: Principal,
        id: Uuid,
        req: UpdateCatRequest,
    ) -> Result<Cat, ApiError> {
        let patch = CatPatch {
            name: req.name,
            species: req.species,
            location: req.location.map(validated).transpose()?,
            owner: None,
        };
        self.store
            .update_owned(id, principal.id, patch)
            .await?
            .ok_or_else(|| ApiError::not_found("Cat not found"))
    }

    /// Admin-path update, including owner reassignment. Unlike the owner
    /// path, a missing cat and an unauthorized caller report distinctly.
    pub async fn update_admin(
        &self,
        principal: Principal,
        id: Uuid,
        req: AdminUpdateCatRequest,
    ) -> Result<Cat, ApiError> {
        policy::decide(CAT_CAPS, Action::ReassignOwner, Some(principal), None)?;

        let patch = CatPatch {
            name: req.name,
            species: req.species,
            location: req.location.map(validated).transpose()?,
            owner: req.owner,
        };
        self.store
            .update_any(id, patch)
            .await?
            .ok_or_else(|| ApiError::not_found("Cat not found"))
    }

    /// Owner-path delete with the same folded predicate as
    /// [`Self::update_owned`].
    pub async fn delete_owned(&self, principal: Principal, id: Uuid) -> Result<Cat, ApiError> {
        self.store
            .delete_owned(id, principal.id)
            .await?
            .ok_or_else(|| ApiError::not_found("Cat not found"))
    }

    pub async fn delete_admin(&self, principal: Principal, id: Uuid) -> Result<Cat, ApiError> {
        policy::decide(CAT_CAPS, Action::AdminDelete, Some(principal), None)?;
        self.store
            .delete_any(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Cat not found"))
    }
}

fn validated(c: Coordinate) -> Result<Coordinate, ApiError> {
    // Deserialized coordinates bypass the range checks in the parser.
    Ok(Coordinate::new(c.lat, c.lng)?)
}

fn default_spawn_location() -> Result<Coordinate, ApiError> {
    Coordinate::parse(&config::config().api.default_location).map_err(|e| {
        tracing::error!("Configured DEFAULT_LOCATION is unusable: {}", e);
        ApiError::internal_server_error("Service misconfigured")
    })
}
