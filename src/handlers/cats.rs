use axum::extract::{Path, Query};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::cats::PgCatStore;
use crate::database::manager::DatabaseManager;
use crate::database::models::{Cat, CatWithOwner};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthUser};
use crate::services::cats::{AdminUpdateCatRequest, CreateCatRequest, UpdateCatRequest};
use crate::services::{CatService, Page};

/// Raw pagination values; anything unusable degrades to defaults
/// instead of failing the request.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BoundsQuery {
    #[serde(rename = "topRight")]
    pub top_right: Option<String>,
    #[serde(rename = "bottomLeft")]
    pub bottom_left: Option<String>,
}

async fn store() -> Result<PgCatStore, ApiError> {
    Ok(PgCatStore::new(DatabaseManager::pool().await?))
}

/// GET /api/v1/cats - paged listing
pub async fn cat_list(Query(query): Query<PageQuery>) -> Result<ApiResponse<Vec<Cat>>, ApiError> {
    let store = store().await?;
    let page = Page::from_raw(query.limit.as_deref(), query.offset.as_deref());
    let cats = CatService::new(&store).list(page).await?;
    Ok(ApiResponse::success(cats))
}

/// GET /api/v1/cats/area?topRight=lat,lng&bottomLeft=lat,lng
pub async fn cat_get_by_bounding_box(
    Query(query): Query<BoundsQuery>,
) -> Result<ApiResponse<Vec<Cat>>, ApiError> {
    let top_right = query
        .top_right
        .ok_or_else(|| ApiError::MalformedCoordinate("missing topRight parameter".to_string()))?;
    let bottom_left = query
        .bottom_left
        .ok_or_else(|| ApiError::MalformedCoordinate("missing bottomLeft parameter".to_string()))?;

    let store = store().await?;
    let cats = CatService::new(&store)
        .list_within(&top_right, &bottom_left)
        .await?;
    Ok(ApiResponse::success(cats))
}

/// GET /api/v1/cats/mine - cats owned by the caller
pub async fn cat_get_by_user(user: AuthUser) -> Result<ApiResponse<Vec<CatWithOwner>>, ApiError> {
    let store = store().await?;
    let cats = CatService::new(&store).list_by_owner(user.principal()).await?;
    Ok(ApiResponse::success(cats))
}

/// GET /api/v1/cats/:id - single cat with owner expanded
pub async fn cat_get(Path(id): Path<Uuid>) -> Result<ApiResponse<CatWithOwner>, ApiError> {
    let store = store().await?;
    let cat = CatService::new(&store).get(id).await?;
    Ok(ApiResponse::success(cat))
}

/// POST /api/v1/cats - create a cat owned by the caller
pub async fn cat_post(
    user: AuthUser,
    Json(body): Json<CreateCatRequest>,
) -> Result<ApiResponse<Cat>, ApiError> {
    let store = store().await?;
    let cat = CatService::new(&store).create(user.principal(), body).await?;
    Ok(ApiResponse::created(cat))
}

/// PUT /api/v1/cats/:id - owner-path update
pub async fn cat_put(
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCatRequest>,
) -> Result<ApiResponse<Cat>, ApiError> {
    let store = store().await?;
    let cat = CatService::new(&store)
        .update_owned(user.principal(), id, body)
        .await?;
    Ok(ApiResponse::success(cat))
}

/// DELETE /api/v1/cats/:id - owner-path delete
pub async fn cat_delete(
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Cat>, ApiError> {
    let store = store().await?;
    let cat = CatService::new(&store)
        .delete_owned(user.principal(), id)
        .await?;
    Ok(ApiResponse::success(cat))
}

/// PUT /api/v1/cats/:id/admin - admin update, may reassign ownership
pub async fn cat_put_admin(
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AdminUpdateCatRequest>,
) -> Result<ApiResponse<Cat>, ApiError> {
    let store = store().await?;
    let cat = CatService::new(&store)
        .update_admin(user.principal(), id, body)
        .await?;
    Ok(ApiResponse::success(cat))
}

/// DELETE /api/v1/cats/:id/admin - admin delete
pub async fn cat_delete_admin(
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Cat>, ApiError> {
    let store = store().await?;
    let cat = CatService::new(&store)
        .delete_admin(user.principal(), id)
        .await?;
    Ok(ApiResponse::success(cat))
}
