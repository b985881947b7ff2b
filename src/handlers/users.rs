use axum::extract::Path;
use axum::Json;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::UserPublic;
use crate::database::users::PgUserStore;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthUser};
use crate::services::users::{RegisterRequest, UpdateUserRequest};
use crate::services::UserService;

async fn store() -> Result<PgUserStore, ApiError> {
    Ok(PgUserStore::new(DatabaseManager::pool().await?))
}

/// GET /api/v1/users - list accounts, secrets stripped
pub async fn user_list() -> Result<ApiResponse<Vec<UserPublic>>, ApiError> {
    let store = store().await?;
    let users = UserService::new(&store).list().await?;
    Ok(ApiResponse::success(users))
}

/// GET /api/v1/users/:id
pub async fn user_get(Path(id): Path<Uuid>) -> Result<ApiResponse<UserPublic>, ApiError> {
    let store = store().await?;
    let user = UserService::new(&store).get(id).await?;
    Ok(ApiResponse::success(user))
}

/// POST /api/v1/users - register a new account
pub async fn user_post(
    Json(body): Json<RegisterRequest>,
) -> Result<ApiResponse<UserPublic>, ApiError> {
    let store = store().await?;
    let user = UserService::new(&store).register(body).await?;
    Ok(ApiResponse::created(user))
}

/// PUT /api/v1/users - update the calling account
pub async fn user_put_current(
    user: AuthUser,
    Json(body): Json<UpdateUserRequest>,
) -> Result<ApiResponse<UserPublic>, ApiError> {
    let store = store().await?;
    let updated = UserService::new(&store)
        .update_current(user.principal(), body)
        .await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/v1/users - delete the calling account
pub async fn user_delete_current(user: AuthUser) -> Result<ApiResponse<UserPublic>, ApiError> {
    let store = store().await?;
    let deleted = UserService::new(&store)
        .delete_current(user.principal())
        .await?;
    Ok(ApiResponse::success(deleted))
}

/// GET /api/v1/users/token - echo the caller's public projection.
/// The claims already carry everything needed; no database query.
pub async fn check_token(user: AuthUser) -> ApiResponse<UserPublic> {
    ApiResponse::success(UserPublic {
        id: user.id,
        user_name: user.user_name,
        email: user.email,
    })
}
