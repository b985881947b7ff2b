use axum::Json;

use crate::database::manager::DatabaseManager;
use crate::database::users::PgUserStore;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::services::users::{LoginRequest, LoginResponse};
use crate::services::UserService;

/// POST /api/v1/auth/login - verify credentials and issue a JWT
pub async fn login(Json(body): Json<LoginRequest>) -> Result<ApiResponse<LoginResponse>, ApiError> {
    let store = PgUserStore::new(DatabaseManager::pool().await?);
    let response = UserService::new(&store).login(body).await?;
    Ok(ApiResponse::success(response))
}
