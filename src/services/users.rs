use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{generate_jwt, Claims};
use crate::database::models::UserPublic;
use crate::database::users::{NewUser, UserPatch, UserStore};
use crate::error::ApiError;
use crate::policy::{self, Action, Principal, Role, USER_CAPS};

const MIN_USER_NAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub user_name: String,
    pub email: String,
    pub password: String,
    /// Defaults to `user` when absent.
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserPublic,
}

/// Account orchestration: registration, credential login, self-service
/// mutation. Every read goes out as the public projection.
pub struct UserService<'a, S> {
    store: &'a S,
}

impl<'a, S: UserStore> UserService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<UserPublic, ApiError> {
        validate_registration(&req)?;

        let password_hash =
            hash_password(&req.password).map_err(|e| {
                tracing::error!("Password hashing failed: {}", e);
                ApiError::internal_server_error("Failed to process registration")
            })?;

        let user = self
            .store
            .insert(NewUser {
                user_name: req.user_name,
                email: req.email,
                password_hash,
                role: req.role.unwrap_or(Role::User),
            })
            .await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user.into())
    }

    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, ApiError> {
        let user = self
            .store
            .find_by_email(&req.email)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

        if !verify_password(&req.password, &user.password) {
            return Err(ApiError::unauthorized("Invalid credentials"));
        }

        let claims = Claims::new(user.id, user.user_name.clone(), user.email.clone(), user.role);
        let token = generate_jwt(claims).map_err(|e| {
            tracing::error!("JWT generation failed: {}", e);
            ApiError::internal_server_error("Failed to issue token")
        })?;

        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<UserPublic, ApiError> {
        self.store
            .find(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub async fn list(&self) -> Result<Vec<UserPublic>, ApiError> {
        let users = self.store.list().await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    /// Update the calling principal's own account. There is no path for
    /// mutating anyone else's account, admins included.
    pub async fn update_current(
        &self,
        principal: Principal,
        req: UpdateUserRequest,
    ) -> Result<UserPublic, ApiError> {
        policy::decide(USER_CAPS, Action::Update, Some(principal), Some(principal.id))?;

        let password_hash = match req.password {
            Some(plain) => {
                if plain.len() < MIN_PASSWORD_LEN {
                    return Err(ApiError::validation_error(
                        "Invalid input",
                        Some(password_too_short()),
                    ));
                }
                Some(hash_password(&plain).map_err(|e| {
                    tracing::error!("Password hashing failed: {}", e);
                    ApiError::internal_server_error("Failed to process update")
                })?)
            }
            None => None,
        };

        self.store
            .update(
                principal.id,
                UserPatch {
                    user_name: req.user_name,
                    email: req.email,
                    password_hash,
                },
            )
            .await?
            .map(Into::into)
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    /// Delete the calling principal's own account.
    pub async fn delete_current(&self, principal: Principal) -> Result<UserPublic, ApiError> {
        policy::decide(USER_CAPS, Action::Delete, Some(principal), Some(principal.id))?;
        self.store
            .delete(principal.id)
            .await?
            .map(Into::into)
            .ok_or_else(|| ApiError::not_found("User not found"))
    }
}

fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    let mut field_errors = HashMap::new();

    if req.user_name.trim().len() < MIN_USER_NAME_LEN {
        field_errors.insert(
            "user_name".to_string(),
            format!("must be at least {} characters", MIN_USER_NAME_LEN),
        );
    }
    if !looks_like_email(&req.email) {
        field_errors.insert("email".to_string(), "must be a valid email address".to_string());
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        field_errors.extend(password_too_short());
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Invalid input", Some(field_errors)))
    }
}

fn password_too_short() -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert(
        "password".to_string(),
        format!("must be at least {} characters", MIN_PASSWORD_LEN),
    );
    m
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}
