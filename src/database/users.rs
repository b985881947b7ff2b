use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::policy::Role;

use super::manager::{conflict_on_unique, DatabaseError};
use super::models::User;

/// Fields required to persist a new account. The password arrives
/// already hashed; stores never see plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Partial account update; `None` fields are left untouched. Role is
/// deliberately not patchable through this path.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// Storage contract for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account. A duplicate email surfaces as
    /// `DatabaseError::Conflict`.
    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn find(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn list(&self) -> Result<Vec<User>, DatabaseError>;

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;
}

/// Postgres-backed user store.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, user_name, email, password, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&user.user_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "email"))
    }

    async fn find(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, DatabaseError> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET \
             user_name = COALESCE($2, user_name), \
             email = COALESCE($3, email), \
             password = COALESCE($4, password) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(patch.user_name)
        .bind(patch.email)
        .bind(patch.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "email"))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("DELETE FROM users WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
