use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::policy::Role;

/// Full account row, including the password hash and role. Never
/// serialized to clients; every read goes out as [`UserPublic`].
#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Client-facing projection of an account. `password` and `role` are
/// stripped unconditionally; the authorization policy cannot opt out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserPublic {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name,
            email: user.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_projection_has_no_secret_fields() {
        let user = User {
            id: Uuid::new_v4(),
            user_name: "mittens_owner".to_string(),
            email: "owner@example.com".to_string(),
            password: "$argon2id$...".to_string(),
            role: Role::Admin,
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(UserPublic::from(&user)).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert!(!keys.iter().any(|k| k.as_str() == "password"));
        assert!(!keys.iter().any(|k| k.as_str() == "role"));
        assert_eq!(value["email"], "owner@example.com");
    }
}
