use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Closed role set. New roles must be added here and handled in every
/// match, so nothing falls through to "allowed" by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// An authenticated actor as seen by the policy: identity plus role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

/// Per-resource-kind capability descriptor. Cats allow elevated admin
/// paths; user accounts deliberately do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceCaps {
    pub admin_override: bool,
}

/// Capabilities of the Cat resource: admins may delete any cat and
/// reassign ownership.
pub const CAT_CAPS: ResourceCaps = ResourceCaps { admin_override: true };

/// Capabilities of the User resource: only the account holder may
/// mutate or delete it. There is no admin override.
pub const USER_CAPS: ResourceCaps = ResourceCaps { admin_override: false };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Single or list reads. Unrestricted.
    Read,
    /// Resource creation by any authenticated principal.
    Create,
    /// Ordinary field update, owner path.
    Update,
    /// Changing the owner field. Elevated path.
    ReassignOwner,
    /// Self-service delete, owner path.
    Delete,
    /// Elevated delete path.
    AdminDelete,
}

/// Why a request was denied. Callers map `NotAuthenticated` to 401 and
/// `Forbidden` to 403; the two must stay distinguishable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    #[error("authentication required")]
    NotAuthenticated,

    #[error("access restricted")]
    Forbidden,
}

/// Pure authorization decision. `owner` is the target resource's owner
/// (or the target account's own id for User resources); `None` when the
/// action has no existing target, e.g. `Create`.
///
/// Note that the self-service delete endpoints never call this with a
/// fetched owner: the ownership check is folded into the store predicate
/// so a non-owner attempt is indistinguishable from a missing resource.
/// This function is still the single source of truth for what those
/// predicates are allowed to express.
pub fn decide(
    caps: ResourceCaps,
    action: Action,
    principal: Option<Principal>,
    owner: Option<Uuid>,
) -> Result<(), DenyReason> {
    match action {
        Action::Read => Ok(()),

        Action::Create => match principal {
            Some(_) => Ok(()),
            None => Err(DenyReason::NotAuthenticated),
        },

        Action::Update | Action::Delete => {
            let principal = principal.ok_or(DenyReason::NotAuthenticated)?;
            match owner {
                Some(owner) if owner == principal.id => Ok(()),
                _ => Err(DenyReason::Forbidden),
            }
        }

        Action::ReassignOwner | Action::AdminDelete => {
            let principal = principal.ok_or(DenyReason::NotAuthenticated)?;
            match principal.role {
                Role::Admin if caps.admin_override => Ok(()),
                Role::Admin | Role::User => Err(DenyReason::Forbidden),
            }
        }
    }
}
