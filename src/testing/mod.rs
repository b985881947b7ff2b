//! In-memory store implementations for exercising the query engine and
//! policy paths without a database. Test-only.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::database::cats::{CatPatch, CatStore, NewCat};
use crate::database::manager::DatabaseError;
use crate::database::models::{Cat, CatWithOwner, User, UserPublic};
use crate::database::users::{NewUser, UserPatch, UserStore};
use crate::geo::Extent;
use crate::policy::Role;

#[derive(Default)]
pub struct MemoryCatStore {
    cats: Mutex<Vec<Cat>>,
    owners: Mutex<HashMap<Uuid, UserPublic>>,
}

impl MemoryCatStore {
    /// Make an owner known so reads can expand it, mirroring the join
    /// against the users table.
    pub fn register_owner(&self, id: Uuid, user_name: &str, email: &str) {
        self.owners.lock().unwrap().insert(
            id,
            UserPublic {
                id,
                user_name: user_name.to_string(),
                email: email.to_string(),
            },
        );
    }

    /// Insert a cat with no location, which the service API cannot
    /// produce (creation always resolves a location).
    pub fn insert_unlocated(&self, owner: Uuid, name: &str, species: &str) -> Cat {
        let cat = Cat {
            id: Uuid::new_v4(),
            owner,
            name: name.to_string(),
            species: species.to_string(),
            location: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.cats.lock().unwrap().push(cat.clone());
        cat
    }

    fn expand(&self, cat: &Cat) -> Option<CatWithOwner> {
        let owners = self.owners.lock().unwrap();
        owners.get(&cat.owner).map(|owner| CatWithOwner {
            id: cat.id,
            name: cat.name.clone(),
            species: cat.species.clone(),
            location: cat.location,
            owner: owner.clone(),
            created_at: cat.created_at,
            updated_at: cat.updated_at,
        })
    }
}

fn apply_patch(cat: &mut Cat, patch: CatPatch, allow_owner: bool) {
    if let Some(name) = patch.name {
        cat.name = name;
    }
    if let Some(species) = patch.species {
        cat.species = species;
    }
    if let Some(location) = patch.location {
        cat.location = Some(location);
    }
    if allow_owner {
        if let Some(owner) = patch.owner {
            cat.owner = owner;
        }
    }
    cat.updated_at = Utc::now();
}

#[async_trait]
impl CatStore for MemoryCatStore {
    async fn insert(&self, new: NewCat) -> Result<Cat, DatabaseError> {
        let cat = Cat {
            id: Uuid::new_v4(),
            owner: new.owner,
            name: new.name,
            species: new.species,
            location: new.location,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.cats.lock().unwrap().push(cat.clone());
        Ok(cat)
    }

    async fn find(&self, id: Uuid) -> Result<Option<CatWithOwner>, DatabaseError> {
        let cat = {
            let cats = self.cats.lock().unwrap();
            cats.iter().find(|c| c.id == id).cloned()
        };
        Ok(cat.and_then(|c| self.expand(&c)))
    }

    async fn list(&self, limit: Option<i64>, offset: i64) -> Result<Vec<Cat>, DatabaseError> {
        let cats = self.cats.lock().unwrap();
        let iter = cats.iter().skip(offset.max(0) as usize);
        let cats: Vec<Cat> = match limit {
            Some(limit) => iter.take(limit.max(0) as usize).cloned().collect(),
            None => iter.cloned().collect(),
        };
        Ok(cats)
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<CatWithOwner>, DatabaseError> {
        let owned: Vec<Cat> = {
            let cats = self.cats.lock().unwrap();
            cats.iter().filter(|c| c.owner == owner).cloned().collect()
        };
        Ok(owned.iter().filter_map(|c| self.expand(c)).collect())
    }

    async fn list_located_in(&self, extent: Extent) -> Result<Vec<Cat>, DatabaseError> {
        let cats = self.cats.lock().unwrap();
        Ok(cats
            .iter()
            .filter(|c| {
                c.location.is_some_and(|loc| {
                    loc.lat >= extent.min_lat
                        && loc.lat <= extent.max_lat
                        && loc.lng >= extent.min_lng
                        && loc.lng <= extent.max_lng
                })
            })
            .cloned()
            .collect())
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: CatPatch,
    ) -> Result<Option<Cat>, DatabaseError> {
        let mut cats = self.cats.lock().unwrap();
        match cats.iter_mut().find(|c| c.id == id && c.owner == owner) {
            Some(cat) => {
                apply_patch(cat, patch, false);
                Ok(Some(cat.clone()))
            }
            None => Ok(None),
        }
    }

    async fn update_any(&self, id: Uuid, patch: CatPatch) -> Result<Option<Cat>, DatabaseError> {
        let mut cats = self.cats.lock().unwrap();
        match cats.iter_mut().find(|c| c.id == id) {
            Some(cat) => {
                apply_patch(cat, patch, true);
                Ok(Some(cat.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<Cat>, DatabaseError> {
        let mut cats = self.cats.lock().unwrap();
        match cats.iter().position(|c| c.id == id && c.owner == owner) {
            Some(pos) => Ok(Some(cats.remove(pos))),
            None => Ok(None),
        }
    }

    async fn delete_any(&self, id: Uuid) -> Result<Option<Cat>, DatabaseError> {
        let mut cats = self.cats.lock().unwrap();
        match cats.iter().position(|c| c.id == id) {
            Some(pos) => Ok(Some(cats.remove(pos))),
            None => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    /// Peek at a stored role; the public API never exposes it.
    pub fn role_of(&self, id: Uuid) -> Option<Role> {
        let users = self.users.lock().unwrap();
        users.iter().find(|u| u.id == id).map(|u| u.role)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, new: NewUser) -> Result<User, DatabaseError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new.email) {
            return Err(DatabaseError::Conflict("email already exists".to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            user_name: new.user_name,
            email: new.email,
            password: new.password_hash,
            role: new.role,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, DatabaseError> {
        let mut users = self.users.lock().unwrap();
        if let Some(email) = &patch.email {
            if users.iter().any(|u| u.email == *email && u.id != id) {
                return Err(DatabaseError::Conflict("email already exists".to_string()));
            }
        }
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                if let Some(user_name) = patch.user_name {
                    user.user_name = user_name;
                }
                if let Some(email) = patch.email {
                    user.email = email;
                }
                if let Some(password_hash) = patch.password_hash {
                    user.password = password_hash;
                }
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let mut users = self.users.lock().unwrap();
        match users.iter().position(|u| u.id == id) {
            Some(pos) => Ok(Some(users.remove(pos))),
            None => Ok(None),
        }
    }
}
