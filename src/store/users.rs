//! In-memory user profile collection.
//!
//! Ids are assigned from the last element currently in the collection
//! (`last.id + 1`, or `1` when empty), not from the highest id ever issued.
//! Deleting the last profile and creating a new one therefore reuses its id.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use utoipa::ToSchema;

/// Age at which a profile is flagged as `adult`.
pub const ADULT_AGE: u8 = 18;

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Parse the exact wire value, `"admin"` or `"user"`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Alice Johnson")]
    pub name: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = 18, minimum = 0, maximum = 125)]
    pub age: u8,
    pub role: Role,
    /// Derived from `age` on every write.
    pub adult: bool,
}

/// A validated create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: u8,
    pub role: Role,
}

/// A validated partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<u8>,
    pub role: Option<Role>,
}

impl UserChanges {
    fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(age) = self.age {
            user.age = age;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        user.adult = is_adult(user.age);
    }
}

#[must_use]
pub const fn is_adult(age: u8) -> bool {
    age >= ADULT_AGE
}

/// Id the next insert into `users` receives.
fn next_id_of(users: &[User]) -> u64 {
    users.last().map_or(1, |user| user.id + 1)
}

#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<Vec<User>>,
}

impl UserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `users`, kept in the given order.
    #[must_use]
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }

    pub async fn list(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    pub async fn get(&self, id: u64) -> Option<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|user| user.id == id)
            .cloned()
    }

    pub async fn next_id(&self) -> u64 {
        next_id_of(&self.users.read().await)
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    pub async fn create(&self, new_user: NewUser) -> User {
        let mut users = self.users.write().await;

        let user = User {
            id: next_id_of(&users),
            adult: is_adult(new_user.age),
            name: new_user.name,
            email: new_user.email,
            age: new_user.age,
            role: new_user.role,
        };

        debug!(id = user.id, "user created");
        users.push(user.clone());

        user
    }

    /// Merge `changes` into the profile with `id`; `None` if it does not exist.
    pub async fn update(&self, id: u64, changes: UserChanges) -> Option<User> {
        let mut users = self.users.write().await;
        let user = users.iter_mut().find(|user| user.id == id)?;

        changes.apply(user);
        debug!(id, "user updated");

        Some(user.clone())
    }

    /// Remove the profile with `id`, returning whether it existed.
    pub async fn delete(&self, id: u64) -> bool {
        let mut users = self.users.write().await;
        let Some(index) = users.iter().position(|user| user.id == id) else {
            return false;
        };

        users.remove(index);
        debug!(id, "user deleted");

        true
    }

    pub async fn clear(&self) {
        self.users.write().await.clear();
        debug!("all users deleted");
    }
}
