use serde::{Deserialize, Serialize};

use crate::model::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    /// Argon2 hash, never the raw credential.
    pub password: String,
    pub role_id: u8,
    /// Workers carry the code of the admin who owns them; admins carry
    /// their own tenant key; the master account has none.
    pub admin_code: Option<String>,
}

impl User {
    pub fn role(&self) -> Option<Role> {
        Role::from_id(self.role_id)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Insert payload for the user table; the id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role_id: u8,
    pub admin_code: Option<String>,
}
