//! User Model
//!
//! Registration, login and profile editing live in the external auth
//! system; this crate only carries the display record that order and
//! cart listings resolve against.

use serde::{Deserialize, Serialize};

/// Marketplace user display record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact_number: String,
    pub created_at: i64,
}

/// Display projection embedded in order listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl UserSummary {
    /// Fallback summary when the user record has not been synced yet
    pub fn unresolved(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone().unwrap_or_default(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}
