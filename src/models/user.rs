use serde::{Deserialize, Serialize};

/// User profile document. `is_admin` is only ever set by hand in the store
/// (see the `admin-flag` binary); there is no write path for it here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub plan: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// The slice of a user joined into the admin transaction detail view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub name: String,
    pub email: String,
    pub plan: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            plan: user.plan.clone(),
        }
    }
}

impl UserSummary {
    /// Placeholder when the owning user document is missing; the detail view
    /// still renders the transaction itself.
    pub fn unknown() -> Self {
        Self {
            name: "Unknown".to_string(),
            email: String::new(),
            plan: String::new(),
        }
    }
}
