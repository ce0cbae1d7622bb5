//! User identity models

use serde::{Deserialize, Serialize};

/// Platform role carried in the auth token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Employee,
    Admin,
}

impl Role {
    /// Role-specific dashboard route, used as the navigation target base for
    /// notification clicks.
    pub fn dashboard_route(&self) -> &'static str {
        match self {
            Role::Student => "/student/dashboard",
            Role::Employee => "/employee/dashboard",
            Role::Admin => "/admin/dashboard",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Employee => "employee",
            Role::Admin => "admin",
        }
    }
}

/// The authenticated user, as decoded from the stored credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub role: Role,
}
