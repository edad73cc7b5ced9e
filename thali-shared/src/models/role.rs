/// Principal roles
///
/// Every authenticable identity carries one of three roles. Delivery agents
/// and owners have a fixed role; users pick one at registration and default
/// to [`Role::User`].
///
/// # Schema
///
/// ```sql
/// CREATE TYPE principal_role AS ENUM ('user', 'delivery', 'owner');
/// ```

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Role tag embedded in stored principals and in token claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "principal_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular customer
    #[default]
    User,

    /// Delivery agent
    Delivery,

    /// Restaurant owner
    Owner,
}

impl Role {
    /// Gets role as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Delivery => "delivery",
            Role::Owner => "owner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the three roles
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "delivery" => Ok(Role::Delivery),
            "owner" => Ok(Role::Owner),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
