//! Actor identity handed in by the session layer.
//!
//! The core never sees credentials; it trusts the role the session layer
//! resolved. Administrative operations take the actor and perform one
//! capability check.

use neo_commerce::error::CommerceError;
use neo_commerce::ids::UserId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// Regular customer.
    #[default]
    Customer,
    /// Store administrator.
    Admin,
}

impl Role {
    /// Get role as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The caller's user ID.
    pub user_id: UserId,
    /// The caller's role.
    pub role: Role,
}

impl Actor {
    /// Create a customer actor.
    pub fn customer(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Customer,
        }
    }

    /// Create an administrator actor.
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    /// Check the administrator capability.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require the administrator capability.
    pub fn require_admin(&self) -> Result<(), CommerceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(CommerceError::Forbidden)
        }
    }
}
