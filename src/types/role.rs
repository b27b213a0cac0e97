use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Access level carried by a credential and its resolved identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular identity; may mutate only packages it owns.
    Owner,
    /// May mutate any package and access admin routes.
    SuperUser,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::SuperUser => "superuser",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "owner" => Ok(Self::Owner),
            "superuser" => Ok(Self::SuperUser),
            other => Err(Error::Config(format!("unknown role: {other}"))),
        }
    }
}

/// The identity resolved from a validated credential.
///
/// For owner tokens `owner_id` is the bound user id; for super-user tokens
/// it is the token id.
#[derive(Debug, Clone)]
pub struct Identity {
    pub owner_id: String,
    pub role: Role,
}

impl Identity {
    #[must_use]
    pub fn is_super_user(&self) -> bool {
        matches!(self.role, Role::SuperUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::Owner, Role::SuperUser] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_super_user_check() {
        let identity = Identity {
            owner_id: "abc".to_string(),
            role: Role::SuperUser,
        };
        assert!(identity.is_super_user());
    }
}
