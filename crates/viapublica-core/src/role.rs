//! Roles and client kinds

use crate::{Result, ViaPublicaError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Coarse identity classification controlling default entitlements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Browses the catalog, keeps favorites and contacts owners
    StandardUser,
    /// Owns or brokers advertising spaces
    SpaceClient,
    /// Operates the marketplace
    Administrator,
}

impl Role {
    /// Every role, in table order.
    pub const ALL: [Role; 3] = [Role::StandardUser, Role::SpaceClient, Role::Administrator];

    /// Number of roles.
    pub const COUNT: usize = Self::ALL.len();

    /// Wire name of the role.
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::StandardUser => "standard_user",
            Role::SpaceClient => "space_client",
            Role::Administrator => "administrator",
        }
    }

    /// Dense index used by the permission table.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ViaPublicaError;

    /// Accepts wire names and the legacy identifiers persisted by older clients.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "standard_user" | "usuario" => Ok(Role::StandardUser),
            "space_client" | "cliente" => Ok(Role::SpaceClient),
            "administrator" | "administrador" => Ok(Role::Administrator),
            other => Err(ViaPublicaError::invalid_argument(format!(
                "unknown role '{other}'"
            ))),
        }
    }
}

/// Sub-classification of [`Role::SpaceClient`]. Does not change grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientKind {
    /// Individual owner of one or more spaces
    Owner,
    /// Agency managing spaces on behalf of owners
    Agency,
}

impl ClientKind {
    /// Wire name of the client kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            ClientKind::Owner => "owner",
            ClientKind::Agency => "agency",
        }
    }
}

impl std::fmt::Display for ClientKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientKind {
    type Err = ViaPublicaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "owner" | "dueno" => Ok(ClientKind::Owner),
            "agency" | "agencia" => Ok(ClientKind::Agency),
            other => Err(ViaPublicaError::invalid_argument(format!(
                "unknown client kind '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_and_legacy_names() {
        assert_eq!("space_client".parse::<Role>().unwrap(), Role::SpaceClient);
        assert_eq!("cliente".parse::<Role>().unwrap(), Role::SpaceClient);
        assert_eq!("administrador".parse::<Role>().unwrap(), Role::Administrator);
        assert_eq!("agencia".parse::<ClientKind>().unwrap(), ClientKind::Agency);
    }

    #[test]
    fn unknown_role_is_invalid_argument() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert!(matches!(err, ViaPublicaError::InvalidArgument { .. }));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::StandardUser).unwrap();
        assert_eq!(json, "\"standard_user\"");
        let kind: ClientKind = serde_json::from_str("\"owner\"").unwrap();
        assert_eq!(kind, ClientKind::Owner);
    }
}
