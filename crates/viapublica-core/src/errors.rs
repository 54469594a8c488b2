//! Unified error type for Via Pública
//!
//! One error enum shared by the permission table, the session store and the
//! guards. Authorization denials inside the guard are not errors; the
//! `Unauthenticated` and `Unauthorized` variants exist for hard checks at
//! call sites that are not guarded views (see [`crate::permissions::require`]).

use crate::{Capability, Role};
use serde::{Deserialize, Serialize};

/// Unified error type for all Via Pública operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ViaPublicaError {
    /// Programming error: unknown role or capability name, misconfigured guard
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was invalid
        message: String,
    },

    /// No session exists
    #[error("Unauthenticated: no active session")]
    Unauthenticated,

    /// A session exists but its role lacks the capability
    #[error("Unauthorized: role {role} lacks capability {capability}")]
    Unauthorized {
        /// Role of the current session
        role: Role,
        /// Capability that was required
        capability: Capability,
    },

    /// The session store never finished resolving
    #[error("Session resolution timed out after {waited_ms} ms")]
    SessionResolutionTimeout {
        /// How long the caller waited
        waited_ms: u64,
    },

    /// The session store writer went away while readers still depend on it
    #[error("Session store detached: {message}")]
    StoreDetached {
        /// Error message describing the detachment
        message: String,
    },

    /// Simulated login / registration flow rejected the request
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Error message shown to the user
        message: String,
    },

    /// User input rejected by a form-level check (registration fields, password policy)
    #[error("Validation failed: {message}")]
    Validation {
        /// What the user needs to fix
        message: String,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// Storage operation failed
    #[error("Storage error: {message}")]
    Storage {
        /// Error message describing the storage failure
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },
}

impl ViaPublicaError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an unauthorized error for a role/capability pair
    pub fn unauthorized(role: Role, capability: Capability) -> Self {
        Self::Unauthorized { role, capability }
    }

    /// Create a session resolution timeout error
    pub fn resolution_timeout(waited: std::time::Duration) -> Self {
        Self::SessionResolutionTimeout {
            waited_ms: u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Create a store detached error
    pub fn store_detached(message: impl Into<String>) -> Self {
        Self::StoreDetached {
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Returns `true` for errors that indicate a defect rather than a runtime condition.
    ///
    /// These must fail loudly; they are never mapped to "denied".
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::StoreDetached { .. }
        )
    }
}

/// Standard Result type for Via Pública operations
pub type Result<T> = std::result::Result<T, ViaPublicaError>;

impl From<serde_json::Error> for ViaPublicaError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<std::io::Error> for ViaPublicaError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            _ => Self::storage(err.to_string()),
        }
    }
}
