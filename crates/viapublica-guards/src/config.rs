//! Guard runtime configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use viapublica_core::{Result, ViaPublicaError};

/// Default destination for anonymous visitors.
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";

/// Destination for sessions lacking the required capability.
pub const DEFAULT_ACCESS_DENIED_PATH: &str = "/acceso-denegado";

/// Default bound on waiting for the session store to resolve.
pub const DEFAULT_RESOLUTION_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_RESOLUTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Redirect destinations and the session-resolution bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Where to send visitors without a session
    pub login_path: String,
    /// Where to send sessions missing the capability
    pub access_denied_path: String,
    /// Give up on session resolution after this long
    #[serde(with = "duration_ms")]
    pub resolution_timeout: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            access_denied_path: DEFAULT_ACCESS_DENIED_PATH.to_string(),
            resolution_timeout: DEFAULT_RESOLUTION_TIMEOUT,
        }
    }
}

impl GuardConfig {
    /// Reject configurations that would misroute or hang a guard.
    pub fn validate(&self) -> Result<()> {
        for (field, path) in [
            ("login_path", &self.login_path),
            ("access_denied_path", &self.access_denied_path),
        ] {
            if !path.starts_with('/') {
                return Err(ViaPublicaError::invalid_argument(format!(
                    "{field} must be an absolute path, got '{path}'"
                )));
            }
        }
        if self.resolution_timeout.is_zero() {
            return Err(ViaPublicaError::invalid_argument(
                "resolution_timeout cannot be zero",
            ));
        }
        if self.resolution_timeout > MAX_RESOLUTION_TIMEOUT {
            return Err(ViaPublicaError::invalid_argument(
                "resolution_timeout cannot exceed 60 seconds",
            ));
        }
        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GuardConfig::default().validate().unwrap();
    }

    #[test]
    fn relative_paths_are_rejected() {
        let config = GuardConfig {
            login_path: "auth/login".into(),
            ..GuardConfig::default()
        };
        assert!(config.validate().unwrap_err().is_programming_error());
    }

    #[test]
    fn timeout_must_be_bounded() {
        let zero = GuardConfig {
            resolution_timeout: Duration::ZERO,
            ..GuardConfig::default()
        };
        assert!(zero.validate().is_err());

        let huge = GuardConfig {
            resolution_timeout: Duration::from_secs(3600),
            ..GuardConfig::default()
        };
        assert!(huge.validate().is_err());
    }
}
