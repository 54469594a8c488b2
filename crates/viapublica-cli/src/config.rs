//! CLI configuration
//!
//! Loaded from `viapublica.toml` (a missing file means defaults), then
//! overridden from `VIAPUBLICA_*` environment variables, then validated.
//!
//! ```toml
//! session_file = "/var/lib/viapublica/viapublica_user.json"
//!
//! [guard]
//! login_path = "/auth/login"
//! access_denied_path = "/acceso-denegado"
//! resolution_timeout = 5000
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use viapublica_guards::GuardConfig;
use viapublica_session::SESSION_FILE_NAME;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "VIAPUBLICA_";

/// Contents of `viapublica.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Where the signed-in session is persisted between invocations
    pub session_file: PathBuf,
    /// Guard destinations and resolution timeout
    pub guard: GuardConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            session_file: default_session_file(),
            guard: GuardConfig::default(),
        }
    }
}

fn default_session_file() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("viapublica")
        .join(SESSION_FILE_NAME)
}

impl CliConfig {
    /// Load `path`, apply environment overrides and validate.
    pub async fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path).await?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse `path`; defaults if it does not exist.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read config file {}", path.display()))
            }
        };
        toml::from_str(&raw).with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply `VIAPUBLICA_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(file) = var("SESSION_FILE") {
            self.session_file = PathBuf::from(file);
        }
        if let Some(path) = var("LOGIN_PATH") {
            self.guard.login_path = path;
        }
        if let Some(path) = var("ACCESS_DENIED_PATH") {
            self.guard.access_denied_path = path;
        }
        if let Some(ms) = var("RESOLUTION_TIMEOUT_MS") {
            let ms: u64 = ms
                .trim()
                .parse()
                .with_context(|| format!("{ENV_PREFIX}RESOLUTION_TIMEOUT_MS is not a number: '{ms}'"))?;
            self.guard.resolution_timeout = Duration::from_millis(ms);
        }
        Ok(())
    }

    /// Reject a config the commands could not run with.
    pub fn validate(&self) -> Result<()> {
        self.guard.validate()?;
        if self.session_file.as_os_str().is_empty() {
            bail!("session_file cannot be empty");
        }
        if self.session_file.is_dir() {
            bail!("session_file points at a directory: {}", self.session_file.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn overrides_win_over_file_values() {
        let mut config: CliConfig = toml::from_str(
            r#"
            session_file = "/tmp/a.json"
            [guard]
            login_path = "/entrar"
            "#,
        )
        .unwrap();
        assert_eq!(config.guard.access_denied_path, "/acceso-denegado");

        let env: HashMap<&str, &str> = HashMap::from([
            ("VIAPUBLICA_LOGIN_PATH", "/auth/login"),
            ("VIAPUBLICA_RESOLUTION_TIMEOUT_MS", "250"),
        ]);
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.guard.login_path, "/auth/login");
        assert_eq!(config.guard.resolution_timeout, Duration::from_millis(250));
        assert_eq!(config.session_file, PathBuf::from("/tmp/a.json"));
    }

    #[test]
    fn non_numeric_timeout_is_rejected() {
        let mut config = CliConfig::default();
        let err = config
            .apply_overrides(|key| (key == "VIAPUBLICA_RESOLUTION_TIMEOUT_MS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("RESOLUTION_TIMEOUT_MS"));
    }

    #[test]
    fn default_session_file_uses_the_persisted_name() {
        assert!(CliConfig::default().session_file.ends_with(SESSION_FILE_NAME));
    }

    #[tokio::test]
    async fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::from_file(&dir.path().join("viapublica.toml")).await.unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[tokio::test]
    async fn invalid_guard_paths_fail_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viapublica.toml");
        tokio::fs::write(&path, "[guard]\nlogin_path = \"auth\"\n").await.unwrap();
        let config = CliConfig::from_file(&path).await.unwrap();
        assert!(config.validate().is_err());

        tokio::fs::write(&path, "session_file = 3").await.unwrap();
        assert!(CliConfig::from_file(&path).await.is_err());
    }
}
