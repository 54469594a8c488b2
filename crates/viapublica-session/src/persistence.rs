//! Session persistence
//!
//! Where a signed-in session survives restarts. The web client kept it under
//! the `viapublica_user` local-storage key; here it is a JSON file.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::debug;
use viapublica_core::{Result, Session, ViaPublicaError};

/// File name used for the persisted session.
pub const SESSION_FILE_NAME: &str = "viapublica_user.json";

/// Storage for the one persisted session.
#[async_trait]
pub trait SessionPersistence: Send + Sync {
    /// Load the persisted session, `None` if nothing is stored.
    async fn load(&self) -> Result<Option<Session>>;

    /// Store `session`, replacing whatever was there.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Remove the stored session. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<()>;
}

/// JSON file persistence.
#[derive(Debug, Clone)]
pub struct FileSessionPersistence {
    path: PathBuf,
}

impl FileSessionPersistence {
    /// Persist to the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Persist to [`SESSION_FILE_NAME`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(SESSION_FILE_NAME))
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionPersistence for FileSessionPersistence {
    async fn load(&self) -> Result<Option<Session>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no persisted session");
                return Ok(None);
            }
            Err(err) => {
                return Err(ViaPublicaError::storage(format!(
                    "failed to read {}: {err}",
                    self.path.display()
                )))
            }
        };
        let session: Session = serde_json::from_str(&raw).map_err(|e| {
            ViaPublicaError::serialization(format!(
                "invalid session file {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(Some(session))
    }

    async fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(session)?;
        // Write-then-rename so a concurrent reader never sees half a file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), session_id = %session.id(), "session persisted");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-process persistence.
#[derive(Debug, Default)]
pub struct MemorySessionPersistence {
    slot: Mutex<Option<Session>>,
}

impl MemorySessionPersistence {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `session`.
    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }

    /// Peek at the stored session.
    pub fn stored(&self) -> Option<Session> {
        self.slot.lock().clone()
    }
}

#[async_trait]
impl SessionPersistence for MemorySessionPersistence {
    async fn load(&self) -> Result<Option<Session>> {
        Ok(self.slot.lock().clone())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        *self.slot.lock() = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.slot.lock().take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viapublica_core::{ClientKind, Role};

    fn owner() -> Session {
        Session::builder("Dueño Demo", "dueno@example.com", Role::SpaceClient)
            .client_kind(ClientKind::Owner)
            .email_verified(true)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionPersistence::in_dir(dir.path().join("nested"));

        assert!(store.load().await.unwrap().is_none());

        let session = owner();
        store.save(&session).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(session));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionPersistence::in_dir(dir.path());
        std::fs::write(store.path(), "{not json").unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, ViaPublicaError::Serialization { .. }));
    }

    #[tokio::test]
    async fn memory_store_behaves_like_a_slot() {
        let store = MemorySessionPersistence::new();
        assert!(store.load().await.unwrap().is_none());
        store.save(&owner()).await.unwrap();
        assert_eq!(store.stored().unwrap().role(), Role::SpaceClient);
        store.clear().await.unwrap();
        assert!(store.stored().is_none());
    }
}
