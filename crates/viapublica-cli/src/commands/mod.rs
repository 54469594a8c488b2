//! Command implementations
//!
//! Each command writes human-readable output to the supplied writer so the
//! binary prints to stdout and tests capture into a buffer.

pub mod access;
pub mod account;
pub mod matrix;

use crate::config::CliConfig;
use anyhow::Result;
use tracing::warn;
use viapublica_session::{AuthService, CredentialTable, FileSessionPersistence, SessionStore};

/// Account service over the configured session file, with the persisted
/// session already restored.
pub async fn open_service(config: &CliConfig) -> Result<AuthService<FileSessionPersistence>> {
    let (writer, _ctx) = SessionStore::new();
    let persistence = FileSessionPersistence::new(&config.session_file);
    let auth = AuthService::new(writer, persistence, CredentialTable::demo());
    auth.restore().await;
    if let Some(error) = auth.context().snapshot().load_error() {
        warn!(
            path = %config.session_file.display(),
            error,
            "continuing without a session"
        );
    }
    Ok(auth)
}
