//! Single-writer session store with change notification
//!
//! The store holds at most one [`Session`] per client context. Exactly one
//! [`SessionWriter`] exists (the login/logout flow); any number of
//! [`SessionContext`] readers observe it. Every publish replaces the whole
//! snapshot, so readers see either the old or the new session, never a mix.
//!
//! ```text
//! SessionWriter ──send_if_modified──► watch channel ──borrow/changed──► SessionContext (×N)
//!                                      SessionSnapshot { status, version, load_error }
//! ```
//!
//! The snapshot carries a version counter that increases on every
//! observable change. Guards key their cached decision on it, which is how a
//! replaced session (logout + login of a different user) is noticed even when
//! the guard itself is never recreated.

use crate::persistence::SessionPersistence;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use viapublica_core::{Result, Session, ViaPublicaError};

/// Message recorded when restoring a persisted session fails.
pub const SESSION_LOAD_FAILED: &str = "failed to load the session";

/// Resolution state of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Initial restore is still in flight.
    Resolving,
    /// Resolved; `None` means anonymous.
    Resolved(Option<Arc<Session>>),
}

/// Immutable view of the store at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    status: SessionStatus,
    version: u64,
    load_error: Option<String>,
}

impl SessionSnapshot {
    fn resolving() -> Self {
        Self {
            status: SessionStatus::Resolving,
            version: 0,
            load_error: None,
        }
    }

    /// Current resolution status.
    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// The session, if resolved and signed in.
    pub fn session(&self) -> Option<&Arc<Session>> {
        match &self.status {
            SessionStatus::Resolved(session) => session.as_ref(),
            SessionStatus::Resolving => None,
        }
    }

    /// `true` while the initial restore is in flight.
    pub fn is_resolving(&self) -> bool {
        matches!(self.status, SessionStatus::Resolving)
    }

    /// Monotonic change counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Error recorded by the last failed restore, if any.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }
}

/// Constructor for the writer/reader pair.
pub struct SessionStore;

impl SessionStore {
    /// New store in the resolving state.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (SessionWriter, SessionContext) {
        let (tx, rx) = watch::channel(SessionSnapshot::resolving());
        (SessionWriter { tx }, SessionContext { rx })
    }

    /// New store that is already resolved, for callers with nothing to restore.
    pub fn resolved(session: Option<Session>) -> (SessionWriter, SessionContext) {
        let (writer, _initial) = Self::new();
        writer.finish_resolution(session);
        let context = writer.context();
        (writer, context)
    }
}

/// The one mutating handle. Not `Clone`; dropping it detaches every reader.
#[derive(Debug)]
pub struct SessionWriter {
    tx: watch::Sender<SessionSnapshot>,
}

impl SessionWriter {
    /// A fresh reader for this store.
    pub fn context(&self) -> SessionContext {
        SessionContext {
            rx: self.tx.subscribe(),
        }
    }

    /// Current snapshot as seen by the writer.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    fn publish(&self, status: SessionStatus, load_error: Option<String>) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.status == status && snapshot.load_error == load_error {
                return false;
            }
            snapshot.status = status;
            snapshot.load_error = load_error;
            snapshot.version += 1;
            true
        })
    }

    /// Put the store back into the resolving state.
    pub fn begin_resolution(&self) {
        if self.publish(SessionStatus::Resolving, None) {
            debug!(version = self.snapshot().version(), "session resolution started");
        }
    }

    /// Finish resolution with the restored session (or anonymous).
    pub fn finish_resolution(&self, session: Option<Session>) -> Option<Arc<Session>> {
        let session = session.map(Arc::new);
        self.publish(SessionStatus::Resolved(session.clone()), None);
        debug!(
            signed_in = session.is_some(),
            version = self.snapshot().version(),
            "session resolved"
        );
        session
    }

    /// Finish resolution as anonymous, recording why restore failed.
    pub fn fail_resolution(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(error = %message, "session resolution failed, continuing anonymous");
        self.publish(SessionStatus::Resolved(None), Some(message));
    }

    /// Atomically replace the current session.
    pub fn sign_in(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        self.publish(SessionStatus::Resolved(Some(session.clone())), None);
        info!(
            session_id = %session.id(),
            role = %session.role(),
            version = self.snapshot().version(),
            "session replaced"
        );
        session
    }

    /// Clear the current session. Returns `true` if a session was removed.
    pub fn sign_out(&self) -> bool {
        let had_session = self.snapshot().session().is_some();
        self.publish(SessionStatus::Resolved(None), None);
        if had_session {
            info!(version = self.snapshot().version(), "session cleared");
        }
        had_session
    }

    /// Restore from persistence, mirroring the client's startup load.
    ///
    /// Nothing persisted resolves anonymous; a failed load resolves anonymous
    /// and records [`SESSION_LOAD_FAILED`].
    pub async fn restore<P>(&self, persistence: &P) -> Option<Arc<Session>>
    where
        P: SessionPersistence + ?Sized,
    {
        self.begin_resolution();
        match persistence.load().await {
            Ok(session) => self.finish_resolution(session),
            Err(err) => {
                warn!(error = %err, "persisted session could not be loaded");
                self.fail_resolution(SESSION_LOAD_FAILED);
                None
            }
        }
    }
}

/// Read-only handle injected into guards and capability-dependent views.
#[derive(Debug, Clone)]
pub struct SessionContext {
    rx: watch::Receiver<SessionSnapshot>,
}

impl SessionContext {
    /// Current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.rx.borrow().clone()
    }

    /// The signed-in session, if any.
    pub fn current_session(&self) -> Option<Arc<Session>> {
        self.rx.borrow().session().cloned()
    }

    /// `true` while the initial restore is in flight.
    pub fn is_resolving(&self) -> bool {
        self.rx.borrow().is_resolving()
    }

    /// Current version counter.
    pub fn version(&self) -> u64 {
        self.rx.borrow().version()
    }

    /// `true` once the writer has been dropped.
    pub fn is_detached(&self) -> bool {
        self.rx.has_changed().is_err()
    }

    /// Wait for the next change and return the new snapshot.
    pub async fn changed(&mut self) -> Result<SessionSnapshot> {
        self.rx
            .changed()
            .await
            .map_err(|_| ViaPublicaError::store_detached("session writer dropped"))?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Wait until the store is resolved and return that snapshot.
    ///
    /// Fails with `StoreDetached` if the writer goes away while still resolving.
    pub async fn resolved(&mut self) -> Result<SessionSnapshot> {
        let snapshot = self
            .rx
            .wait_for(|snapshot| !snapshot.is_resolving())
            .await
            .map_err(|_| ViaPublicaError::store_detached("session writer dropped while resolving"))?;
        Ok(snapshot.clone())
    }
}
