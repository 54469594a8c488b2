//! Access guard
//!
//! Gates one view behind exactly one [`Capability`]. The decision itself is the
//! pure function [`evaluate`]; [`AccessGuard`] adds the bookkeeping a
//! long-lived view needs:
//!
//! - re-evaluate whenever the session version or the required capability
//!   changes, and only then (idempotent otherwise)
//! - bounded async wait for the initial session resolution
//! - abandonment without side effects when the view is torn down
//!
//! Denials are ordinary states carrying a [`Redirect`], never errors. The only
//! error a guard reports is a detached session store, which is a wiring defect.

use crate::config::GuardConfig;
use crate::lifetime::ViewToken;
use crate::types::{CapabilitySource, GuardState, Redirect};
use tracing::{debug, error, warn};
use viapublica_core::{Capability, Result, ViaPublicaError, PERMISSION_TABLE};
use viapublica_session::{SessionContext, SessionSnapshot};

/// Decide the guard state for one snapshot.
///
/// An absent session short-circuits to [`GuardState::DeniedNoSession`] before
/// the permission table is consulted.
pub fn evaluate(snapshot: &SessionSnapshot, required: Capability, config: &GuardConfig) -> GuardState {
    evaluate_with(&PERMISSION_TABLE, snapshot, required, config)
}

/// [`evaluate`] against an explicit capability source.
pub fn evaluate_with<S>(
    source: &S,
    snapshot: &SessionSnapshot,
    required: Capability,
    config: &GuardConfig,
) -> GuardState
where
    S: CapabilitySource + ?Sized,
{
    if snapshot.is_resolving() {
        return GuardState::Pending;
    }
    let Some(session) = snapshot.session() else {
        return GuardState::DeniedNoSession {
            redirect: Redirect::Login {
                path: config.login_path.clone(),
            },
        };
    };
    let role = session.role();
    if source.capability_for(role, required) {
        GuardState::Granted
    } else {
        GuardState::DeniedNoCapability {
            role,
            redirect: Redirect::AccessDenied {
                path: config.access_denied_path.clone(),
            },
        }
    }
}

/// Inputs an evaluation depends on. Equal keys mean equal decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EvaluationKey {
    version: u64,
    required: Capability,
}

/// Result of [`AccessGuard::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPoll {
    /// Current state.
    pub state: GuardState,
    /// `true` if the state differs from the previous poll.
    pub changed: bool,
}

/// Outcome of [`AccessGuard::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardResolution {
    /// The guard reached a terminal state.
    Settled(GuardState),
    /// The view was torn down first; nothing should happen.
    Abandoned,
}

/// Per-view gate.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    required: Capability,
    config: GuardConfig,
    last: Option<(EvaluationKey, GuardState)>,
}

impl AccessGuard {
    /// Guard requiring `required`, with default redirect destinations.
    pub fn new(required: Capability) -> Self {
        Self::with_config(required, GuardConfig::default())
    }

    /// Guard with explicit configuration.
    pub fn with_config(required: Capability, config: GuardConfig) -> Self {
        Self {
            required,
            config,
            last: None,
        }
    }

    /// Guard for a capability given by name.
    ///
    /// Unknown names fail with `InvalidArgument`; a misconfigured guard is a
    /// defect, not a silent denial.
    pub fn for_capability_name(name: &str, config: GuardConfig) -> Result<Self> {
        config.validate()?;
        let required = name.parse()?;
        Ok(Self::with_config(required, config))
    }

    /// Override the no-session destination for this view.
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.config.login_path = path.into();
        self
    }

    /// Capability this view requires.
    pub fn required(&self) -> Capability {
        self.required
    }

    /// Configuration in effect.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Last decided state, `Pending` before the first poll.
    pub fn state(&self) -> GuardState {
        self.last
            .as_ref()
            .map_or(GuardState::Pending, |(_, state)| state.clone())
    }

    /// Change the required capability. The next poll re-evaluates.
    pub fn set_required(&mut self, required: Capability) {
        self.required = required;
    }

    fn record(&mut self, key: EvaluationKey, state: GuardState) -> GuardPoll {
        let changed = self
            .last
            .as_ref()
            .map_or(true, |(_, previous)| *previous != state);
        if changed {
            debug!(
                capability = %self.required,
                version = key.version,
                state = state.label(),
                "guard transition"
            );
        }
        self.last = Some((key, state.clone()));
        GuardPoll { state, changed }
    }

    /// Synchronous check against the store's current snapshot.
    ///
    /// Re-evaluates only if the session version or the required capability
    /// moved since the last decision; otherwise returns the cached state.
    pub fn poll(&mut self, ctx: &SessionContext) -> GuardPoll {
        self.poll_snapshot(&ctx.snapshot())
    }

    /// [`poll`](Self::poll) against an explicit snapshot.
    pub fn poll_snapshot(&mut self, snapshot: &SessionSnapshot) -> GuardPoll {
        self.poll_with(&PERMISSION_TABLE, snapshot)
    }

    /// [`poll_snapshot`](Self::poll_snapshot) against an explicit capability source.
    pub fn poll_with<S>(&mut self, source: &S, snapshot: &SessionSnapshot) -> GuardPoll
    where
        S: CapabilitySource + ?Sized,
    {
        let key = EvaluationKey {
            version: snapshot.version(),
            required: self.required,
        };
        if let Some((last_key, state)) = &self.last {
            if *last_key == key {
                return GuardPoll {
                    state: state.clone(),
                    changed: false,
                };
            }
        }
        let state = evaluate_with(source, snapshot, self.required, &self.config);
        self.record(key, state)
    }

    /// Wait for the store to resolve, then decide.
    ///
    /// - the view is torn down first: [`GuardResolution::Abandoned`], cached state untouched
    /// - the deadline passes: settles as [`GuardState::Failed`] with `SessionResolutionTimeout`
    /// - the writer disappears while resolving: `Err(StoreDetached)`
    pub async fn resolve(&mut self, ctx: &SessionContext, view: &ViewToken) -> Result<GuardResolution> {
        if view.is_torn_down() {
            return Ok(GuardResolution::Abandoned);
        }
        let mut reader = ctx.clone();
        let deadline = self.config.resolution_timeout;
        let waited = tokio::select! {
            biased;
            _ = view.torn_down() => None,
            waited = tokio::time::timeout(deadline, reader.resolved()) => Some(waited),
        };

        let Some(waited) = waited else {
            debug!(capability = %self.required, "view torn down before session resolved");
            return Ok(GuardResolution::Abandoned);
        };

        match waited {
            Ok(Ok(snapshot)) => Ok(GuardResolution::Settled(self.poll_snapshot(&snapshot).state)),
            Ok(Err(err)) => {
                error!(capability = %self.required, error = %err, "guard used without a live session store");
                Err(err)
            }
            Err(_elapsed) => Ok(GuardResolution::Settled(self.expire(ctx.version()).state)),
        }
    }

    /// Settle as [`GuardState::Failed`] because the store was still resolving
    /// at `version` when the configured timeout ran out.
    pub fn expire(&mut self, version: u64) -> GuardPoll {
        let waited = self.config.resolution_timeout;
        warn!(
            capability = %self.required,
            timeout_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
            "session resolution timed out"
        );
        let key = EvaluationKey {
            version,
            required: self.required,
        };
        let state = GuardState::Failed {
            error: ViaPublicaError::resolution_timeout(waited),
        };
        self.record(key, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viapublica_core::{Role, Session};
    use viapublica_session::SessionStore;

    fn session(role: Role) -> Session {
        Session::builder("Test", "test@example.com", role).build().unwrap()
    }

    #[test]
    fn resolving_store_is_pending() {
        let (_writer, ctx) = SessionStore::new();
        let state = evaluate(&ctx.snapshot(), Capability::ViewCatalog, &GuardConfig::default());
        assert_eq!(state, GuardState::Pending);
    }

    #[test]
    fn login_override_is_used_for_anonymous() {
        let (_writer, ctx) = SessionStore::resolved(None);
        let mut guard = AccessGuard::new(Capability::SaveFavorites).with_login_path("/auth/login?next=/favoritos");
        let poll = guard.poll(&ctx);
        assert_eq!(
            poll.state.redirect().map(Redirect::path),
            Some("/auth/login?next=/favoritos")
        );
    }

    #[test]
    fn unknown_capability_name_fails_loudly() {
        let err = AccessGuard::for_capability_name("canFly", GuardConfig::default()).unwrap_err();
        assert!(err.is_programming_error());
    }

    #[test]
    fn changing_required_capability_re_evaluates() {
        let (_writer, ctx) = SessionStore::resolved(Some(session(Role::SpaceClient)));
        let mut guard = AccessGuard::new(Capability::DefinePricing);
        assert!(guard.poll(&ctx).state.is_granted());

        guard.set_required(Capability::ManageRoles);
        let poll = guard.poll(&ctx);
        assert!(poll.changed);
        assert!(matches!(poll.state, GuardState::DeniedNoCapability { role: Role::SpaceClient, .. }));
    }

    #[test]
    fn first_poll_counts_as_change_then_stable() {
        let (_writer, ctx) = SessionStore::resolved(None);
        let mut guard = AccessGuard::new(Capability::ViewCatalog);
        assert!(guard.poll(&ctx).changed);
        assert!(!guard.poll(&ctx).changed);
        assert_eq!(guard.state(), guard.poll(&ctx).state);
    }
}
