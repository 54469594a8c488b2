//! Presentation adapter
//!
//! [`GuardedView`] turns guard states into what a UI does: show a loading
//! indicator, show content, show an error, or navigate. Navigation is a side
//! effect behind the [`Navigator`] trait and fires once per transition into a
//! denied state, so repeated renders with the same session never re-redirect.

use crate::guard::{AccessGuard, GuardResolution};
use crate::lifetime::ViewLifetime;
use crate::types::{GuardState, Redirect};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::time::{sleep_until, Instant};
use tracing::info;
use viapublica_core::Result;
use viapublica_session::SessionContext;

/// Performs navigation for denied views.
pub trait Navigator: Send + Sync {
    /// Navigate to `redirect`.
    fn navigate(&self, redirect: &Redirect);
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn navigate(&self, redirect: &Redirect) {
        (**self).navigate(redirect);
    }
}

/// Navigator that records every redirect it is asked to perform.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    history: Arc<Mutex<Vec<Redirect>>>,
}

impl RecordingNavigator {
    /// Navigator with an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Redirects performed so far, oldest first.
    pub fn history(&self) -> Vec<Redirect> {
        self.history.lock().clone()
    }

    /// Most recent redirect.
    pub fn last(&self) -> Option<Redirect> {
        self.history.lock().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, redirect: &Redirect) {
        self.history.lock().push(redirect.clone());
    }
}

/// What the view should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Render {
    /// Neutral loading indicator; nothing of the guarded content.
    Loading,
    /// The guarded content.
    Content,
    /// Nothing; a redirect is (or was) in progress.
    Blank,
    /// Generic error state, e.g. session resolution timed out.
    Error {
        /// Human-readable cause
        message: String,
    },
}

/// A view instance gated by an [`AccessGuard`].
pub struct GuardedView<N> {
    guard: AccessGuard,
    navigator: N,
    lifetime: ViewLifetime,
    last_redirect: Option<Redirect>,
}

impl<N: Navigator> GuardedView<N> {
    /// Live view gated by `guard`, navigating through `navigator`.
    pub fn new(guard: AccessGuard, navigator: N) -> Self {
        Self {
            guard,
            navigator,
            lifetime: ViewLifetime::new(),
            last_redirect: None,
        }
    }

    /// The view's guard.
    pub fn guard(&self) -> &AccessGuard {
        &self.guard
    }

    /// Mutable guard, e.g. to change the required capability.
    pub fn guard_mut(&mut self) -> &mut AccessGuard {
        &mut self.guard
    }

    /// Handle that can tear the view down from elsewhere.
    pub fn lifetime(&self) -> ViewLifetime {
        self.lifetime.clone()
    }

    /// Tear the view down; pending resolutions are abandoned.
    pub fn teardown(&self) {
        self.lifetime.teardown();
    }

    fn apply(&mut self, state: &GuardState) -> Render {
        match state {
            GuardState::Pending => {
                self.last_redirect = None;
                Render::Loading
            }
            GuardState::Granted => {
                self.last_redirect = None;
                Render::Content
            }
            GuardState::DeniedNoSession { redirect } | GuardState::DeniedNoCapability { redirect, .. } => {
                if self.lifetime.is_torn_down() {
                    return Render::Blank;
                }
                if self.last_redirect.as_ref() != Some(redirect) {
                    info!(capability = %self.guard.required(), %redirect, "redirecting");
                    self.navigator.navigate(redirect);
                    self.last_redirect = Some(redirect.clone());
                }
                Render::Blank
            }
            GuardState::Failed { error } => {
                self.last_redirect = None;
                Render::Error {
                    message: error.to_string(),
                }
            }
        }
    }

    /// Render against the store's current snapshot.
    pub fn render(&mut self, ctx: &SessionContext) -> Render {
        let poll = self.guard.poll(ctx);
        self.apply(&poll.state)
    }

    /// Wait for session resolution (bounded), then render.
    ///
    /// Returns [`Render::Blank`] without navigating if the view is torn down
    /// while waiting.
    pub async fn mount(&mut self, ctx: &SessionContext) -> Result<Render> {
        let token = self.lifetime.token();
        match self.guard.resolve(ctx, &token).await? {
            GuardResolution::Settled(state) => Ok(self.apply(&state)),
            GuardResolution::Abandoned => Ok(Render::Blank),
        }
    }

    /// Re-render after every store change until the view is torn down.
    ///
    /// `on_render` sees each render whose guard state changed. While the
    /// store is resolving, the wait is bounded by the guard's
    /// `resolution_timeout`; on expiry the view renders [`Render::Error`]
    /// until the store moves again.
    pub async fn follow<F>(&mut self, ctx: &SessionContext, mut on_render: F) -> Result<()>
    where
        F: FnMut(&Render),
    {
        let token = self.lifetime.token();
        let mut reader = ctx.clone();
        let timeout = self.guard.config().resolution_timeout;
        let mut snapshot = reader.snapshot();
        on_render(&self.render(&reader));

        // Armed while resolving; disarmed once it fires or the store resolves.
        let mut deadline = snapshot.is_resolving().then(|| Instant::now() + timeout);
        let mut expired = false;
        loop {
            tokio::select! {
                biased;
                _ = token.torn_down() => return Ok(()),
                changed = reader.changed() => {
                    snapshot = changed?;
                    if !snapshot.is_resolving() {
                        deadline = None;
                        expired = false;
                    } else if deadline.is_none() && !expired {
                        deadline = Some(Instant::now() + timeout);
                    }
                    let poll = self.guard.poll_snapshot(&snapshot);
                    if poll.changed {
                        let render = self.apply(&poll.state);
                        on_render(&render);
                    }
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    expired = true;
                    let poll = self.guard.expire(snapshot.version());
                    if poll.changed {
                        let render = self.apply(&poll.state);
                        on_render(&render);
                    }
                }
            }
        }
    }
}
