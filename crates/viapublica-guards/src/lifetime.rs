//! View lifetime and cooperative cancellation.
//!
//! A guarded view owns a [`ViewLifetime`]; anything waiting on its behalf holds
//! a [`ViewToken`]. Tearing the view down flips a watch flag, and pending
//! resolutions give up without producing a redirect.

use std::sync::Arc;
use tokio::sync::watch;

/// Owner side of a view's lifetime. Clones share the same flag.
#[derive(Debug, Clone)]
pub struct ViewLifetime {
    torn_down: Arc<watch::Sender<bool>>,
}

impl ViewLifetime {
    /// A live view.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            torn_down: Arc::new(tx),
        }
    }

    /// Token for work done on behalf of this view.
    pub fn token(&self) -> ViewToken {
        ViewToken {
            torn_down: self.torn_down.subscribe(),
        }
    }

    /// Mark the view as gone. Idempotent.
    pub fn teardown(&self) {
        self.torn_down.send_replace(true);
    }

    /// `true` after [`teardown`](Self::teardown).
    pub fn is_torn_down(&self) -> bool {
        *self.torn_down.borrow()
    }
}

impl Default for ViewLifetime {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side, held by work done on behalf of the view.
#[derive(Debug, Clone)]
pub struct ViewToken {
    torn_down: watch::Receiver<bool>,
}

impl ViewToken {
    /// Non-blocking check.
    pub fn is_torn_down(&self) -> bool {
        *self.torn_down.borrow()
    }

    /// Resolves once the view is torn down. Never resolves if the lifetime
    /// is dropped without a teardown.
    pub async fn torn_down(&self) {
        let mut rx = self.torn_down.clone();
        if rx.wait_for(|gone| *gone).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn teardown_wakes_waiters() {
        let lifetime = ViewLifetime::new();
        let token = lifetime.token();
        assert!(!token.is_torn_down());

        let waiter = tokio::spawn(async move { token.torn_down().await });
        tokio::task::yield_now().await;
        lifetime.teardown();
        waiter.await.unwrap();
        assert!(lifetime.is_torn_down());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_lifetime_is_not_a_teardown() {
        let lifetime = ViewLifetime::new();
        let token = lifetime.token();
        drop(lifetime);
        let result = tokio::time::timeout(Duration::from_secs(1), token.torn_down()).await;
        assert!(result.is_err());
    }
}
