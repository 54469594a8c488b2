//! `visit` and `menu`: run the guards against the persisted session.

use anyhow::Result;
use std::io::Write;
use tracing::info;
use viapublica_guards::{
    guard_for, menu_for, route, GuardConfig, GuardedView, RecordingNavigator, Render,
};
use viapublica_session::SessionContext;

/// What a visit to a path ended in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitOutcome {
    /// Public route, no guard involved.
    Public,
    /// The guarded view rendered this, possibly after navigating.
    Guarded {
        /// Final render
        render: Render,
        /// Redirect target, if the view navigated
        navigated_to: Option<String>,
    },
}

/// Mount the view behind `path` and report what a browser would see.
pub async fn visit<W: Write>(
    ctx: &SessionContext,
    path: &str,
    config: &GuardConfig,
    out: &mut W,
) -> Result<VisitOutcome> {
    let Some(guard) = guard_for(path, config)? else {
        writeln!(out, "{path}: public")?;
        return Ok(VisitOutcome::Public);
    };
    let title = route(path).map_or(path, |r| r.title);
    let navigator = RecordingNavigator::new();
    let mut view = GuardedView::new(guard, navigator.clone());
    let render = view.mount(ctx).await?;
    let navigated_to = navigator.last().map(|redirect| redirect.path().to_string());

    info!(%path, state = view.guard().state().label(), "visited");
    match (&render, &navigated_to) {
        (Render::Content, _) => writeln!(out, "{path}: granted ({title})")?,
        (Render::Error { message }, _) => writeln!(out, "{path}: error: {message}")?,
        (_, Some(to)) => writeln!(out, "{path}: {} -> {to}", view.guard().state().label())?,
        (render, None) => writeln!(out, "{path}: {render:?}")?,
    }
    Ok(VisitOutcome::Guarded {
        render,
        navigated_to,
    })
}

/// List the account menu for the current session.
pub fn menu<W: Write>(ctx: &SessionContext, out: &mut W) -> Result<usize> {
    let session = ctx.current_session();
    let entries = menu_for(session.as_deref());
    if session.is_none() {
        writeln!(out, "not signed in")?;
        return Ok(0);
    }
    for entry in &entries {
        writeln!(out, "{:<24} {}", entry.path, entry.title)?;
    }
    Ok(entries.len())
}
