//! # Via Pública Guards
//!
//! Per-view access gating on top of the session store.
//!
//! A view declares one required [`Capability`](viapublica_core::Capability).
//! Its [`AccessGuard`] stays [`GuardState::Pending`] while the session is being
//! restored, then settles into one of:
//!
//! | session            | role holds capability | state                 |
//! |--------------------|-----------------------|-----------------------|
//! | absent             | n/a                   | `DeniedNoSession`     |
//! | present            | no                    | `DeniedNoCapability`  |
//! | present            | yes                   | `Granted`             |
//!
//! A session change (sign-in, sign-out, a different user) triggers
//! re-evaluation on the next poll. [`GuardedView`] maps states to renders and
//! performs each redirect once; [`sitemap`] ties paths to capabilities so
//! menus and guards never disagree.

pub mod config;
pub mod guard;
pub mod lifetime;
pub mod sitemap;
pub mod types;
pub mod view;

pub use config::{
    GuardConfig, DEFAULT_ACCESS_DENIED_PATH, DEFAULT_LOGIN_PATH, DEFAULT_RESOLUTION_TIMEOUT,
};
pub use guard::{evaluate, evaluate_with, AccessGuard, GuardPoll, GuardResolution};
pub use lifetime::{ViewLifetime, ViewToken};
pub use sitemap::{guard_for, menu_for, route, Access, Route, ROUTES};
pub use types::{CapabilitySource, GuardState, Redirect};
pub use view::{GuardedView, Navigator, RecordingNavigator, Render};
