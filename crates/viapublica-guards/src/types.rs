//! Guard vocabulary: redirects, states and the capability lookup contract.

use serde::{Deserialize, Serialize};
use viapublica_core::{Capability, PermissionTable, Role, ViaPublicaError};

/// Observable navigation outcome of a denied guard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Redirect {
    /// No session: send to the login page.
    Login {
        /// Login page
        path: String,
    },
    /// Session present but capability missing.
    AccessDenied {
        /// Access-denied page
        path: String,
    },
}

impl Redirect {
    /// Destination path.
    pub fn path(&self) -> &str {
        match self {
            Redirect::Login { path } | Redirect::AccessDenied { path } => path,
        }
    }
}

impl std::fmt::Display for Redirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Redirect::Login { path } => write!(f, "login-redirect -> {path}"),
            Redirect::AccessDenied { path } => write!(f, "access-denied-redirect -> {path}"),
        }
    }
}

/// State of one guarded view.
///
/// ```text
///            ┌──────────────► DeniedNoSession     (redirect to login)
/// Pending ───┼──────────────► DeniedNoCapability  (redirect to access denied)
///            ├──────────────► Granted             (render content)
///            └── deadline ──► Failed              (generic error state)
/// ```
///
/// Every state except `Pending` is terminal for one evaluation; a new
/// session version or required capability starts a new evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    /// Session not resolved yet. Show a neutral loading indicator, no content.
    Pending,
    /// Resolved with no session.
    DeniedNoSession {
        /// Where to send the visitor
        redirect: Redirect,
    },
    /// Resolved with a session whose role lacks the capability.
    DeniedNoCapability {
        /// Role of the denied session
        role: Role,
        /// Where to send the session
        redirect: Redirect,
    },
    /// Resolved with a session whose role holds the capability.
    Granted,
    /// Resolution did not finish in time.
    Failed {
        /// Always `SessionResolutionTimeout`
        error: ViaPublicaError,
    },
}

impl GuardState {
    /// `true` only for [`GuardState::Granted`].
    pub fn is_granted(&self) -> bool {
        matches!(self, GuardState::Granted)
    }

    /// `true` for anything but [`GuardState::Pending`].
    pub fn is_settled(&self) -> bool {
        !matches!(self, GuardState::Pending)
    }

    /// The redirect a presentation layer should perform, if any.
    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            GuardState::DeniedNoSession { redirect }
            | GuardState::DeniedNoCapability { redirect, .. } => Some(redirect),
            _ => None,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            GuardState::Pending => "pending",
            GuardState::DeniedNoSession { .. } => "denied-no-session",
            GuardState::DeniedNoCapability { .. } => "denied-no-capability",
            GuardState::Granted => "granted",
            GuardState::Failed { .. } => "failed",
        }
    }
}

impl std::fmt::Display for GuardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuardState::DeniedNoCapability { role, redirect } => {
                write!(f, "{} ({role}, {redirect})", self.label())
            }
            GuardState::DeniedNoSession { redirect } => write!(f, "{} ({redirect})", self.label()),
            GuardState::Failed { error } => write!(f, "{} ({error})", self.label()),
            _ => f.write_str(self.label()),
        }
    }
}

/// Minimal lookup contract the guard needs from a permission table.
pub trait CapabilitySource {
    /// Returns `true` if `role` holds `cap`.
    fn capability_for(&self, role: Role, cap: Capability) -> bool;
}

impl CapabilitySource for PermissionTable {
    fn capability_for(&self, role: Role, cap: Capability) -> bool {
        PermissionTable::capability_for(self, role, cap)
    }
}
