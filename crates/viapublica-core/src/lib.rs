//! # Via Pública Core
//!
//! Role-based access control primitives for the outdoor advertising marketplace:
//!
//! - [`Role`] and [`ClientKind`]: who the actor is
//! - [`Capability`]: the closed set of permission bits
//! - [`PermissionTable`]: the static `Role × Capability` truth table
//! - [`Session`]: the authenticated actor held by the session store
//!
//! ```text
//! capability_for(role, capability) -> bool      pure, total, const
//! require(Option<&Session>, capability)          hard check, Err on deny
//! permissions_for(Option<&Session>)              soft UI visibility record
//! ```
//!
//! Everything here is synchronous and allocation-light; the async session
//! store lives in `viapublica-session` and the guard state machine in
//! `viapublica-guards`.

pub mod capability;
pub mod errors;
pub mod permissions;
pub mod role;
pub mod session;

pub use capability::{Capability, CapabilitySet};
pub use errors::{Result, ViaPublicaError};
pub use permissions::{
    capability_for, grants, permissions_for, require, PermissionTable, Permissions,
    PERMISSION_TABLE,
};
pub use role::{ClientKind, Role};
pub use session::{Session, SessionBuilder, SessionId, SessionRecord};
