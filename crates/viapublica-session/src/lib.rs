//! # Via Pública Session
//!
//! The session store the guards read from, and the flows that write to it.
//!
//! - [`store`]: single-writer, many-reader store with versioned snapshots
//! - [`persistence`]: where a signed-in session survives restarts
//! - [`auth`]: simulated login/registration/verification, owner of the writer
//! - [`password`]: registration password policy

pub mod auth;
pub mod password;
pub mod persistence;
pub mod store;

pub use auth::{AuthService, CredentialTable, Registration, VerificationToken, DEMO_PASSWORD};
pub use password::{is_valid_password, unmet_requirements, PasswordRequirement};
pub use persistence::{
    FileSessionPersistence, MemorySessionPersistence, SessionPersistence, SESSION_FILE_NAME,
};
pub use store::{
    SessionContext, SessionSnapshot, SessionStatus, SessionStore, SessionWriter,
    SESSION_LOAD_FAILED,
};
