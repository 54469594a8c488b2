//! Session types
//!
//! A [`Session`] is the live representation of "who is currently
//! authenticated". Sessions are immutable values: the role is fixed at
//! construction and a different role means a different session.

use crate::{ClientKind, Result, Role, ViaPublicaError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque session identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an existing identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Fresh random identifier.
    pub fn generate() -> Self {
        Self(format!("user-{}", Uuid::new_v4()))
    }

    /// Get the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The authenticated actor.
///
/// Deserialization goes through [`SessionRecord`] so a persisted session
/// carrying a client kind on a non-client role is rejected instead of
/// silently accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord", into = "SessionRecord")]
pub struct Session {
    id: SessionId,
    name: String,
    email: String,
    role: Role,
    client_kind: Option<ClientKind>,
    phone: Option<String>,
    email_verified: bool,
    created_at: DateTime<Utc>,
}

impl Session {
    /// Start building a session for `role`.
    pub fn builder(
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> SessionBuilder {
        SessionBuilder {
            id: None,
            name: name.into(),
            email: email.into(),
            role,
            client_kind: None,
            phone: None,
            email_verified: false,
            created_at: None,
        }
    }

    /// Session identity.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Role; fixed for the lifetime of the session.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Client kind, only ever set for [`Role::SpaceClient`].
    pub fn client_kind(&self) -> Option<ClientKind> {
        self.client_kind
    }

    /// Contact phone.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Whether the email address has been verified.
    pub fn email_verified(&self) -> bool {
        self.email_verified
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.client_kind {
            Some(kind) => write!(f, "{} <{}> as {}/{}", self.name, self.email, self.role, kind),
            None => write!(f, "{} <{}> as {}", self.name, self.email, self.role),
        }
    }
}

/// Builder for [`Session`].
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    id: Option<SessionId>,
    name: String,
    email: String,
    role: Role,
    client_kind: Option<ClientKind>,
    phone: Option<String>,
    email_verified: bool,
    created_at: Option<DateTime<Utc>>,
}

impl SessionBuilder {
    /// Use a specific identity instead of a generated one.
    pub fn id(mut self, id: SessionId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the client kind. Only valid for [`Role::SpaceClient`].
    pub fn client_kind(mut self, kind: ClientKind) -> Self {
        self.client_kind = Some(kind);
        self
    }

    /// Set the contact phone.
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Mark the email as verified.
    pub fn email_verified(mut self, verified: bool) -> Self {
        self.email_verified = verified;
        self
    }

    /// Override the creation timestamp.
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<Session> {
        if self.client_kind.is_some() && self.role != Role::SpaceClient {
            return Err(ViaPublicaError::invalid_argument(format!(
                "client kind is only meaningful for space_client, got role {}",
                self.role
            )));
        }
        if self.email.trim().is_empty() {
            return Err(ViaPublicaError::invalid_argument("session email is empty"));
        }
        Ok(Session {
            id: self.id.unwrap_or_else(SessionId::generate),
            name: self.name,
            email: self.email,
            role: self.role,
            client_kind: self.client_kind,
            phone: self.phone,
            email_verified: self.email_verified,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        })
    }
}

/// Wire shape of a persisted session, with the web client's camel-case keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    id: SessionId,
    name: String,
    email: String,
    role: String,
    #[serde(default, alias = "clienteType", skip_serializing_if = "Option::is_none")]
    client_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    #[serde(default)]
    email_verified: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<SessionRecord> for Session {
    type Error = ViaPublicaError;

    fn try_from(record: SessionRecord) -> Result<Self> {
        let role: Role = record.role.parse()?;
        let mut builder = Session::builder(record.name, record.email, role)
            .id(record.id)
            .email_verified(record.email_verified)
            .created_at(record.created_at);
        if let Some(kind) = record.client_kind {
            builder = builder.client_kind(kind.parse()?);
        }
        if let Some(phone) = record.phone {
            builder = builder.phone(phone);
        }
        builder.build()
    }
}

impl From<Session> for SessionRecord {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            name: session.name,
            email: session.email,
            role: session.role.as_str().to_string(),
            client_kind: session.client_kind.map(|kind| kind.as_str().to_string()),
            phone: session.phone,
            email_verified: session.email_verified,
            created_at: session.created_at,
        }
    }
}
