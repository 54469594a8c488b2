//! Simulated account flows
//!
//! Login, registration, email verification and logout for the marketplace.
//! There is no backend: credentials are checked against an in-process
//! [`CredentialTable`] seeded with demo accounts. [`AuthService`] owns the
//! store's [`SessionWriter`], which makes it the single writer of session
//! state; everything else reads through a [`SessionContext`].

use crate::password::unmet_requirements;
use crate::persistence::SessionPersistence;
use crate::store::{SessionContext, SessionWriter};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use viapublica_core::{ClientKind, Result, Role, Session, SessionId, ViaPublicaError};

/// Password shared by the seeded demo accounts.
pub const DEMO_PASSWORD: &str = "ViaPublica@2024";

const INVALID_CREDENTIALS: &str = "invalid credentials";
const EMAIL_NOT_VERIFIED: &str = "email not verified";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn password_digest(email: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"viapublica:");
    hasher.update(normalize_email(email).as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

#[derive(Debug, Clone)]
struct Account {
    id: SessionId,
    name: String,
    email: String,
    role: Role,
    client_kind: Option<ClientKind>,
    phone: Option<String>,
    password_digest: String,
    email_verified: bool,
    created_at: DateTime<Utc>,
}

impl Account {
    fn to_session(&self) -> Result<Session> {
        let mut builder = Session::builder(self.name.clone(), self.email.clone(), self.role)
            .id(self.id.clone())
            .email_verified(self.email_verified)
            .created_at(self.created_at);
        if let Some(kind) = self.client_kind {
            builder = builder.client_kind(kind);
        }
        if let Some(phone) = &self.phone {
            builder = builder.phone(phone.clone());
        }
        builder.build()
    }
}

/// Hard-coded account table standing in for a user database.
#[derive(Debug, Clone, Default)]
pub struct CredentialTable {
    accounts: HashMap<String, Account>,
}

impl CredentialTable {
    /// Table with no accounts.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table seeded with one verified account per role and client kind.
    ///
    /// | email                          | role          | kind   |
    /// |--------------------------------|---------------|--------|
    /// | `usuario@viapublica.demo`      | standard_user |        |
    /// | `dueno@viapublica.demo`        | space_client  | owner  |
    /// | `agencia@viapublica.demo`      | space_client  | agency |
    /// | `admin@viapublica.demo`        | administrator |        |
    ///
    /// All use [`DEMO_PASSWORD`].
    pub fn demo() -> Self {
        let mut table = Self::empty();
        let seeds = [
            ("user-demo-usuario", "Usuario Demo", "usuario@viapublica.demo", Role::StandardUser, None),
            ("user-demo-dueno", "Dueño Demo", "dueno@viapublica.demo", Role::SpaceClient, Some(ClientKind::Owner)),
            ("user-demo-agencia", "Agencia Demo", "agencia@viapublica.demo", Role::SpaceClient, Some(ClientKind::Agency)),
            ("user-demo-admin", "Administrador Demo", "admin@viapublica.demo", Role::Administrator, None),
        ];
        for (id, name, email, role, client_kind) in seeds {
            table.insert(Account {
                id: SessionId::new(id),
                name: name.to_string(),
                email: email.to_string(),
                role,
                client_kind,
                phone: None,
                password_digest: password_digest(email, DEMO_PASSWORD),
                email_verified: true,
                created_at: Utc::now(),
            });
        }
        table
    }

    fn insert(&mut self, account: Account) {
        self.accounts.insert(normalize_email(&account.email), account);
    }

    fn get(&self, email: &str) -> Option<&Account> {
        self.accounts.get(&normalize_email(email))
    }

    fn get_mut(&mut self, email: &str) -> Option<&mut Account> {
        self.accounts.get_mut(&normalize_email(email))
    }

    /// `true` if an account exists for `email`.
    pub fn contains(&self, email: &str) -> bool {
        self.get(email).is_some()
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// `true` if there are no accounts.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Registration form contents.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Display name
    pub name: String,
    /// Email address, also the login
    pub email: String,
    /// Chosen password
    pub password: String,
    /// Must equal `password`
    pub password_confirmation: String,
    /// Requested role; administrators cannot self-register
    pub role: Role,
    /// Required for `space_client`, forbidden otherwise
    pub client_kind: Option<ClientKind>,
    /// Optional contact phone
    pub phone: Option<String>,
}

impl Registration {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ViaPublicaError::validation("name is required"));
        }
        if !looks_like_email(self.email.trim()) {
            return Err(ViaPublicaError::validation(format!(
                "'{}' is not a valid email address",
                self.email
            )));
        }
        let unmet = unmet_requirements(&self.password);
        if !unmet.is_empty() {
            let rules: Vec<&str> = unmet.iter().map(|req| req.description()).collect();
            return Err(ViaPublicaError::validation(format!(
                "password does not meet: {}",
                rules.join("; ")
            )));
        }
        if self.password != self.password_confirmation {
            return Err(ViaPublicaError::validation("passwords do not match"));
        }
        match (self.role, self.client_kind) {
            (Role::Administrator, _) => Err(ViaPublicaError::validation(
                "administrator accounts cannot be self-registered",
            )),
            (Role::SpaceClient, None) => Err(ViaPublicaError::validation(
                "space clients must choose owner or agency",
            )),
            (Role::StandardUser, Some(_)) => Err(ViaPublicaError::validation(
                "client kind is only valid for space clients",
            )),
            _ => Ok(()),
        }
    }
}

/// One-shot token that confirms an email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VerificationToken(String);

impl VerificationToken {
    fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wrap a token received from a verification link.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VerificationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The session store's single writer.
pub struct AuthService<P> {
    writer: SessionWriter,
    persistence: P,
    accounts: Mutex<CredentialTable>,
    pending: Mutex<HashMap<VerificationToken, String>>,
}

impl<P: SessionPersistence> AuthService<P> {
    /// Take ownership of the writer.
    pub fn new(writer: SessionWriter, persistence: P, accounts: CredentialTable) -> Self {
        Self {
            writer,
            persistence,
            accounts: Mutex::new(accounts),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// A reader handle for guards and views.
    pub fn context(&self) -> SessionContext {
        self.writer.context()
    }

    /// Backing persistence.
    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Restore the persisted session at startup.
    pub async fn restore(&self) -> Option<Arc<Session>> {
        self.writer.restore(&self.persistence).await
    }

    /// Sign in against the credential table and replace the current session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Arc<Session>> {
        let session = {
            let accounts = self.accounts.lock();
            let account = accounts
                .get(email)
                .filter(|account| account.password_digest == password_digest(email, password))
                .ok_or_else(|| {
                    debug!(email = %normalize_email(email), "login rejected");
                    ViaPublicaError::authentication(INVALID_CREDENTIALS)
                })?;
            if !account.email_verified {
                return Err(ViaPublicaError::authentication(EMAIL_NOT_VERIFIED));
            }
            account.to_session()?
        };
        self.persistence.save(&session).await?;
        Ok(self.writer.sign_in(session))
    }

    /// Create an unverified account. Never starts a session.
    pub async fn register(&self, registration: Registration) -> Result<VerificationToken> {
        registration.validate()?;
        let email = registration.email.trim().to_string();
        {
            let mut accounts = self.accounts.lock();
            if accounts.contains(&email) {
                return Err(ViaPublicaError::validation(format!(
                    "an account already exists for {email}"
                )));
            }
            accounts.insert(Account {
                id: SessionId::generate(),
                name: registration.name.trim().to_string(),
                email: email.clone(),
                role: registration.role,
                client_kind: registration.client_kind,
                phone: registration.phone,
                password_digest: password_digest(&email, &registration.password),
                email_verified: false,
                created_at: Utc::now(),
            });
        }
        let token = self.issue_token(&email);
        info!(email = %normalize_email(&email), role = %registration.role, "account registered, verification pending");
        Ok(token)
    }

    /// Confirm the email bound to `token`. Does not sign in.
    pub async fn verify_email(&self, token: &VerificationToken) -> Result<()> {
        let email = self
            .pending
            .lock()
            .remove(token)
            .ok_or_else(|| ViaPublicaError::not_found("verification token"))?;
        let mut accounts = self.accounts.lock();
        let account = accounts
            .get_mut(&email)
            .ok_or_else(|| ViaPublicaError::not_found(format!("account for {email}")))?;
        account.email_verified = true;
        info!(email = %email, "email verified");
        Ok(())
    }

    /// Issue a fresh token for an unverified account, revoking older ones.
    pub async fn resend_verification(&self, email: &str) -> Result<VerificationToken> {
        let verified = self
            .accounts
            .lock()
            .get(email)
            .map(|account| account.email_verified)
            .ok_or_else(|| ViaPublicaError::not_found(format!("account for {email}")))?;
        if verified {
            return Err(ViaPublicaError::validation(format!(
                "{email} is already verified"
            )));
        }
        Ok(self.issue_token(email))
    }

    fn issue_token(&self, email: &str) -> VerificationToken {
        let email = normalize_email(email);
        let token = VerificationToken::generate();
        let mut pending = self.pending.lock();
        pending.retain(|_, pending_email| *pending_email != email);
        pending.insert(token.clone(), email);
        token
    }

    /// Clear the live and persisted session.
    ///
    /// The live session is cleared even when the persisted copy cannot be;
    /// the storage error is still returned.
    pub async fn logout(&self) -> Result<()> {
        let cleared = self.persistence.clear().await;
        self.writer.sign_out();
        if let Err(err) = &cleared {
            warn!(error = %err, "failed to clear persisted session");
        }
        cleared
    }
}
