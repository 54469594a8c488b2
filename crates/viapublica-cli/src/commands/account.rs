//! `login`, `logout`, `register` and `whoami`.
//!
//! The credential table is the built-in demo set. Accounts created with
//! `register` live only for the duration of the invocation.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use viapublica_core::{permissions_for, ClientKind, Permissions, Role, Session};
use viapublica_session::{AuthService, Registration, SessionPersistence};

/// Sign in with a table account and persist the session.
pub async fn login<P, W>(auth: &AuthService<P>, email: &str, password: &str, out: &mut W) -> Result<()>
where
    P: SessionPersistence,
    W: Write,
{
    let session = auth
        .login(email, password)
        .await
        .with_context(|| format!("login as {email} failed"))?;
    writeln!(out, "signed in as {session}")?;
    Ok(())
}

/// Sign out, reporting whether there was anything to clear.
pub async fn logout<P, W>(auth: &AuthService<P>, out: &mut W) -> Result<()>
where
    P: SessionPersistence,
    W: Write,
{
    let had_session = auth.context().current_session().is_some();
    auth.logout().await?;
    if had_session {
        writeln!(out, "signed out")?;
    } else {
        writeln!(out, "no session to sign out")?;
    }
    Ok(())
}

/// Arguments of `register`, as given on the command line.
#[derive(Debug, Clone, clap::Args)]
pub struct RegisterArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Email address
    #[arg(long)]
    pub email: String,

    /// Password (8+ chars, upper, lower, digit and one of @$!%*?&)
    #[arg(long)]
    pub password: String,

    /// Repeat the password; defaults to `--password`
    #[arg(long)]
    pub confirm: Option<String>,

    /// standard_user or space_client
    #[arg(long, default_value = "standard_user")]
    pub role: String,

    /// owner or agency, space clients only
    #[arg(long)]
    pub client_kind: Option<String>,

    /// Contact phone
    #[arg(long)]
    pub phone: Option<String>,

    /// Confirm the email with the issued token right away
    #[arg(long)]
    pub verify: bool,
}

impl RegisterArgs {
    fn into_registration(self) -> Result<Registration> {
        let role: Role = self.role.parse()?;
        let client_kind = self
            .client_kind
            .as_deref()
            .map(str::parse::<ClientKind>)
            .transpose()?;
        Ok(Registration {
            name: self.name,
            email: self.email,
            password_confirmation: self.confirm.unwrap_or_else(|| self.password.clone()),
            password: self.password,
            role,
            client_kind,
            phone: self.phone,
        })
    }
}

/// Create an unverified account, optionally verifying it right away.
pub async fn register<P, W>(auth: &AuthService<P>, args: RegisterArgs, out: &mut W) -> Result<()>
where
    P: SessionPersistence,
    W: Write,
{
    let verify = args.verify;
    let email = args.email.clone();
    let token = auth.register(args.into_registration()?).await?;
    writeln!(out, "account created for {email}; verification token {token}")?;
    if verify {
        auth.verify_email(&token).await?;
        writeln!(out, "email verified; sign in with `viapublica login`")?;
    } else {
        writeln!(out, "verify the email before signing in")?;
    }
    Ok(())
}

#[derive(Serialize)]
struct WhoAmI<'a> {
    session: Option<&'a Session>,
    permissions: Permissions,
}

/// Print the current session and its `can*` record as JSON.
pub fn whoami<P, W>(auth: &AuthService<P>, out: &mut W) -> Result<()>
where
    P: SessionPersistence,
    W: Write,
{
    let session = auth.context().current_session();
    let report = WhoAmI {
        session: session.as_deref(),
        permissions: permissions_for(session.as_deref()),
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}
