//! Session gate and the auth providers behind it.

mod local;
mod remote;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::{Session, UserId};

use crate::error::AuthError;

pub use local::LocalAuthProvider;
pub use remote::{RemoteAuthConfig, RemoteAuthProvider};

/// E-mail and password as typed into the login form.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Source of the current user session.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The active session, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` when the provider cannot be queried.
    async fn get_session(&self) -> Result<Option<Session>, AuthError>;

    /// Authenticate and make the resulting session current.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on rejection, or transport and
    /// storage errors.
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError>;

    /// Drop the current session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the provider could not be notified. The local
    /// session is cleared either way.
    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Outcome of checking the gate before a protected view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted(Session),
    Denied,
}

impl Access {
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Granted(session) => Some(session),
            Self::Denied => None,
        }
    }
}

/// Decides whether protected views may render.
#[derive(Clone)]
pub struct SessionGate {
    provider: Arc<dyn AuthProvider>,
}

impl SessionGate {
    #[must_use]
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    /// Look the session up. Provider failures are logged and deny access.
    pub async fn resolve(&self) -> Access {
        match self.provider.get_session().await {
            Ok(Some(session)) => Access::Granted(session),
            Ok(None) => Access::Denied,
            Err(err) => {
                tracing::error!(error = %err, "session lookup failed");
                Access::Denied
            }
        }
    }

    /// Id of the signed-in user, if any.
    pub async fn current_user_id(&self) -> Option<UserId> {
        self.resolve().await.session().map(Session::user_id)
    }

    /// Validate the e-mail shape, then delegate to the provider.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` before any provider call when the
    /// address is malformed, otherwise whatever the provider reports.
    pub async fn sign_in(&self, credentials: Credentials) -> Result<Session, AuthError> {
        let email = normalize_email(&credentials.email)?;
        let credentials = Credentials { email, ..credentials };
        let session = self.provider.sign_in(&credentials).await?;
        tracing::info!(user_id = %session.user_id(), "signed in");
        Ok(session)
    }

    /// # Errors
    ///
    /// Returns `AuthError` if the provider could not be notified.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await?;
        tracing::info!("signed out");
        Ok(())
    }
}

/// Trim and lowercase an address, rejecting anything without a
/// `local@domain.tld` shape.
pub(crate) fn normalize_email(raw: &str) -> Result<String, AuthError> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(AuthError::InvalidEmail(raw.trim().to_owned()))
    }
}
