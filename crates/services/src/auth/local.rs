use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use quiz_core::model::Session;
use storage::repository::UserRepository;

use super::{AuthProvider, Credentials};
use crate::Clock;
use crate::error::AuthError;

/// Offline provider: profiles live in the local `users` table and signing in
/// needs only an e-mail address. The active session is held in memory.
pub struct LocalAuthProvider {
    clock: Clock,
    users: Arc<dyn UserRepository>,
    current: Mutex<Option<Session>>,
}

impl LocalAuthProvider {
    #[must_use]
    pub fn new(clock: Clock, users: Arc<dyn UserRepository>) -> Self {
        Self {
            clock,
            users,
            current: Mutex::new(None),
        }
    }

    fn set_current(&self, session: Option<Session>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = session;
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let now = self.clock.now();
        let profile = self.users.find_or_create_user(&credentials.email, now).await?;
        let session = Session::new(profile.id, profile.email, now);
        self.set_current(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.set_current(None);
        Ok(())
    }
}
