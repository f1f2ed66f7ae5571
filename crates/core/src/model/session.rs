use chrono::{DateTime, Utc};

use crate::model::ids::UserId;

/// An authenticated user session.
///
/// Passed explicitly into every catalog and quiz entry point; nothing in the
/// workspace looks the current user up from ambient state.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
    email: String,
    access_token: Option<String>,
    signed_in_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn new(user_id: UserId, email: impl Into<String>, signed_in_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            email: email.into(),
            access_token: None,
            signed_in_at,
        }
    }

    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    #[must_use]
    pub fn signed_in_at(&self) -> DateTime<Utc> {
        self.signed_in_at
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("has_access_token", &self.access_token.is_some())
            .field("signed_in_at", &self.signed_in_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn debug_output_hides_token() {
        let session =
            Session::new(UserId::generate(), "a@b.c", fixed_now()).with_access_token("secret");
        let dbg = format!("{session:?}");
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains("has_access_token: true"));
    }
}
