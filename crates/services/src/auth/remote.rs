use std::env;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use quiz_core::model::{Session, UserId};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{AuthProvider, Credentials};
use crate::Clock;
use crate::error::AuthError;

#[derive(Clone, Debug)]
pub struct RemoteAuthConfig {
    pub base_url: String,
    pub anon_key: String,
}

impl RemoteAuthConfig {
    /// Reads `QUIZ_AUTH_URL` and `QUIZ_AUTH_ANON_KEY`.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_vars(
            env::var("QUIZ_AUTH_URL").ok(),
            env::var("QUIZ_AUTH_ANON_KEY").ok(),
        )
    }

    #[must_use]
    pub fn from_vars(base_url: Option<String>, anon_key: Option<String>) -> Option<Self> {
        let base_url = base_url?.trim().trim_end_matches('/').to_owned();
        let anon_key = anon_key?.trim().to_owned();
        if base_url.is_empty() || anon_key.is_empty() {
            return None;
        }
        Some(Self { base_url, anon_key })
    }
}

/// GoTrue-compatible password sign-in over REST.
pub struct RemoteAuthProvider {
    client: Client,
    clock: Clock,
    config: Option<RemoteAuthConfig>,
    current: Mutex<Option<Session>>,
}

impl RemoteAuthProvider {
    #[must_use]
    pub fn new(clock: Clock, config: Option<RemoteAuthConfig>) -> Self {
        Self {
            client: Client::new(),
            clock,
            config,
            current: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    fn take_current(&self) -> Option<Session> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[async_trait]
impl AuthProvider for RemoteAuthProvider {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let config = self.config.as_ref().ok_or(AuthError::Disabled)?;
        if credentials.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let url = format!("{}/auth/v1/token?grant_type=password", config.base_url);
        let response = self
            .client
            .post(url)
            .header("apikey", &config.anon_key)
            .json(&PasswordGrant {
                email: &credentials.email,
                password: &credentials.password,
            })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                return Err(AuthError::InvalidCredentials);
            }
            status => return Err(AuthError::HttpStatus(status)),
        }

        let body: TokenResponse = response.json().await?;
        let user_id = body
            .user
            .id
            .parse::<UserId>()
            .map_err(|_| AuthError::UnexpectedResponse)?;
        let email = body.user.email.unwrap_or_else(|| credentials.email.clone());
        let session =
            Session::new(user_id, email, self.clock.now()).with_access_token(body.access_token);

        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.take_current() else {
            return Ok(());
        };
        let (Some(config), Some(token)) = (self.config.as_ref(), session.access_token()) else {
            return Ok(());
        };

        let response = self
            .client
            .post(format!("{}/auth/v1/logout", config.base_url))
            .header("apikey", &config.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::HttpStatus(response.status()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}
