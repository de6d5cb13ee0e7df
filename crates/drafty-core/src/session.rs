//! Signed-in user sessions
//!
//! Authentication happens elsewhere; Drafty only needs the opaque user ID
//! that scopes every collection key. A [`SessionProvider`] supplies the
//! current session and performs sign-out.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

/// Errors raised by session handling
#[derive(Error, Debug)]
pub enum SessionError {
    /// A per-user operation was attempted with nobody signed in
    #[error("No active session. Sign in first (drafty login <uid>).")]
    NoSession,

    /// The provider failed to end the session
    #[error("Sign-out failed: {0}")]
    SignOut(String),
}

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Session {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Email if known, otherwise the user ID
    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.uid)
    }
}

/// Source of the current session
pub trait SessionProvider {
    /// The session to bind, if anyone is signed in
    fn current(&self) -> Option<Session>;

    /// End the current session
    fn sign_out(&mut self) -> Result<(), SessionError>;
}

/// Session taken from configuration
///
/// Signing out forgets the session in memory; persisting that is up to
/// the caller.
#[derive(Debug, Clone, Default)]
pub struct ConfigSession {
    session: Option<Session>,
}

impl ConfigSession {
    pub fn new(session: Option<Session>) -> Self {
        Self { session }
    }

    pub fn from_config(config: &Config) -> Self {
        let session = config
            .uid
            .as_ref()
            .filter(|uid| !uid.trim().is_empty())
            .map(|uid| Session {
                uid: uid.clone(),
                email: config.email.clone(),
            });
        Self { session }
    }
}

impl SessionProvider for ConfigSession {
    fn current(&self) -> Option<Session> {
        self.session.clone()
    }

    fn sign_out(&mut self) -> Result<(), SessionError> {
        self.session = None;
        Ok(())
    }
}
