//! services/client/src/session/auth.rs
//!
//! The login/register flow: a two-mode form machine that validates
//! client-side before any network call, exchanges credentials with the
//! backend, and persists the resulting token via the credential vault.

use std::sync::Arc;

use study_assistant_core::domain::Credential;
use study_assistant_core::password;
use study_assistant_core::ports::PortError;
use tracing::debug;

use crate::session::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

/// The authentication form state machine.
pub struct AuthFlow {
    state: Arc<AppState>,
    mode: AuthMode,
    pub username: String,
    pub email: String,
    pub password: String,
    pub remember_me: bool,
    error: Option<String>,
}

impl AuthFlow {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            mode: AuthMode::Login,
            username: String::new(),
            email: String::new(),
            password: String::new(),
            remember_me: false,
            error: None,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Flips between login and register, resetting all form fields and the
    /// error state. Never touches the network.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.username.clear();
        self.email.clear();
        self.password.clear();
        self.remember_me = false;
        self.error = None;
    }

    /// Runs the ordered client-side validation; the first failing rule wins
    /// and aborts submission before any network call.
    fn validate(&self) -> Option<String> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Some("Username and password are required".to_string());
        }
        if self.mode == AuthMode::Register {
            if self.email.trim().is_empty() {
                return Some("Email is required for registration".to_string());
            }
            let unmet = password::evaluate(&self.password);
            if !unmet.is_empty() {
                // Enumerate every unmet rule, not just the first.
                return Some(password::requirements_message(&unmet));
            }
        }
        None
    }

    /// Submits the form. On success the credential is persisted (durable tier
    /// iff "remember me") and returned; on failure `error()` carries the
    /// user-facing message. Register returns the same payload shape as login
    /// and is treated identically by the caller.
    pub async fn submit(&mut self) -> Option<Credential> {
        self.error = None;
        if let Some(message) = self.validate() {
            self.error = Some(message);
            return None;
        }

        let result = match self.mode {
            AuthMode::Login => {
                self.state
                    .auth_api
                    .login(self.username.trim(), &self.password)
                    .await
            }
            AuthMode::Register => {
                self.state
                    .auth_api
                    .register(self.username.trim(), self.email.trim(), &self.password)
                    .await
            }
        };

        match result {
            Ok(credential) => {
                self.state.vault.save(&credential, self.remember_me);
                debug!("Authenticated as user {}", credential.user.id);
                Some(credential)
            }
            Err(error) => {
                // A 401 here is a rejected login, not an expired session.
                self.error = Some(match error {
                    PortError::Unauthorized => "Invalid username or password".to_string(),
                    PortError::Http { message, .. } => message,
                    other => other.to_string(),
                });
                None
            }
        }
    }
}
