//! services/client/src/session/state.rs
//!
//! Defines the shared application state handed to every session machine, and
//! the common mapping from port failures onto user-facing outcomes.

use std::sync::Arc;

use study_assistant_core::ports::{AuthApi, ChatApi, GenerationApi, KeyValueStore, SourceApi};
use study_assistant_core::vault::CredentialVault;
use study_assistant_core::ports::PortError;

//=========================================================================================
// AppState (Shared Across All Session Machines)
//=========================================================================================

/// The shared application state, created once at startup and passed to all
/// session machines. All collaborators are injected at construction so tests
/// can substitute doubles for the backend and both storage tiers.
#[derive(Clone)]
pub struct AppState {
    pub auth_api: Arc<dyn AuthApi>,
    pub source_api: Arc<dyn SourceApi>,
    pub generation_api: Arc<dyn GenerationApi>,
    pub chat_api: Arc<dyn ChatApi>,
    pub vault: Arc<CredentialVault>,
    /// The durable tier, also used directly for the selected-sources mirror.
    pub durable_store: Arc<dyn KeyValueStore>,
}

//=========================================================================================
// Action Outcomes
//=========================================================================================

/// The failure side of every user-triggered action.
///
/// `SessionExpired` is fatal: the vault has already been wiped and the caller
/// must drop all session state and restart from the auth flow (the client's
/// analogue of the forced page reload on 401).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("Your session has expired. Please log in again.")]
    SessionExpired,
    #[error("{0}")]
    Message(String),
}

impl AppState {
    /// Maps a port failure onto an action outcome. A 401 wipes the credential
    /// vault here, in one place, so no machine can forget to.
    pub fn map_port_error(&self, error: PortError) -> ActionError {
        match error {
            PortError::Unauthorized => {
                self.vault.clear();
                ActionError::SessionExpired
            }
            PortError::PayloadTooLarge(message) => ActionError::Message(format!(
                "Your study material is too large for the server: {}",
                message
            )),
            other => ActionError::Message(other.to_string()),
        }
    }
}
