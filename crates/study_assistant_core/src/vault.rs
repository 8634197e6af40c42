//! crates/study_assistant_core/src/vault.rs
//!
//! The tiered credential store. Saves the token and user profile into either
//! the durable tier ("remember me") or the session-scoped tier, loads by
//! checking the durable tier first, and clears both unconditionally.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::domain::{Credential, UserProfile};
use crate::ports::KeyValueStore;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

pub struct CredentialVault {
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
}

impl CredentialVault {
    pub fn new(durable: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        Self { durable, session }
    }

    /// Writes the credential into the chosen tier. The other tier is left
    /// untouched; `clear` is the only operation that touches both.
    pub fn save(&self, credential: &Credential, durable: bool) {
        let tier = if durable { &self.durable } else { &self.session };
        tier.put(TOKEN_KEY, &credential.token);
        let user = json!({
            "id": credential.user.id,
            "username": credential.user.username,
            "email": credential.user.email,
        });
        tier.put(USER_KEY, &user.to_string());
    }

    /// Loads a stored credential, durable tier first. A token without a
    /// parseable user blob counts as absent and is wiped so the next load
    /// starts clean.
    pub fn load(&self) -> Option<Credential> {
        for tier in [&self.durable, &self.session] {
            let Some(token) = tier.get(TOKEN_KEY) else {
                continue;
            };
            match tier.get(USER_KEY).as_deref().and_then(parse_user) {
                Some(user) => return Some(Credential { token, user }),
                None => {
                    tier.remove(TOKEN_KEY);
                    tier.remove(USER_KEY);
                }
            }
        }
        None
    }

    /// Removes the credential from both tiers.
    pub fn clear(&self) {
        for tier in [&self.durable, &self.session] {
            tier.remove(TOKEN_KEY);
            tier.remove(USER_KEY);
        }
    }
}

fn parse_user(raw: &str) -> Option<UserProfile> {
    let value: Value = serde_json::from_str(raw).ok()?;
    Some(UserProfile {
        id: value.get("id")?.as_i64()?,
        username: value.get("username")?.as_str()?.to_string(),
        email: value.get("email")?.as_str()?.to_string(),
    })
}
