use serde::Deserialize;
use spin_sdk::http::{Request, Response};

use crate::config::CURRENT_USER_KEY;
use crate::core::errors::SocialError;
use crate::core::helpers::{json_response, parse_body, respond};
use crate::core::storage::KeyValue;
use crate::network::Network;

/// The signed-in user, handed explicitly to every operation that acts on
/// someone's behalf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    username: String,
}

impl Session {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is(&self, username: &str) -> bool {
        self.username == username
    }
}

/// Record `username` as the current user. Credentials are checked by the caller.
pub fn login(store: &dyn KeyValue, username: &str) -> anyhow::Result<Session> {
    store.set(CURRENT_USER_KEY, username)?;
    tracing::info!(username, "session started");
    Ok(Session {
        username: username.to_string(),
    })
}

pub fn logout(store: &dyn KeyValue) -> anyhow::Result<()> {
    store.delete(CURRENT_USER_KEY)?;
    tracing::info!("session ended");
    Ok(())
}

pub fn current(store: &dyn KeyValue) -> Option<Session> {
    match store.get(CURRENT_USER_KEY) {
        Ok(Some(username)) if !username.trim().is_empty() => Some(Session {
            username: username.trim().to_string(),
        }),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "could not read session");
            None
        }
    }
}

pub fn require(store: &dyn KeyValue) -> Result<Session, SocialError> {
    current(store).ok_or(SocialError::Unauthorized)
}

// === HTTP Handlers ===

#[derive(Deserialize)]
struct Credentials {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

pub fn login_user(store: &dyn KeyValue, req: &Request) -> anyhow::Result<Response> {
    let creds: Credentials = match parse_body(req) {
        Ok(c) => c,
        Err(e) => return Ok(e.into()),
    };
    let network = Network::open(store);
    let result = network
        .login(creds.username.trim(), &creds.password)
        .map(|session| serde_json::json!({ "username": session.username() }));
    respond(200, result)
}

pub fn logout_user(store: &dyn KeyValue) -> anyhow::Result<Response> {
    logout(store)?;
    json_response(200, &serde_json::json!({ "message": "Logged out successfully" }))
}

pub fn get_session(store: &dyn KeyValue) -> anyhow::Result<Response> {
    let network = Network::open(store);
    respond(200, network.whoami())
}
