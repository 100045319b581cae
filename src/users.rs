use std::collections::BTreeMap;

use serde::Deserialize;
use spin_sdk::http::{Request, Response};

use crate::config::USERS_KEY;
use crate::core::errors::SocialError;
use crate::core::helpers::{hash_password, parse_body, respond, sanitize_text, verify_password};
use crate::core::storage::{read_json, write_json, KeyValue};
use crate::models::models::User;
use crate::network::Network;

/// All user records, keyed by username.
#[derive(Default)]
pub struct UserStore {
    users: BTreeMap<String, User>,
    dirty: bool,
}

impl UserStore {
    pub fn load(store: &dyn KeyValue) -> Self {
        let mut users: BTreeMap<String, User> = read_json(store, USERS_KEY, BTreeMap::new());
        // The map key is authoritative
        for (username, user) in users.iter_mut() {
            if user.username != *username {
                user.username = username.clone();
            }
        }
        Self { users, dirty: false }
    }

    /// Write the collection back if anything changed since load.
    pub fn commit(&mut self, store: &dyn KeyValue) -> anyhow::Result<()> {
        if self.dirty {
            write_json(store, USERS_KEY, &self.users)?;
            self.dirty = false;
        }
        Ok(())
    }

    pub fn get(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn create(&mut self, username: &str, password: &str, display: Option<&str>) -> Result<&User, SocialError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(SocialError::validation("Username and password are required"));
        }
        if self.users.contains_key(username) {
            return Err(SocialError::DuplicateUsername);
        }

        let display = display
            .map(sanitize_text)
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| username.to_string());

        let mut user = User::placeholder(username);
        user.password = hash_password(password)?;
        user.display = display;

        tracing::info!(username, "user created");
        self.dirty = true;
        Ok(&*self.users.entry(username.to_string()).or_insert(user))
    }

    pub fn verify_credentials(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .map(|u| verify_password(password, &u.password))
            .unwrap_or(false)
    }

    pub fn set_avatar(&mut self, username: &str, image: &str) {
        self.entry(username).avatar = image.to_string();
    }

    /// The record for `username`, materialized with defaults when nobody
    /// has signed up under that name.
    pub fn profile(&mut self, username: &str) -> &User {
        self.entry(username)
    }

    pub(crate) fn entry(&mut self, username: &str) -> &mut User {
        self.dirty = true;
        self.users
            .entry(username.to_string())
            .or_insert_with(|| User::placeholder(username))
    }

    pub(crate) fn get_mut(&mut self, username: &str) -> Option<&mut User> {
        let user = self.users.get_mut(username);
        if user.is_some() {
            self.dirty = true;
        }
        user
    }
}

// === HTTP Handlers ===

#[derive(Deserialize)]
struct Signup {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    display: Option<String>,
}

#[derive(Deserialize)]
struct AvatarChange {
    image: String,
}

pub fn create_user(store: &dyn KeyValue, req: &Request) -> anyhow::Result<Response> {
    let body: Signup = match parse_body(req) {
        Ok(b) => b,
        Err(e) => return Ok(e.into()),
    };
    let mut network = Network::open(store);
    let result = network.signup(&body.username, &body.password, body.display.as_deref());
    respond(201, result)
}

pub fn get_profile(store: &dyn KeyValue, username: &str) -> anyhow::Result<Response> {
    let mut network = Network::open(store);
    let result = network
        .require_session()
        .and_then(|session| network.profile(&session, username));
    respond(200, result)
}

pub fn update_avatar(store: &dyn KeyValue, req: &Request) -> anyhow::Result<Response> {
    let mut network = Network::open(store);
    let session = match network.require_session() {
        Ok(s) => s,
        Err(e) => return Ok(e.into()),
    };
    let result = parse_body::<AvatarChange>(req).and_then(|body| network.change_avatar(&session, &body.image));
    respond(200, result)
}
