use serde::Deserialize;
use spin_sdk::http::{Request, Response};

use crate::core::errors::SocialError;
use crate::core::helpers::{parse_body, respond};
use crate::core::storage::KeyValue;
use crate::models::models::User;
use crate::network::Network;
use crate::users::UserStore;

/// Record `follower -> followee` on both records. The followee must already
/// have a record; a missing follower record is materialized. Repeating a
/// follow rewrites both sides again.
pub fn follow_user(users: &mut UserStore, follower: &str, followee: &str) -> Result<(), SocialError> {
    if follower == followee {
        return Err(SocialError::validation("You cannot follow yourself"));
    }
    if !users.contains(followee) {
        return Err(SocialError::NotFound);
    }
    users.entry(follower).following.insert(followee.to_string());
    users.entry(followee).followers.insert(follower.to_string());
    tracing::info!(follower, followee, "followed");
    Ok(())
}

/// Remove the edge from both records. A no-op when there is no edge.
pub fn unfollow_user(users: &mut UserStore, follower: &str, followee: &str) {
    if let Some(user) = users.get_mut(follower) {
        user.following.remove(followee);
    }
    if let Some(user) = users.get_mut(followee) {
        user.followers.remove(follower);
    }
    tracing::info!(follower, followee, "unfollowed");
}

pub fn is_following(users: &UserStore, follower: &str, followee: &str) -> bool {
    users
        .get(follower)
        .map(|u| u.following.contains(followee))
        .unwrap_or(false)
}

/// Records of everyone `username` follows. Names without a record are skipped.
pub fn get_followings<'a>(users: &'a UserStore, username: &str) -> Vec<&'a User> {
    users
        .get(username)
        .map(|u| u.following.iter().filter_map(|f| users.get(f)).collect())
        .unwrap_or_default()
}

// === HTTP Handlers ===

#[derive(Deserialize)]
struct Target {
    #[serde(default)]
    username: String,
}

pub fn handle_follow(store: &dyn KeyValue, req: &Request) -> anyhow::Result<Response> {
    let mut network = Network::open(store);
    let session = match network.require_session() {
        Ok(s) => s,
        Err(e) => return Ok(e.into()),
    };
    let result = parse_body::<Target>(req)
        .and_then(|target| network.follow(&session, target.username.trim()))
        .map(|()| serde_json::json!({ "status": "followed" }));
    respond(200, result)
}

pub fn handle_unfollow(store: &dyn KeyValue, req: &Request) -> anyhow::Result<Response> {
    let mut network = Network::open(store);
    let session = match network.require_session() {
        Ok(s) => s,
        Err(e) => return Ok(e.into()),
    };
    let result = parse_body::<Target>(req)
        .and_then(|target| network.unfollow(&session, target.username.trim()))
        .map(|()| serde_json::json!({ "status": "unfollowed" }));
    respond(200, result)
}

pub fn get_followings_list(store: &dyn KeyValue) -> anyhow::Result<Response> {
    let network = Network::open(store);
    let result = network
        .require_session()
        .map(|session| network.following(&session));
    respond(200, result)
}
