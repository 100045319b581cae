pub mod auth;
pub mod config;
pub mod core;
pub mod filter;
pub mod follow;
pub mod images;
pub mod models;
pub mod network;
pub mod posts;
pub mod users;

use spin_sdk::http::{Request, Response};

use crate::core::helpers::json_response;
use crate::core::query_params::decode;
use crate::core::storage::KeyValue;

/// Split `/posts/{id}` or `/posts/{id}/like` into the decoded id and whether
/// it is the like path. Any other shape under `/posts/` yields `None`.
fn post_path(path: &str) -> Option<(String, bool)> {
    let rest = path.strip_prefix("/posts/")?;
    let (id, like) = match rest.strip_suffix("/like") {
        Some(id) => (id, true),
        None => (rest, false),
    };
    if id.is_empty() || id.contains('/') {
        return None;
    }
    Some((decode(id), like))
}

/// Dispatch one request against `store`.
pub fn route(store: &dyn KeyValue, req: &Request) -> anyhow::Result<Response> {
    let path = req.path().to_string();
    let method = req.method().to_string();

    if let Some((id, like)) = post_path(&path) {
        return match (method.as_str(), like) {
            ("POST", true) => posts::like_post(store, &id),
            ("PUT", false) => posts::edit_post(store, req, &id),
            ("DELETE", false) => posts::delete_post(store, &id),
            _ => not_found(),
        };
    }

    match (method.as_str(), path.as_str()) {
        ("POST", "/signup") => users::create_user(store, req),
        ("POST", "/login") => auth::login_user(store, req),
        ("POST", "/logout") => auth::logout_user(store),
        ("GET", "/session") => auth::get_session(store),
        ("GET", "/posts") => posts::list_posts(store, req),
        ("POST", "/posts") => posts::create_post(store, req),
        ("GET", p) if p.starts_with("/users/") => users::get_profile(store, &decode(&p["/users/".len()..])),
        ("PUT", "/profile/avatar") => users::update_avatar(store, req),
        ("POST", "/follow") => follow::handle_follow(store, req),
        ("POST", "/unfollow") => follow::handle_unfollow(store, req),
        ("GET", "/following") => follow::get_followings_list(store),
        _ => not_found(),
    }
}

fn not_found() -> anyhow::Result<Response> {
    json_response(404, &serde_json::json!({ "error": "No route found" }))
}

// === Component entrypoint ===
#[cfg(target_arch = "wasm32")]
#[spin_sdk::http_component]
fn handle(req: Request) -> anyhow::Result<impl spin_sdk::http::IntoResponse> {
    let store = crate::core::storage::SpinStore::open_default()?;
    crate::core::db::init_seed_data(&store)?;
    route(&store, &req)
}
