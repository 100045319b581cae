use std::collections::HashMap;

use serde::Deserialize;
use spin_sdk::http::{Request, Response};
use uuid::Uuid;

use crate::auth::Session;
use crate::config::POSTS_KEY;
use crate::core::errors::SocialError;
use crate::core::helpers::{now_millis, parse_body, respond};
use crate::core::query_params::{get_string, parse_query_params};
use crate::core::storage::{read_json, write_json, KeyValue};
use crate::images::ImageUpload;
use crate::models::models::{Post, User};
use crate::network::Network;

/// Every post, indexed by id. Persisted as one array under `posts`.
#[derive(Default)]
pub struct PostStore {
    posts: HashMap<String, Post>,
    dirty: bool,
}

impl PostStore {
    pub fn load(store: &dyn KeyValue) -> Self {
        let stored: Vec<Post> = read_json(store, POSTS_KEY, Vec::new());
        let mut posts = HashMap::with_capacity(stored.len());
        for mut post in stored {
            post.likes = post.liked_by.len();
            if posts.contains_key(&post.id) {
                tracing::warn!(id = %post.id, "dropping post with duplicate id");
                continue;
            }
            posts.insert(post.id.clone(), post);
        }
        Self { posts, dirty: false }
    }

    pub fn commit(&mut self, store: &dyn KeyValue) -> anyhow::Result<()> {
        if self.dirty {
            write_json(store, POSTS_KEY, &self.list_all().collect::<Vec<_>>())?;
            self.dirty = false;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Post> {
        self.posts.get(id)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Create a post by `author`, snapshotting their display name and avatar.
    /// Returns `None` without storing anything when there is neither text nor image.
    pub fn create(&mut self, author: &User, text: &str, image: Option<String>) -> Option<&Post> {
        let text = text.trim();
        if text.is_empty() && image.is_none() {
            return None;
        }

        let post = Post {
            id: Uuid::new_v4().to_string(),
            user: author.username.clone(),
            display: author.display_name().to_string(),
            avatar: author.avatar.clone(),
            text: text.to_string(),
            image,
            liked_by: Default::default(),
            likes: 0,
            ts: self.next_timestamp(),
        };

        tracing::info!(id = %post.id, user = %post.user, "post created");
        self.dirty = true;
        let id = post.id.clone();
        Some(&*self.posts.entry(id).or_insert(post))
    }

    pub fn edit(&mut self, id: &str, actor: &Session, text: &str) -> Result<&Post, SocialError> {
        let post = self.posts.get_mut(id).ok_or(SocialError::NotFound)?;
        if !actor.is(&post.user) {
            return Err(SocialError::Forbidden);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(SocialError::validation("Post text cannot be empty"));
        }

        if post.text != text {
            post.text = text.to_string();
            self.dirty = true;
            tracing::info!(id, "post edited");
        }
        Ok(&*post)
    }

    pub fn delete(&mut self, id: &str, actor: &Session) -> Result<Post, SocialError> {
        let post = self.posts.get(id).ok_or(SocialError::NotFound)?;
        if !actor.is(&post.user) {
            return Err(SocialError::Forbidden);
        }
        self.dirty = true;
        tracing::info!(id, "post deleted");
        self.posts.remove(id).ok_or(SocialError::NotFound)
    }

    /// Add or remove `username` from the post's likers.
    pub fn toggle_like(&mut self, id: &str, username: &str) -> Result<&Post, SocialError> {
        let post = self.posts.get_mut(id).ok_or(SocialError::NotFound)?;
        if !post.liked_by.remove(username) {
            post.liked_by.insert(username.to_string());
        }
        post.likes = post.liked_by.len();
        self.dirty = true;
        Ok(&*post)
    }

    /// Posts by `username`, newest first.
    pub fn list_by_user<'a>(&'a self, username: &'a str) -> impl Iterator<Item = &'a Post> + 'a {
        self.list_all().filter(move |p| p.user == username)
    }

    /// All posts, newest first.
    pub fn list_all(&self) -> impl Iterator<Item = &Post> {
        let mut posts: Vec<&Post> = self.posts.values().collect();
        posts.sort_by(|a, b| b.ts.cmp(&a.ts).then_with(|| a.id.cmp(&b.id)));
        posts.into_iter()
    }

    /// Rewrite the avatar snapshot on every post by `username`.
    pub fn propagate_avatar(&mut self, username: &str, avatar: &str) -> usize {
        let mut updated = 0;
        for post in self.posts.values_mut().filter(|p| p.user == username) {
            post.avatar = avatar.to_string();
            updated += 1;
        }
        if updated > 0 {
            self.dirty = true;
        }
        updated
    }

    // Strictly increasing so posts made within one millisecond keep their order
    fn next_timestamp(&self) -> i64 {
        let now = now_millis();
        match self.posts.values().map(|p| p.ts).max() {
            Some(latest) if latest >= now => latest + 1,
            _ => now,
        }
    }
}

// === HTTP Handlers ===

#[derive(Deserialize)]
struct Compose {
    #[serde(default)]
    text: String,
    image: Option<ImageUpload>,
}

#[derive(Deserialize)]
struct Edit {
    #[serde(default)]
    text: String,
}

pub fn create_post(store: &dyn KeyValue, req: &Request) -> anyhow::Result<Response> {
    let mut network = Network::open(store);
    let session = match network.require_session() {
        Ok(s) => s,
        Err(e) => return Ok(e.into()),
    };
    let result = parse_body::<Compose>(req).and_then(|body| network.compose(&session, &body.text, body.image));
    respond(201, result)
}

pub fn list_posts(store: &dyn KeyValue, req: &Request) -> anyhow::Result<Response> {
    let network = Network::open(store);
    if let Err(e) = network.require_session() {
        return Ok(e.into());
    }
    let params = parse_query_params(req.uri());
    let author = get_string(&params, "user");
    respond(200, Ok(network.feed(author.as_deref())))
}

pub fn edit_post(store: &dyn KeyValue, req: &Request, post_id: &str) -> anyhow::Result<Response> {
    let mut network = Network::open(store);
    let session = match network.require_session() {
        Ok(s) => s,
        Err(e) => return Ok(e.into()),
    };
    let result = parse_body::<Edit>(req).and_then(|body| network.edit_post(&session, post_id, &body.text));
    respond(200, result)
}

pub fn delete_post(store: &dyn KeyValue, post_id: &str) -> anyhow::Result<Response> {
    let mut network = Network::open(store);
    let result = network
        .require_session()
        .and_then(|session| network.delete_post(&session, post_id));
    match result {
        Ok(()) => Ok(Response::builder().status(204).build()),
        Err(e) => Ok(e.into()),
    }
}

pub fn like_post(store: &dyn KeyValue, post_id: &str) -> anyhow::Result<Response> {
    let mut network = Network::open(store);
    let result = network
        .require_session()
        .and_then(|session| network.toggle_like(&session, post_id));
    respond(200, result)
}
