use crate::config::{DEFAULT_AVATAR, POSTS_KEY, USERS_KEY};
use crate::core::helpers::now_millis;
use crate::core::storage::{write_json, KeyValue};
use crate::follow::follow_user;
use crate::models::models::Post;
use crate::users::UserStore;
use uuid::Uuid;

fn seed_post(user: &str, display: &str, text: &str, age_ms: i64) -> Post {
    Post {
        id: Uuid::new_v4().to_string(),
        user: user.to_string(),
        display: display.to_string(),
        avatar: DEFAULT_AVATAR.to_string(),
        text: text.to_string(),
        image: None,
        liked_by: Default::default(),
        likes: 0,
        ts: now_millis() - age_ms,
    }
}

/// Populate demo users and posts the first time a store is used.
/// Each collection is seeded only while its key has never been written.
pub fn init_seed_data(store: &dyn KeyValue) -> anyhow::Result<()> {
    if store.get(POSTS_KEY)?.is_none() {
        let posts = vec![
            seed_post("alice", "Alice L", "Welcome to the feed! Everything here lives in local storage.", 3_600_000),
            seed_post("bob", "Bob", "Keep it clean in here or get reduced to atoms 😉", 1_800_000),
        ];
        write_json(store, POSTS_KEY, &posts)?;
        tracing::info!(count = posts.len(), "seeded posts");
    }

    if store.get(USERS_KEY)?.is_none() {
        let mut users = UserStore::default();
        users.create("alice", "password", Some("Alice L"))?;
        users.create("bob", "password", Some("Bob"))?;
        follow_user(&mut users, "alice", "bob")?;
        users.commit(store)?;
        tracing::info!("seeded users");
    }

    Ok(())
}
