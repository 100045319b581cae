use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_AVATAR;

fn default_avatar() -> String {
    DEFAULT_AVATAR.to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct User {
    pub username: String,
    /// Argon2 hash for accounts created here; older records may hold plaintext.
    /// Empty for auto-vivified profiles, which can never log in.
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub display: String,
    #[serde(default = "default_avatar")]
    pub avatar: String,
    #[serde(default)]
    pub following: BTreeSet<String>,
    #[serde(default)]
    pub followers: BTreeSet<String>,
}

impl User {
    /// Record materialized for a username nobody signed up with.
    pub fn placeholder(username: &str) -> Self {
        Self {
            username: username.to_string(),
            password: String::new(),
            display: username.to_string(),
            avatar: default_avatar(),
            following: BTreeSet::new(),
            followers: BTreeSet::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        if self.display.is_empty() {
            &self.username
        } else {
            &self.display
        }
    }
}

/// What leaves the process about a user: never the password.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserView {
    pub username: String,
    pub display: String,
    pub avatar: String,
    pub following: Vec<String>,
    pub followers: Vec<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            display: user.display_name().to_string(),
            avatar: user.avatar.clone(),
            following: user.following.iter().cloned().collect(),
            followers: user.followers.iter().cloned().collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub user: String,
    #[serde(default)]
    pub display: String,
    /// Snapshot of the author's avatar, back-filled on avatar change.
    #[serde(default = "default_avatar")]
    pub avatar: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub liked_by: BTreeSet<String>,
    #[serde(default)]
    pub likes: usize,
    /// Creation time, milliseconds since the Unix epoch.
    pub ts: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Profile {
    pub user: UserView,
    pub posts: Vec<Post>,
    /// Whether the session user follows this profile.
    pub following: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_records_load_with_defaults() {
        let user: User = serde_json::from_str(r#"{"username":"carol","password":"pw","display":"Carol"}"#).unwrap();
        assert_eq!(user.avatar, DEFAULT_AVATAR);
        assert!(user.following.is_empty());
        assert!(user.followers.is_empty());

        let post: Post = serde_json::from_str(
            r#"{"id":"p_abc1234","user":"bob","display":"Bob","avatar":"a.png","text":"hi","likes":1,"ts":5}"#,
        )
        .unwrap();
        assert!(post.liked_by.is_empty());
        assert_eq!(post.image, None);
    }

    #[test]
    fn post_serializes_liked_by_in_camel_case() {
        let mut post: Post = serde_json::from_str(r#"{"id":"1","user":"a","ts":0}"#).unwrap();
        post.liked_by.insert("bob".to_string());
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["likedBy"], serde_json::json!(["bob"]));
    }

    #[test]
    fn user_view_omits_password() {
        let mut user = User::placeholder("dave");
        user.password = "secret".to_string();
        let json = serde_json::to_string(&UserView::from(&user)).unwrap();
        assert!(!json.contains("secret"));
    }
}
