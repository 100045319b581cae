use std::path::PathBuf;

// === Persisted keys ===
pub const USERS_KEY: &str = "users";
pub const POSTS_KEY: &str = "posts";
pub const CURRENT_USER_KEY: &str = "currentUser";

pub const DEFAULT_AVATAR: &str = "../assets/img/defaultpfp.png";

pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

pub fn data_dir() -> PathBuf {
    std::env::var("HEARTH_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("store"))
}

pub fn bind_address() -> String {
    std::env::var("HEARTH_BIND").unwrap_or_else(|_| "0.0.0.0:80".to_string())
}

/// Upper bound on the decoded size of an image attached to a post.
pub fn max_post_image_bytes() -> usize {
    let megabytes = std::env::var("HEARTH_MAX_IMAGE_MB")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(5);
    megabytes * 1024 * 1024
}
