//! Use cases over the user and post collections.
//!
//! A `Network` loads both collections from a key-value store, applies one
//! operation in memory and writes back whichever collections changed. Every
//! operation acting for someone takes that someone as an explicit `Session`.

use crate::auth::{self, Session};
use crate::core::errors::SocialError;
use crate::core::storage::KeyValue;
use crate::filter::contains_blocked_keyword;
use crate::follow::{follow_user, get_followings, is_following, unfollow_user};
use crate::images::{validate_avatar, ImageUpload};
use crate::models::models::{Post, Profile, User, UserView};
use crate::posts::PostStore;
use crate::users::UserStore;

pub struct Network<'a> {
    store: &'a dyn KeyValue,
    users: UserStore,
    posts: PostStore,
}

impl<'a> Network<'a> {
    pub fn open(store: &'a dyn KeyValue) -> Self {
        Self {
            store,
            users: UserStore::load(store),
            posts: PostStore::load(store),
        }
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn posts(&self) -> &PostStore {
        &self.posts
    }

    fn commit(&mut self) -> Result<(), SocialError> {
        self.users.commit(self.store)?;
        self.posts.commit(self.store)?;
        Ok(())
    }

    // === Session ===

    pub fn session(&self) -> Option<Session> {
        auth::current(self.store)
    }

    pub fn require_session(&self) -> Result<Session, SocialError> {
        auth::require(self.store)
    }

    /// Create an account and sign straight into it.
    pub fn signup(&mut self, username: &str, password: &str, display: Option<&str>) -> Result<UserView, SocialError> {
        let view = UserView::from(self.users.create(username, password, display)?);
        self.commit()?;
        auth::login(self.store, &view.username)?;
        Ok(view)
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Session, SocialError> {
        if !self.users.verify_credentials(username, password) {
            tracing::info!(username, "login rejected");
            return Err(SocialError::InvalidCredentials);
        }
        Ok(auth::login(self.store, username)?)
    }

    pub fn logout(&self) -> Result<(), SocialError> {
        Ok(auth::logout(self.store)?)
    }

    /// The signed-in user's record, or a default one if it was never stored.
    pub fn whoami(&self) -> Result<UserView, SocialError> {
        let session = self.require_session()?;
        Ok(self.whoami_for(&session))
    }

    // === Posts ===

    pub fn compose(&mut self, session: &Session, text: &str, image: Option<ImageUpload>) -> Result<Post, SocialError> {
        if text.trim().is_empty() && image.is_none() {
            return Err(SocialError::validation("Write something or attach an image"));
        }
        if contains_blocked_keyword(text) {
            tracing::info!(user = session.username(), "post rejected by content filter");
            return Err(SocialError::ContentRejected);
        }
        let image = image.map(ImageUpload::into_post_image).transpose()?;

        let author = self
            .users
            .get(session.username())
            .cloned()
            .unwrap_or_else(|| User::placeholder(session.username()));
        let post = self
            .posts
            .create(&author, text, image)
            .cloned()
            .ok_or_else(|| SocialError::validation("Write something or attach an image"))?;
        self.commit()?;
        Ok(post)
    }

    pub fn edit_post(&mut self, session: &Session, id: &str, text: &str) -> Result<Post, SocialError> {
        let post = self.posts.edit(id, session, text)?.clone();
        self.commit()?;
        Ok(post)
    }

    pub fn delete_post(&mut self, session: &Session, id: &str) -> Result<(), SocialError> {
        self.posts.delete(id, session)?;
        self.commit()
    }

    pub fn toggle_like(&mut self, session: &Session, id: &str) -> Result<Post, SocialError> {
        let post = self.posts.toggle_like(id, session.username())?.clone();
        self.commit()?;
        Ok(post)
    }

    /// Posts newest first, optionally limited to one author.
    pub fn feed(&self, author: Option<&str>) -> Vec<Post> {
        match author {
            Some(author) => self.posts.list_by_user(author).cloned().collect(),
            None => self.posts.list_all().cloned().collect(),
        }
    }

    // === Profiles ===

    /// Set the session user's avatar and back-fill it onto their existing posts.
    pub fn change_avatar(&mut self, session: &Session, image: &str) -> Result<UserView, SocialError> {
        validate_avatar(image)?;
        let image = image.trim();
        self.users.set_avatar(session.username(), image);
        let updated = self.posts.propagate_avatar(session.username(), image);
        self.commit()?;
        tracing::info!(user = session.username(), posts = updated, "avatar changed");
        Ok(self.whoami_for(session))
    }

    /// Profile page data for `username`, materializing the record if needed.
    pub fn profile(&mut self, session: &Session, username: &str) -> Result<Profile, SocialError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(SocialError::validation("Username required"));
        }
        let newly_seen = !self.users.contains(username);
        let user = UserView::from(self.users.profile(username));
        if newly_seen {
            self.commit()?;
        }
        Ok(Profile {
            user,
            posts: self.feed(Some(username)),
            following: is_following(&self.users, session.username(), username),
        })
    }

    pub fn follow(&mut self, session: &Session, username: &str) -> Result<(), SocialError> {
        if username.is_empty() {
            return Err(SocialError::validation("Invalid target user"));
        }
        follow_user(&mut self.users, session.username(), username)?;
        self.commit()
    }

    pub fn unfollow(&mut self, session: &Session, username: &str) -> Result<(), SocialError> {
        if username.is_empty() {
            return Err(SocialError::validation("Invalid target user"));
        }
        unfollow_user(&mut self.users, session.username(), username);
        self.commit()
    }

    /// Everyone the session user follows.
    pub fn following(&self, session: &Session) -> Vec<UserView> {
        get_followings(&self.users, session.username())
            .into_iter()
            .map(UserView::from)
            .collect()
    }

    fn whoami_for(&self, session: &Session) -> UserView {
        self.users
            .get(session.username())
            .map(UserView::from)
            .unwrap_or_else(|| UserView::from(&User::placeholder(session.username())))
    }
}
