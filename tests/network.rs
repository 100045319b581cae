use hearth::core::errors::SocialError;
use hearth::core::storage::{FileStore, KeyValue};
use hearth::follow::{follow_user, unfollow_user};
use hearth::network::Network;
use tempfile::TempDir;

fn file_store() -> (TempDir, FileStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::open(dir.path()).expect("open store");
    (dir, store)
}

fn snapshot(network: &Network) -> Vec<(String, Vec<String>, Vec<String>)> {
    network
        .users()
        .iter()
        .map(|u| {
            (
                u.username.clone(),
                u.following.iter().cloned().collect(),
                u.followers.iter().cloned().collect(),
            )
        })
        .collect()
}

#[test]
fn signup_then_login_with_same_credentials() {
    let (_dir, store) = file_store();
    let pairs = [("alice", "pw1"), ("bob", "hunter2"), ("carol", "  spaced  ")];

    for (username, password) in pairs {
        let mut network = Network::open(&store);
        network.signup(username, password, None).unwrap();
        network.logout().unwrap();

        let network = Network::open(&store);
        let session = network.login(username, password).unwrap();
        assert_eq!(session.username(), username);
    }
}

#[test]
fn signup_collision_is_reported() {
    let (_dir, store) = file_store();
    Network::open(&store).signup("alice", "pw1", None).unwrap();
    let result = Network::open(&store).signup("alice", "pw2", None);
    assert!(matches!(result, Err(SocialError::DuplicateUsername)));
    assert!(Network::open(&store).login("alice", "pw1").is_ok());
}

#[test]
fn post_like_delete_scenario() {
    let (_dir, store) = file_store();
    let mut network = Network::open(&store);
    network.signup("alice", "pw1", None).unwrap();
    network.logout().unwrap();

    let network = Network::open(&store);
    let alice = network.login("alice", "pw1").unwrap();

    let mut network = Network::open(&store);
    let post = network.compose(&alice, "hello world", None).unwrap();

    let feed = Network::open(&store).feed(None);
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].text, "hello world");
    assert_eq!(feed[0].likes, 0);

    let liked = Network::open(&store).toggle_like(&alice, &post.id).unwrap();
    assert_eq!(liked.likes, 1);
    assert_eq!(Network::open(&store).feed(None)[0].likes, 1);

    Network::open(&store).delete_post(&alice, &post.id).unwrap();
    assert!(Network::open(&store).feed(None).is_empty());
}

#[test]
fn filtered_post_never_reaches_the_feed() {
    let (_dir, store) = file_store();
    let mut network = Network::open(&store);
    network.signup("alice", "pw1", None).unwrap();
    let alice = network.require_session().unwrap();

    let result = network.compose(&alice, "total gyatt moment", None);
    assert!(matches!(result, Err(SocialError::ContentRejected)));
    assert!(Network::open(&store).feed(None).is_empty());
}

#[test]
fn like_count_tracks_likers() {
    let (_dir, store) = file_store();
    let mut network = Network::open(&store);
    network.signup("alice", "pw", None).unwrap();
    let alice = network.require_session().unwrap();
    let id = network.compose(&alice, "count me", None).unwrap().id;
    network.signup("bob", "pw", None).unwrap();
    let bob = network.require_session().unwrap();

    let mut network = Network::open(&store);
    for session in [&alice, &bob, &alice, &bob, &bob] {
        let post = network.toggle_like(session, &id).unwrap();
        assert_eq!(post.likes, post.liked_by.len());
    }
    let post = &Network::open(&store).feed(None)[0];
    assert_eq!(post.liked_by.iter().collect::<Vec<_>>(), vec!["bob"]);
}

#[test]
fn non_owner_cannot_edit_or_delete() {
    let (_dir, store) = file_store();
    let mut network = Network::open(&store);
    network.signup("alice", "pw", None).unwrap();
    let alice = network.require_session().unwrap();
    let id = network.compose(&alice, "mine", None).unwrap().id;
    network.signup("bob", "pw", None).unwrap();
    let bob = network.require_session().unwrap();

    let mut network = Network::open(&store);
    assert!(matches!(network.edit_post(&bob, &id, "theirs"), Err(SocialError::Forbidden)));
    assert!(matches!(network.delete_post(&bob, &id), Err(SocialError::Forbidden)));
    assert!(matches!(network.edit_post(&bob, "nope", "x"), Err(SocialError::NotFound)));

    let feed = Network::open(&store).feed(None);
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].text, "mine");

    let edited = Network::open(&store).edit_post(&alice, &id, "still mine").unwrap();
    assert_eq!(edited.text, "still mine");
}

#[test]
fn follow_unfollow_round_trip_persists() {
    let (_dir, store) = file_store();
    let mut network = Network::open(&store);
    network.signup("bob", "pw", None).unwrap();
    network.signup("alice", "pw", None).unwrap();
    let alice = network.require_session().unwrap();
    let before = snapshot(&Network::open(&store));

    Network::open(&store).follow(&alice, "bob").unwrap();
    let network = Network::open(&store);
    assert!(network.users().get("alice").unwrap().following.contains("bob"));
    assert!(network.users().get("bob").unwrap().followers.contains("alice"));

    Network::open(&store).unfollow(&alice, "bob").unwrap();
    assert_eq!(snapshot(&Network::open(&store)), before);
}

#[test]
fn graph_functions_keep_edges_symmetric() {
    let (_dir, store) = file_store();
    let mut network = Network::open(&store);
    for name in ["a", "b", "c"] {
        network.signup(name, "pw", None).unwrap();
    }
    let mut users = hearth::users::UserStore::load(&store);
    follow_user(&mut users, "a", "b").unwrap();
    follow_user(&mut users, "c", "b").unwrap();
    follow_user(&mut users, "b", "a").unwrap();
    unfollow_user(&mut users, "c", "b");

    for user in users.iter() {
        for followee in &user.following {
            assert!(users.get(followee).unwrap().followers.contains(&user.username));
        }
        for follower in &user.followers {
            assert!(users.get(follower).unwrap().following.contains(&user.username));
        }
    }
}

#[test]
fn avatar_propagates_to_own_posts_only() {
    let (_dir, store) = file_store();
    let mut network = Network::open(&store);
    network.signup("bob", "pw", None).unwrap();
    let bob = network.require_session().unwrap();
    network.compose(&bob, "bob one", None).unwrap();
    network.signup("alice", "pw", None).unwrap();
    let alice = network.require_session().unwrap();
    network.compose(&alice, "alice one", None).unwrap();
    network.compose(&alice, "alice two", None).unwrap();

    let bob_avatar_before = Network::open(&store).feed(Some("bob"))[0].avatar.clone();
    Network::open(&store).change_avatar(&alice, "data:image/gif;base64,R0lG").unwrap();

    let network = Network::open(&store);
    assert!(network.feed(Some("alice")).iter().all(|p| p.avatar == "data:image/gif;base64,R0lG"));
    assert_eq!(network.feed(Some("bob"))[0].avatar, bob_avatar_before);
    assert_eq!(network.users().get("alice").unwrap().avatar, "data:image/gif;base64,R0lG");
}

#[test]
fn corrupt_documents_degrade_to_empty() {
    let (_dir, store) = file_store();
    store.set("users", "{oops").unwrap();
    store.set("posts", "not an array").unwrap();

    let mut network = Network::open(&store);
    assert!(network.feed(None).is_empty());
    assert_eq!(network.users().iter().count(), 0);

    // The next write replaces the broken document
    network.signup("alice", "pw", None).unwrap();
    assert!(Network::open(&store).login("alice", "pw").is_ok());
}

#[test]
fn operations_require_a_session() {
    let (_dir, store) = file_store();
    let network = Network::open(&store);
    assert!(matches!(network.require_session(), Err(SocialError::Unauthorized)));
    assert!(network.session().is_none());
}
