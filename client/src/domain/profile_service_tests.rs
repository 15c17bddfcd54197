//! Regression coverage for the profile editor service.

use std::path::PathBuf;

use super::*;
use crate::domain::ports::{
    FixtureAvatarVault, FixtureLocalKeyValueStore, MockAvatarVault, MockLocalKeyValueStore,
    MockProfileStore,
};
use crate::domain::{Age, EmailAddress, ErrorCode, Gender, Identity, UserId};
use mockall::predicate::eq;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn session() -> SessionStore {
    let session = SessionStore::new();
    session.apply(Some(Identity::new(
        UserId::new("u1").expect("id"),
        EmailAddress::new("ada@example.com").expect("email"),
    )));
    session
}

fn service(
    documents: MockProfileStore,
    device: Arc<dyn LocalKeyValueStore>,
    avatars: Arc<dyn AvatarVault>,
    session: &SessionStore,
) -> ProfileService {
    ProfileService::new(
        ProfilePorts {
            documents: Arc::new(documents),
            device,
            avatars,
        },
        session.clone(),
        Duration::from_secs(5),
    )
}

fn form(age: &str) -> ProfileForm {
    ProfileForm {
        full_name: "Lan".to_owned(),
        age: age.to_owned(),
        gender: "female".to_owned(),
    }
}

#[rstest]
#[tokio::test]
async fn missing_document_loads_empty_profile(session: SessionStore) {
    let mut documents = MockProfileStore::new();
    documents
        .expect_get_document()
        .withf(|path| path.to_string() == "users/u1")
        .times(1)
        .returning(|_| Ok(None));

    let profile = service(
        documents,
        Arc::new(FixtureLocalKeyValueStore),
        Arc::new(FixtureAvatarVault),
        &session,
    )
    .load_profile()
    .await
    .expect("empty profile");
    assert_eq!(profile, Profile::default());
}

#[rstest]
#[tokio::test]
async fn age_above_limit_is_rejected_without_a_write(session: SessionStore) {
    let mut documents = MockProfileStore::new();
    documents.expect_set_document().times(0);

    let err = service(
        documents,
        Arc::new(FixtureLocalKeyValueStore),
        Arc::new(FixtureAvatarVault),
        &session,
    )
    .save_profile(&form("200"), None)
    .await
    .expect_err("age rejected");
    assert_eq!(err.code(), ErrorCode::Validation);
}

#[rstest]
#[tokio::test]
async fn save_replaces_the_whole_document(session: SessionStore) {
    let mut documents = MockProfileStore::new();
    documents
        .expect_set_document()
        .withf(|path, value, options| {
            path.to_string() == "users/u1"
                && !options.merge
                && *value
                    == json!({
                        "fullName": "Lan",
                        "age": 150,
                        "gender": "Nữ",
                        "avatarUrl": "/avatars/lan.png"
                    })
        })
        .times(1)
        .returning(|_, _, _| Ok(()));

    let avatar = AvatarUri::new("/avatars/lan.png").ok();
    let profile = service(
        documents,
        Arc::new(FixtureLocalKeyValueStore),
        Arc::new(FixtureAvatarVault),
        &session,
    )
    .save_profile(&form("150"), avatar)
    .await
    .expect("saved");
    assert_eq!(profile.age.map(Age::years), Some(150));
    assert_eq!(profile.gender, Gender::Female);
}

#[rstest]
#[tokio::test]
async fn change_avatar_copies_caches_and_merges(session: SessionStore) {
    let mut avatars = MockAvatarVault::new();
    avatars
        .expect_persist()
        .withf(|picked| picked == PathBuf::from("/tmp/picked.png").as_path())
        .times(1)
        .returning(|_| Ok(AvatarUri::new("/data/avatars/picked.png").expect("uri")));
    let mut device = MockLocalKeyValueStore::new();
    device
        .expect_set()
        .with(eq(AVATAR_URI_KEY), eq("/data/avatars/picked.png"))
        .times(1)
        .returning(|_, _| Ok(()));
    let mut documents = MockProfileStore::new();
    documents
        .expect_set_document()
        .withf(|_, value, options| {
            options.merge && *value == json!({ "avatarUrl": "/data/avatars/picked.png" })
        })
        .times(1)
        .returning(|_, _, _| Ok(()));

    let avatar = service(documents, Arc::new(device), Arc::new(avatars), &session)
        .change_avatar(Path::new("/tmp/picked.png"))
        .await
        .expect("avatar changed");
    assert_eq!(avatar.as_ref(), "/data/avatars/picked.png");
}

#[rstest]
#[tokio::test]
async fn cached_avatar_reads_device_key(session: SessionStore) {
    let mut device = MockLocalKeyValueStore::new();
    device
        .expect_get()
        .with(eq(AVATAR_URI_KEY))
        .times(1)
        .returning(|_| Ok(Some("/data/avatars/me.png".to_owned())));

    let cached = service(
        MockProfileStore::new(),
        Arc::new(device),
        Arc::new(FixtureAvatarVault),
        &session,
    )
    .cached_avatar()
    .await
    .expect("cached");
    assert_eq!(cached.as_ref().map(AsRef::as_ref), Some("/data/avatars/me.png"));
}

#[rstest]
#[tokio::test]
async fn unreachable_document_store_is_a_network_error(session: SessionStore) {
    let mut documents = MockProfileStore::new();
    documents
        .expect_get_document()
        .times(1)
        .returning(|_| Err(ProfileStoreError::unavailable("offline")));

    let err = service(
        documents,
        Arc::new(FixtureLocalKeyValueStore),
        Arc::new(FixtureAvatarVault),
        &session,
    )
    .load_profile()
    .await
    .expect_err("offline");
    assert_eq!(err.code(), ErrorCode::NetworkError);
}
