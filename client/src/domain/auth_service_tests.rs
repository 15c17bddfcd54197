//! Regression coverage for the authentication service.

use super::*;
use crate::domain::ports::MockIdentityProvider;
use crate::domain::{EmailAddress, ErrorCode, FieldErrorKind, SessionState, UserId};
use rstest::{fixture, rstest};

fn identity(email: &str) -> Identity {
    Identity::new(
        UserId::new("u-new").expect("id"),
        EmailAddress::new(email).expect("email"),
    )
}

#[fixture]
fn session() -> SessionStore {
    let session = SessionStore::new();
    session.apply(None);
    session
}

fn service(provider: MockIdentityProvider, session: &SessionStore) -> AuthService<MockIdentityProvider> {
    AuthService::new(Arc::new(provider), session.clone(), Duration::from_secs(5))
}

#[rstest]
#[tokio::test]
async fn sign_up_signs_in_new_account(session: SessionStore) {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_up()
        .withf(|email, password| email.as_ref() == "new@test.com" && password == "abc123")
        .times(1)
        .returning(|email, _| Ok(Identity::new(UserId::new("u-new").expect("id"), email.clone())));

    let auth = service(provider, &session);
    let identity = auth
        .sign_up(&SignUpForm::new("new@test.com", "abc123", "abc123"))
        .await
        .expect("sign up succeeds");

    assert_eq!(identity.email().as_ref(), "new@test.com");
    assert_eq!(session.snapshot(), SessionState::SignedIn(identity));
}

#[rstest]
#[tokio::test]
async fn mismatched_confirmation_never_reaches_provider(session: SessionStore) {
    let mut provider = MockIdentityProvider::new();
    provider.expect_sign_up().times(0);

    let auth = service(provider, &session);
    let err = auth
        .sign_up(&SignUpForm::new("a@test.com", "abc123", "xyz987"))
        .await
        .expect_err("validation fails");

    assert_eq!(err.code(), ErrorCode::Validation);
    let fields = err.field_errors().expect("field errors");
    assert!(matches!(
        fields.for_field("confirmPassword").map(|e| e.kind()),
        Some(FieldErrorKind::Mismatch { .. })
    ));
    assert_eq!(session.snapshot(), SessionState::SignedOut);
}

#[rstest]
#[case(IdentityProviderError::email_in_use("new@test.com"), ErrorCode::EmailInUse)]
#[case(IdentityProviderError::weak_password("too simple"), ErrorCode::WeakPassword)]
#[case(IdentityProviderError::invalid_email("bad domain"), ErrorCode::InvalidEmail)]
#[case(IdentityProviderError::unavailable("offline"), ErrorCode::NetworkError)]
#[tokio::test]
async fn sign_up_maps_provider_failures(
    session: SessionStore,
    #[case] failure: IdentityProviderError,
    #[case] expected: ErrorCode,
) {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_up()
        .times(1)
        .returning(move |_, _| Err(failure.clone()));

    let auth = service(provider, &session);
    let err = auth
        .sign_up(&SignUpForm::new("new@test.com", "abc123", "abc123"))
        .await
        .expect_err("provider failure");

    assert_eq!(err.code(), expected);
    assert_eq!(session.snapshot(), SessionState::SignedOut);
}

#[rstest]
#[case(IdentityProviderError::invalid_credential("ada@example.com"), ErrorCode::InvalidCredential)]
#[case(IdentityProviderError::user_not_found("ada@example.com"), ErrorCode::UserNotFound)]
#[tokio::test]
async fn sign_in_maps_provider_failures(
    session: SessionStore,
    #[case] failure: IdentityProviderError,
    #[case] expected: ErrorCode,
) {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_in()
        .times(1)
        .returning(move |_, _| Err(failure.clone()));

    let auth = service(provider, &session);
    let err = auth
        .sign_in(&SignInForm::new("ada@example.com", "secret"))
        .await
        .expect_err("provider failure");
    assert_eq!(err.code(), expected);
}

#[rstest]
#[tokio::test]
async fn unreachable_provider_reports_network_error(session: SessionStore) {
    let mut provider = MockIdentityProvider::new();
    provider.expect_send_password_reset().times(1).returning(|_| {
        Err(IdentityProviderError::unavailable("unreachable"))
    });
    let auth = service(provider, &session);

    let err = auth
        .send_password_reset(&PasswordResetForm::new("ada@example.com"))
        .await
        .expect_err("provider offline");
    assert_eq!(err.code(), ErrorCode::NetworkError);
}

#[rstest]
#[tokio::test]
async fn password_reset_validates_email_first(session: SessionStore) {
    let mut provider = MockIdentityProvider::new();
    provider.expect_send_password_reset().times(0);
    let auth = service(provider, &session);

    let err = auth
        .send_password_reset(&PasswordResetForm::new("not-an-email"))
        .await
        .expect_err("invalid email");
    assert_eq!(err.code(), ErrorCode::Validation);
}

#[rstest]
#[tokio::test]
async fn sign_out_clears_session(session: SessionStore) {
    session.apply(Some(identity("ada@example.com")));
    let mut provider = MockIdentityProvider::new();
    provider.expect_sign_out().times(1).returning(|| Ok(()));
    let auth = service(provider, &session);

    auth.sign_out().await.expect("sign out");
    assert_eq!(session.snapshot(), SessionState::SignedOut);
}

#[rstest]
#[tokio::test]
async fn failed_sign_out_keeps_session(session: SessionStore) {
    let user = identity("ada@example.com");
    session.apply(Some(user.clone()));
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_out()
        .times(1)
        .returning(|| Err(IdentityProviderError::unavailable("offline")));
    let auth = service(provider, &session);

    let err = auth.sign_out().await.expect_err("offline");
    assert_eq!(err.code(), ErrorCode::NetworkError);
    assert_eq!(session.current_identity(), Some(user));
}

#[rstest]
#[case(IdentityProviderError::invalid_email(""), ErrorCode::InvalidEmail)]
#[case(IdentityProviderError::weak_password(""), ErrorCode::WeakPassword)]
#[case(IdentityProviderError::email_in_use(""), ErrorCode::EmailInUse)]
#[case(IdentityProviderError::rejected(" "), ErrorCode::NetworkError)]
fn blank_provider_messages_still_describe_the_failure(
    #[case] failure: IdentityProviderError,
    #[case] expected: ErrorCode,
) {
    let err = map_provider_error(failure);

    assert_eq!(err.code(), expected);
    assert!(!err.message().trim().is_empty());
}
