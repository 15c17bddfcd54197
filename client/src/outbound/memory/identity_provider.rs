//! In-memory identity provider.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tokio::sync::watch;
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::lock;
use crate::domain::ports::{IdentityProvider, IdentityProviderError, SessionEvents};
use crate::domain::validation::PASSWORD_MIN_LEN;
use crate::domain::{EmailAddress, Identity, UserId};

struct Account {
    user_id: UserId,
    email: EmailAddress,
    password: Zeroizing<String>,
}

/// Accounts and a single session held in process memory.
///
/// Session changes are broadcast through a watch channel, so the event
/// stream yields the current state first and then each change.
pub struct InMemoryIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    resets: Mutex<Vec<EmailAddress>>,
    session: watch::Sender<Option<Identity>>,
    offline: AtomicBool,
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIdentityProvider {
    /// Create a provider with no accounts and no session.
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            resets: Mutex::new(Vec::new()),
            session,
            offline: AtomicBool::new(false),
        }
    }

    /// Simulate losing or regaining connectivity.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// End the current session from the provider side, as a token expiry
    /// would.
    pub fn expire_session(&self) {
        if self.session.send_replace(None).is_some() {
            info!("identity provider expired the session");
        }
    }

    /// Addresses that were sent a password reset, oldest first.
    pub fn password_resets(&self) -> Vec<EmailAddress> {
        lock(&self.resets).clone()
    }

    /// Number of registered accounts.
    pub fn account_count(&self) -> usize {
        lock(&self.accounts).len()
    }

    fn ensure_online(&self) -> Result<(), IdentityProviderError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(IdentityProviderError::unavailable(
                "identity provider is offline",
            ));
        }
        Ok(())
    }

    fn account_key(email: &EmailAddress) -> String {
        email.as_ref().to_lowercase()
    }

    fn start_session(&self, identity: &Identity) {
        self.session.send_replace(Some(identity.clone()));
        debug!(user_id = %identity.user_id(), "provider session started");
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_up(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<Identity, IdentityProviderError> {
        self.ensure_online()?;
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(IdentityProviderError::weak_password(format!(
                "password should be at least {PASSWORD_MIN_LEN} characters"
            )));
        }
        let identity = {
            let mut accounts = lock(&self.accounts);
            let key = Self::account_key(email);
            if accounts.contains_key(&key) {
                return Err(IdentityProviderError::email_in_use(email.to_string()));
            }
            let account = Account {
                user_id: UserId::random(),
                email: email.clone(),
                password: Zeroizing::new(password.to_owned()),
            };
            let identity = Identity::new(account.user_id.clone(), account.email.clone());
            accounts.insert(key, account);
            identity
        };
        self.start_session(&identity);
        Ok(identity)
    }

    async fn sign_in(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<Identity, IdentityProviderError> {
        self.ensure_online()?;
        let identity = {
            let accounts = lock(&self.accounts);
            let account = accounts
                .get(&Self::account_key(email))
                .ok_or_else(|| IdentityProviderError::user_not_found(email.to_string()))?;
            if account.password.as_str() != password {
                return Err(IdentityProviderError::invalid_credential(email.to_string()));
            }
            Identity::new(account.user_id.clone(), account.email.clone())
        };
        self.start_session(&identity);
        Ok(identity)
    }

    async fn send_password_reset(&self, email: &EmailAddress) -> Result<(), IdentityProviderError> {
        self.ensure_online()?;
        if !lock(&self.accounts).contains_key(&Self::account_key(email)) {
            return Err(IdentityProviderError::user_not_found(email.to_string()));
        }
        lock(&self.resets).push(email.clone());
        debug!(%email, "password reset sent");
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), IdentityProviderError> {
        self.ensure_online()?;
        self.session.send_replace(None);
        debug!("provider session ended");
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        self.session.borrow().clone()
    }

    fn session_events(&self) -> SessionEvents {
        let receiver = self.session.subscribe();
        stream::unfold((receiver, true), |(mut receiver, first)| async move {
            if !first && receiver.changed().await.is_err() {
                return None;
            }
            let current = receiver.borrow_and_update().clone();
            Some((current, (receiver, false)))
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn email() -> EmailAddress {
        EmailAddress::new("new@test.com").expect("email")
    }

    #[rstest]
    #[tokio::test]
    async fn sign_up_then_sign_in_returns_same_user(email: EmailAddress) {
        let provider = InMemoryIdentityProvider::new();
        let created = provider.sign_up(&email, "abc123").await.expect("sign up");
        provider.sign_out().await.expect("sign out");

        let signed_in = provider.sign_in(&email, "abc123").await.expect("sign in");
        assert_eq!(signed_in, created);
        assert_eq!(provider.current_identity(), Some(created));
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_and_weak_sign_ups_are_rejected(email: EmailAddress) {
        let provider = InMemoryIdentityProvider::new();
        provider.sign_up(&email, "abc123").await.expect("sign up");

        let err = provider.sign_up(&email, "abc123").await.expect_err("dup");
        assert!(matches!(err, IdentityProviderError::EmailInUse { .. }));
        let other = EmailAddress::new("other@test.com").expect("email");
        let err = provider.sign_up(&other, "abc").await.expect_err("weak");
        assert!(matches!(err, IdentityProviderError::WeakPassword { .. }));
        assert_eq!(provider.account_count(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn sign_in_distinguishes_unknown_user_and_bad_password(email: EmailAddress) {
        let provider = InMemoryIdentityProvider::new();
        let err = provider.sign_in(&email, "abc123").await.expect_err("unknown");
        assert!(matches!(err, IdentityProviderError::UserNotFound { .. }));

        provider.sign_up(&email, "abc123").await.expect("sign up");
        let err = provider.sign_in(&email, "wrong!").await.expect_err("bad");
        assert!(matches!(err, IdentityProviderError::InvalidCredential { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn password_reset_requires_an_account(email: EmailAddress) {
        let provider = InMemoryIdentityProvider::new();
        let err = provider.send_password_reset(&email).await.expect_err("no account");
        assert!(matches!(err, IdentityProviderError::UserNotFound { .. }));

        provider.sign_up(&email, "abc123").await.expect("sign up");
        provider.send_password_reset(&email).await.expect("reset");
        assert_eq!(provider.password_resets(), vec![email]);
    }

    #[rstest]
    #[tokio::test]
    async fn offline_provider_is_unavailable(email: EmailAddress) {
        let provider = InMemoryIdentityProvider::new();
        provider.set_offline(true);
        let err = provider.sign_up(&email, "abc123").await.expect_err("offline");
        assert!(matches!(err, IdentityProviderError::Unavailable { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn session_events_start_with_current_state_and_report_expiry(email: EmailAddress) {
        let provider = InMemoryIdentityProvider::new();
        let mut events = provider.session_events();
        assert_eq!(events.next().await, Some(None));

        let identity = provider.sign_up(&email, "abc123").await.expect("sign up");
        assert_eq!(events.next().await, Some(Some(identity)));

        provider.expire_session();
        assert_eq!(events.next().await, Some(None));
    }
}
