//! Session state shared by the navigator and the owner-scoped services.
//!
//! The store starts in [`SessionState::Pending`] and leaves it on the first
//! notification from the identity provider. Applying a state equal to the
//! current one does not notify subscribers, so an explicit sign-in followed
//! by the provider's own notification yields a single transition.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::watch;
use tracing::{error, info};

use crate::domain::ports::SessionEvents;
use crate::domain::{Error, Identity};

/// Authentication state as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The identity provider has not reported yet.
    Pending,
    /// No one is signed in.
    SignedOut,
    /// `Identity` is signed in.
    SignedIn(Identity),
}

impl SessionState {
    /// Signed-in identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::SignedIn(identity) => Some(identity),
            Self::Pending | Self::SignedOut => None,
        }
    }

    /// True until the provider's first notification.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl From<Option<Identity>> for SessionState {
    fn from(value: Option<Identity>) -> Self {
        value.map_or(Self::SignedOut, Self::SignedIn)
    }
}

/// Process-wide holder of the [`SessionState`].
///
/// Cloning yields another handle onto the same state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<SessionState>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a store in the pending state.
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Pending);
        Self {
            state: Arc::new(state),
        }
    }

    /// Apply a provider notification. Returns `true` when the state changed.
    pub fn apply(&self, identity: Option<Identity>) -> bool {
        let next = SessionState::from(identity);
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next.clone();
            true
        });
        if changed {
            match &next {
                SessionState::SignedIn(identity) => {
                    info!(user_id = %identity.user_id(), "session signed in");
                }
                SessionState::SignedOut => info!("session signed out"),
                SessionState::Pending => {}
            }
        }
        changed
    }

    /// Apply every notification from `events` until the stream ends.
    pub async fn follow(&self, mut events: SessionEvents) {
        while let Some(identity) = events.next().await {
            self.apply(identity);
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Identity of the current session, if signed in.
    pub fn current_identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    /// Identity of the current session, or [`Error::not_authenticated`].
    ///
    /// The navigator keeps owner-scoped screens unreachable without a
    /// session, so reaching the error branch is logged as an invariant
    /// violation.
    pub fn require_identity(&self, operation: &'static str) -> Result<Identity, Error> {
        self.current_identity().ok_or_else(|| {
            error!(operation, "owner-scoped operation attempted without a session");
            Error::not_authenticated(format!("{operation} requires a signed-in session"))
        })
    }
}
