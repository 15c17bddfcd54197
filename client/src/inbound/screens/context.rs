//! Shared state handed to every screen controller.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error, warn};

use crate::domain::ports::{Authentication, ProfileEditor, ServiceCatalogue};
use crate::domain::{
    Appearance, AppearanceSnapshot, Error, ErrorCode, MountHandle, Navigator, Presentation, Route,
    SubmissionGuard, ValidationErrors,
};

/// Parameter object bundling the driving ports screens call.
#[derive(Clone)]
pub struct ScreenPorts {
    /// Sign-in, sign-up, password reset, and sign-out.
    pub auth: Arc<dyn Authentication>,
    /// Owner-scoped service records.
    pub catalogue: Arc<dyn ServiceCatalogue>,
    /// Profile document and avatar.
    pub profile: Arc<dyn ProfileEditor>,
}

/// What the user currently sees about the last action on a screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feedback {
    /// Inline messages for the offending form fields.
    pub field_errors: ValidationErrors,
    /// Dismissible message for failures that belong to no single field.
    pub notice: Option<String>,
}

/// Result of a screen action.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The call succeeded and its effect was applied to the screen.
    Completed(T),
    /// The call failed; the error is shown on the screen.
    Failed(ErrorCode),
    /// The same action is already outstanding.
    Busy,
    /// The screen was unmounted before the call finished.
    Discarded,
}

impl<T> Outcome<T> {
    /// Transform the value of a completed action.
    pub fn map<U>(self, apply: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Completed(value) => Outcome::Completed(apply(value)),
            Self::Failed(code) => Outcome::Failed(code),
            Self::Busy => Outcome::Busy,
            Self::Discarded => Outcome::Discarded,
        }
    }

    /// Value of a completed action.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Failed(_) | Self::Busy | Self::Discarded => None,
        }
    }
}

/// Injected environment of one mounted screen.
///
/// The appearance snapshot is taken when the context is built; call
/// [`ScreenContext::refresh_appearance`] after a change notification.
#[derive(Debug, Clone)]
pub struct ScreenContext {
    navigator: Navigator,
    appearance: Appearance,
    snapshot: AppearanceSnapshot,
    mount: MountHandle,
}

impl ScreenContext {
    /// Build the context of the screen owning `mount`.
    pub fn new(navigator: Navigator, appearance: Appearance, mount: MountHandle) -> Self {
        let snapshot = appearance.snapshot();
        Self {
            navigator,
            appearance,
            snapshot,
            mount,
        }
    }

    /// Context for the route currently on top of the stack.
    pub fn for_current(navigator: &Navigator, appearance: &Appearance) -> Self {
        Self::new(
            navigator.clone(),
            appearance.clone(),
            navigator.current_mount(),
        )
    }

    /// Shared navigator.
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Shared appearance state.
    pub fn appearance_handle(&self) -> &Appearance {
        &self.appearance
    }

    /// Appearance this screen renders with.
    pub fn appearance(&self) -> AppearanceSnapshot {
        self.snapshot
    }

    /// Re-read the shared appearance.
    pub fn refresh_appearance(&mut self) -> AppearanceSnapshot {
        self.snapshot = self.appearance.snapshot();
        self.snapshot
    }

    /// True while this screen is on the navigation stack.
    pub fn is_mounted(&self) -> bool {
        self.navigator.refresh();
        self.mount.is_mounted()
    }

    /// Show `route`, logging instead of failing when it is unreachable.
    pub fn navigate(&self, route: Route) -> bool {
        match self.navigator.navigate(route) {
            Ok(_) => true,
            Err(err) => {
                warn!(%err, "navigation refused");
                false
            }
        }
    }

    /// Leave this screen.
    pub fn go_back(&self) -> bool {
        self.navigator.go_back()
    }

    /// Show `err` on the screen according to its presentation class.
    pub fn present(&self, err: &Error, feedback: &mut Feedback) {
        match err.presentation() {
            Presentation::FieldErrors => {
                feedback.field_errors = err.field_errors().unwrap_or_default();
            }
            Presentation::Notice => feedback.notice = Some(err.message().to_owned()),
            Presentation::ReturnToList => {
                feedback.notice = Some(err.message().to_owned());
                self.navigate(Route::Home);
            }
            Presentation::InvariantViolation => {
                error!(code = ?err.code(), detail = err.message(), "screen reached without session");
                feedback.notice = Some(err.message().to_owned());
            }
        }
    }

    /// Run one screen action.
    ///
    /// Unmounted screens start nothing. At most one action per `guard` is
    /// outstanding. Feedback is cleared when the action starts; a failure is
    /// presented only if the screen is still mounted when the call returns.
    pub async fn run<T, F>(
        &self,
        operation: &'static str,
        guard: &SubmissionGuard,
        feedback: &Mutex<Feedback>,
        call: F,
    ) -> Outcome<T>
    where
        F: Future<Output = Result<T, Error>>,
    {
        if !self.is_mounted() {
            debug!(operation, "screen not mounted; action ignored");
            return Outcome::Discarded;
        }
        let Some(_ticket) = guard.try_begin() else {
            debug!(operation, "action already outstanding");
            return Outcome::Busy;
        };
        *feedback.lock().unwrap_or_else(PoisonError::into_inner) = Feedback::default();

        let result = call.await;

        if !self.is_mounted() {
            debug!(operation, "screen unmounted; dropping result");
            return Outcome::Discarded;
        }
        match result {
            Ok(value) => Outcome::Completed(value),
            Err(err) => {
                debug!(operation, code = ?err.code(), "action failed");
                let mut shown = feedback.lock().unwrap_or_else(PoisonError::into_inner);
                self.present(&err, &mut shown);
                Outcome::Failed(err.code())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{EmailAddress, Identity, ServiceId, SessionStore, UserId};
    use rstest::{fixture, rstest};

    #[fixture]
    fn signed_in() -> (SessionStore, Navigator) {
        let session = SessionStore::new();
        session.apply(Some(Identity::new(
            UserId::new("u1").expect("id"),
            EmailAddress::new("ada@example.com").expect("email"),
        )));
        let navigator = Navigator::new(&session);
        (session, navigator)
    }

    #[rstest]
    #[tokio::test]
    async fn second_action_while_outstanding_is_busy(signed_in: (SessionStore, Navigator)) {
        let (_session, navigator) = signed_in;
        let context = ScreenContext::for_current(&navigator, &Appearance::default());
        let guard = SubmissionGuard::default();
        let feedback = Mutex::new(Feedback::default());

        let held = guard.try_begin().expect("first ticket");
        let outcome = context
            .run("add_service", &guard, &feedback, async { Ok::<_, Error>(()) })
            .await;
        assert_eq!(outcome, Outcome::Busy);
        drop(held);

        let outcome = context
            .run("add_service", &guard, &feedback, async { Ok::<_, Error>(7) })
            .await;
        assert_eq!(outcome, Outcome::Completed(7));
    }

    #[rstest]
    #[tokio::test]
    async fn unmounted_screen_drops_failures(signed_in: (SessionStore, Navigator)) {
        let (session, navigator) = signed_in;
        let context = ScreenContext::for_current(&navigator, &Appearance::default());
        let feedback = Mutex::new(Feedback::default());

        let outcome: Outcome<()> = context
            .run("get_service", &SubmissionGuard::default(), &feedback, async {
                session.apply(None);
                Err(Error::store("late"))
            })
            .await;
        assert_eq!(outcome, Outcome::Discarded);
        assert_eq!(
            *feedback.lock().expect("feedback"),
            Feedback::default()
        );
    }

    #[rstest]
    fn not_found_returns_to_the_list(signed_in: (SessionStore, Navigator)) {
        let (_session, navigator) = signed_in;
        let id = ServiceId::new("s1").expect("id");
        let mount = navigator
            .navigate(Route::ServiceDetail(id))
            .expect("detail reachable");
        let context = ScreenContext::new(navigator.clone(), Appearance::default(), mount);
        let mut feedback = Feedback::default();

        context.present(&Error::not_found("service s1 not found"), &mut feedback);

        assert_eq!(feedback.notice.as_deref(), Some("service s1 not found"));
        assert_eq!(navigator.current(), Route::Home);
        assert!(!context.is_mounted());
    }

    #[rstest]
    fn appearance_snapshot_is_fixed_until_refreshed(signed_in: (SessionStore, Navigator)) {
        let (_session, navigator) = signed_in;
        let appearance = Appearance::default();
        let mut context = ScreenContext::for_current(&navigator, &appearance);
        let before = context.appearance();

        appearance.toggle_theme();
        assert_eq!(context.appearance(), before);
        assert_ne!(context.refresh_appearance(), before);
    }
}
