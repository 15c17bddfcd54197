//! Home screen: profile editor, live service list, and account actions.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::domain::{
    AppearanceSnapshot, AvatarUri, Error, Profile, ProfileForm, Route, ServiceId, ServiceListDiff,
    ServiceListState, ServiceListSubscription, ServiceRecord, SubmissionGuard,
};

use super::context::{Outcome, ScreenContext, ScreenPorts};
use super::form::FormState;

/// Controller of the home screen.
///
/// The service list stays live between [`HomeScreen::mount_list`] and
/// [`HomeScreen::unmount_list`]; leaving the screen or dropping the
/// controller releases the subscription.
pub struct HomeScreen {
    context: ScreenContext,
    ports: ScreenPorts,
    profile: FormState<ProfileForm>,
    avatar: Mutex<Option<AvatarUri>>,
    loading: SubmissionGuard,
    changing_avatar: SubmissionGuard,
    subscribing: SubmissionGuard,
    signing_out: SubmissionGuard,
    list: Mutex<ServiceListState>,
    subscription: tokio::sync::Mutex<Option<ServiceListSubscription>>,
    unmounting: Notify,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl HomeScreen {
    /// Mount the screen; nothing is loaded yet.
    pub fn new(context: ScreenContext, ports: ScreenPorts) -> Self {
        Self {
            context,
            ports,
            profile: FormState::new(ProfileForm::default()),
            avatar: Mutex::new(None),
            loading: SubmissionGuard::default(),
            changing_avatar: SubmissionGuard::default(),
            subscribing: SubmissionGuard::default(),
            signing_out: SubmissionGuard::default(),
            list: Mutex::new(ServiceListState::default()),
            subscription: tokio::sync::Mutex::new(None),
            unmounting: Notify::new(),
        }
    }

    /// Injected context.
    pub fn context(&self) -> &ScreenContext {
        &self.context
    }

    /// Profile form state. Its feedback also carries list and account
    /// notices.
    pub fn profile(&self) -> &FormState<ProfileForm> {
        &self.profile
    }

    /// Avatar shown next to the profile.
    pub fn avatar(&self) -> Option<AvatarUri> {
        lock(&self.avatar).clone()
    }

    /// True while the profile is being fetched.
    pub fn is_loading(&self) -> bool {
        self.loading.is_submitting()
    }

    /// Fetch the profile and fill the form. Without a stored avatar the
    /// device-local copy is shown.
    pub async fn load_profile(&self) -> Outcome<Profile> {
        let editor = &self.ports.profile;
        let outcome = self
            .context
            .run(
                "load_profile",
                &self.loading,
                self.profile.feedback_slot(),
                async {
                    let profile = editor.load_profile().await?;
                    if profile.avatar_uri.is_some() {
                        return Ok::<_, Error>((profile, None));
                    }
                    let cached = match editor.cached_avatar().await {
                        Ok(cached) => cached,
                        Err(err) => {
                            warn!(code = ?err.code(), "cached avatar unavailable");
                            None
                        }
                    };
                    Ok::<_, Error>((profile, cached))
                },
            )
            .await;
        outcome.map(|(profile, cached)| {
            self.profile.replace(ProfileForm::from_profile(&profile));
            *lock(&self.avatar) = profile.avatar_uri.clone().or(cached);
            profile
        })
    }

    /// Validate and write the whole profile.
    pub async fn save_profile(&self) -> Outcome<Profile> {
        let input = self.profile.input();
        let avatar = self.avatar();
        let outcome = self
            .context
            .run(
                "save_profile",
                self.profile.guard(),
                self.profile.feedback_slot(),
                self.ports.profile.save_profile(&input, avatar),
            )
            .await;
        outcome.map(|profile| {
            self.profile.replace(ProfileForm::from_profile(&profile));
            profile
        })
    }

    /// Keep a durable copy of the picked image and make it the avatar.
    pub async fn change_avatar(&self, picked: &Path) -> Outcome<AvatarUri> {
        let outcome = self
            .context
            .run(
                "change_avatar",
                &self.changing_avatar,
                self.profile.feedback_slot(),
                self.ports.profile.change_avatar(picked),
            )
            .await;
        outcome.map(|avatar| {
            *lock(&self.avatar) = Some(avatar.clone());
            avatar
        })
    }

    /// Start the live service list. A running subscription is kept.
    pub async fn mount_list(&self) -> Outcome<()> {
        let mut slot = self.subscription.lock().await;
        if slot
            .as_ref()
            .is_some_and(|subscription| !subscription.is_released())
        {
            return Outcome::Completed(());
        }
        let outcome = self
            .context
            .run(
                "subscribe_services",
                &self.subscribing,
                self.profile.feedback_slot(),
                self.ports.catalogue.subscribe_services(),
            )
            .await;
        outcome.map(|subscription| {
            *slot = Some(subscription);
        })
    }

    /// Wait for the next list delivery and apply it.
    ///
    /// Returns `None` once the list is unmounted or the subscription ends.
    /// [`HomeScreen::unmount_list`] ends a pending wait.
    pub async fn next_update(&self) -> Option<ServiceListDiff> {
        let unmounting = self.unmounting.notified();
        tokio::pin!(unmounting);
        let mut slot = self.subscription.lock().await;
        let subscription = slot.as_mut()?;
        loop {
            let snapshot = tokio::select! {
                snapshot = subscription.next_snapshot() => snapshot?,
                () = &mut unmounting => {
                    debug!("service list unmounting; wait abandoned");
                    return None;
                }
            };
            if !self.context.is_mounted() {
                debug!("home unmounted; releasing service list");
                subscription.release();
                return None;
            }
            if let Some(diff) = lock(&self.list).apply(snapshot) {
                return Some(diff);
            }
        }
    }

    /// Stop the live service list.
    pub async fn unmount_list(&self) {
        self.unmounting.notify_waiters();
        if let Some(mut subscription) = self.subscription.lock().await.take() {
            subscription.release();
        }
    }

    /// Services currently listed.
    pub fn services(&self) -> Vec<ServiceRecord> {
        lock(&self.list).services().to_vec()
    }

    /// True once a first delivery was applied.
    pub fn is_list_loaded(&self) -> bool {
        lock(&self.list).is_loaded()
    }

    /// End the session. The navigator then switches to the auth screens.
    pub async fn sign_out(&self) -> Outcome<()> {
        let outcome = self
            .context
            .run(
                "sign_out",
                &self.signing_out,
                self.profile.feedback_slot(),
                self.ports.auth.sign_out(),
            )
            .await;
        if !self.context.is_mounted() {
            self.unmount_list().await;
        }
        outcome
    }

    /// Switch between light and dark.
    pub fn toggle_theme(&mut self) -> AppearanceSnapshot {
        self.context.appearance_handle().toggle_theme();
        self.context.refresh_appearance()
    }

    /// Switch between Vietnamese and English.
    pub fn toggle_locale(&mut self) -> AppearanceSnapshot {
        self.context.appearance_handle().toggle_locale();
        self.context.refresh_appearance()
    }

    /// Open the add-service screen.
    pub fn open_add_service(&self) -> bool {
        self.context.navigate(Route::AddService)
    }

    /// Open the detail screen of a listed service.
    pub fn open_service(&self, id: &ServiceId) -> bool {
        self.context.navigate(Route::ServiceDetail(id.clone()))
    }
}

#[cfg(test)]
#[path = "home_tests.rs"]
mod tests;
