//! Add, detail, and edit screens of the service catalogue.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::domain::ports::ServiceCatalogue;
use crate::domain::{Route, ServiceForm, ServiceId, ServiceRecord, SubmissionGuard};

use super::context::{Feedback, Outcome, ScreenContext};
use super::form::FormState;

/// Controller of the add-service screen.
pub struct AddServiceScreen {
    context: ScreenContext,
    catalogue: Arc<dyn ServiceCatalogue>,
    form: FormState<ServiceForm>,
}

impl AddServiceScreen {
    /// Mount the screen with an empty form.
    pub fn new(context: ScreenContext, catalogue: Arc<dyn ServiceCatalogue>) -> Self {
        Self {
            context,
            catalogue,
            form: FormState::new(ServiceForm::default()),
        }
    }

    /// Injected context.
    pub fn context(&self) -> &ScreenContext {
        &self.context
    }

    /// Form state.
    pub fn form(&self) -> &FormState<ServiceForm> {
        &self.form
    }

    /// Create the service, then return to the list.
    pub async fn submit(&self) -> Outcome<ServiceId> {
        let input = self.form.input();
        let outcome = self
            .context
            .run(
                "add_service",
                self.form.guard(),
                self.form.feedback_slot(),
                self.catalogue.add_service(&input),
            )
            .await;
        if let Outcome::Completed(id) = &outcome {
            debug!(%id, "service added");
            self.context.go_back();
        }
        outcome
    }
}

/// Controller of the service detail screen.
pub struct ServiceDetailScreen {
    context: ScreenContext,
    catalogue: Arc<dyn ServiceCatalogue>,
    id: ServiceId,
    record: Mutex<Option<ServiceRecord>>,
    feedback: Mutex<Feedback>,
    loading: SubmissionGuard,
    deleting: SubmissionGuard,
}

impl ServiceDetailScreen {
    /// Mount the screen for `id`; nothing is loaded yet.
    pub fn new(context: ScreenContext, catalogue: Arc<dyn ServiceCatalogue>, id: ServiceId) -> Self {
        Self {
            context,
            catalogue,
            id,
            record: Mutex::new(None),
            feedback: Mutex::new(Feedback::default()),
            loading: SubmissionGuard::default(),
            deleting: SubmissionGuard::default(),
        }
    }

    /// Injected context.
    pub fn context(&self) -> &ScreenContext {
        &self.context
    }

    /// Service shown by this screen.
    pub fn id(&self) -> &ServiceId {
        &self.id
    }

    /// Last loaded record.
    pub fn record(&self) -> Option<ServiceRecord> {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current feedback.
    pub fn feedback(&self) -> Feedback {
        self.feedback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True while the record is being fetched.
    pub fn is_loading(&self) -> bool {
        self.loading.is_submitting()
    }

    /// Fetch the record. A missing record sends the user back to the list.
    pub async fn load(&self) -> Outcome<ServiceRecord> {
        let outcome = self
            .context
            .run(
                "get_service",
                &self.loading,
                &self.feedback,
                self.catalogue.get_service(&self.id),
            )
            .await;
        if let Outcome::Completed(record) = &outcome {
            *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(record.clone());
        }
        outcome
    }

    /// Delete the service and return to the list.
    pub async fn delete(&self) -> Outcome<()> {
        let outcome = self
            .context
            .run(
                "delete_service",
                &self.deleting,
                &self.feedback,
                self.catalogue.delete_service(&self.id),
            )
            .await;
        if outcome == Outcome::Completed(()) {
            debug!(id = %self.id, "service deleted");
            self.context.go_back();
        }
        outcome
    }

    /// Open the edit screen for this service.
    pub fn edit(&self) -> bool {
        self.context.navigate(Route::EditService(self.id.clone()))
    }
}

/// Controller of the edit-service screen.
pub struct EditServiceScreen {
    context: ScreenContext,
    catalogue: Arc<dyn ServiceCatalogue>,
    id: ServiceId,
    form: FormState<ServiceForm>,
    loading: SubmissionGuard,
}

impl EditServiceScreen {
    /// Mount the screen for `id` with an empty form; call
    /// [`EditServiceScreen::load`] to prefill it.
    pub fn new(context: ScreenContext, catalogue: Arc<dyn ServiceCatalogue>, id: ServiceId) -> Self {
        Self {
            context,
            catalogue,
            id,
            form: FormState::new(ServiceForm::default()),
            loading: SubmissionGuard::default(),
        }
    }

    /// Injected context.
    pub fn context(&self) -> &ScreenContext {
        &self.context
    }

    /// Form state.
    pub fn form(&self) -> &FormState<ServiceForm> {
        &self.form
    }

    /// Prefill the form from the stored record.
    pub async fn load(&self) -> Outcome<ServiceRecord> {
        let outcome = self
            .context
            .run(
                "get_service",
                &self.loading,
                self.form.feedback_slot(),
                self.catalogue.get_service(&self.id),
            )
            .await;
        if let Outcome::Completed(record) = &outcome {
            self.form.replace(ServiceForm::from_record(record));
        }
        outcome
    }

    /// Replace every field of the service, then return to the detail.
    pub async fn submit(&self) -> Outcome<()> {
        let input = self.form.input();
        let outcome = self
            .context
            .run(
                "update_service",
                self.form.guard(),
                self.form.feedback_slot(),
                self.catalogue.update_service(&self.id, &input),
            )
            .await;
        if outcome == Outcome::Completed(()) {
            debug!(id = %self.id, "service updated");
            self.context.go_back();
        }
        outcome
    }
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod tests;
