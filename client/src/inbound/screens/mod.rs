//! Screen controllers.
//!
//! Each controller owns the view state of one screen (form input, field
//! errors, notice, busy flags) and calls the driving ports. Controllers are
//! built for the route on top of the navigator stack by [`Screens`].

pub mod auth;
pub mod context;
pub mod form;
pub mod home;
pub mod services;

use crate::domain::{Appearance, Navigator, Route};

pub use self::auth::{ForgotPasswordScreen, LoginScreen, SignupScreen};
pub use self::context::{Feedback, Outcome, ScreenContext, ScreenPorts};
pub use self::form::FormState;
pub use self::home::HomeScreen;
pub use self::services::{AddServiceScreen, EditServiceScreen, ServiceDetailScreen};

/// Controller of the screen currently shown.
pub enum ActiveScreen {
    /// Waiting for the identity provider; nothing to control.
    Splash,
    /// Sign-in form.
    Login(LoginScreen),
    /// Account creation form.
    Signup(SignupScreen),
    /// Password reset request.
    ForgotPassword(ForgotPasswordScreen),
    /// Profile, live service list, and account actions.
    Home(HomeScreen),
    /// New service form.
    AddService(AddServiceScreen),
    /// One service with delete and edit actions.
    ServiceDetail(ServiceDetailScreen),
    /// Prefilled edit form.
    EditService(EditServiceScreen),
}

/// Builds controllers for the navigator's current route.
#[derive(Clone)]
pub struct Screens {
    navigator: Navigator,
    appearance: Appearance,
    ports: ScreenPorts,
}

impl Screens {
    /// Bundle the shared navigator, appearance, and ports.
    pub fn new(navigator: Navigator, appearance: Appearance, ports: ScreenPorts) -> Self {
        Self {
            navigator,
            appearance,
            ports,
        }
    }

    /// Shared navigator.
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Shared appearance.
    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    /// Controller for the route on top of the stack.
    pub fn current(&self) -> ActiveScreen {
        let route = self.navigator.current();
        let context = ScreenContext::for_current(&self.navigator, &self.appearance);
        let ports = &self.ports;
        match route {
            Route::Splash => ActiveScreen::Splash,
            Route::Login => ActiveScreen::Login(LoginScreen::new(context, ports.auth.clone())),
            Route::Signup => ActiveScreen::Signup(SignupScreen::new(context, ports.auth.clone())),
            Route::ForgotPassword => ActiveScreen::ForgotPassword(ForgotPasswordScreen::new(
                context,
                ports.auth.clone(),
            )),
            Route::Home => ActiveScreen::Home(HomeScreen::new(context, ports.clone())),
            Route::AddService => ActiveScreen::AddService(AddServiceScreen::new(
                context,
                ports.catalogue.clone(),
            )),
            Route::ServiceDetail(id) => ActiveScreen::ServiceDetail(ServiceDetailScreen::new(
                context,
                ports.catalogue.clone(),
                id,
            )),
            Route::EditService(id) => ActiveScreen::EditService(EditServiceScreen::new(
                context,
                ports.catalogue.clone(),
                id,
            )),
        }
    }
}
