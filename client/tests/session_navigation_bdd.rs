//! Behaviour-driven tests for authentication and session-gated navigation.
//!
//! Scenarios drive the authentication screens over the in-memory identity
//! provider and observe the navigator.

use std::collections::HashSet;
use std::sync::Arc;

use client::domain::{PasswordResetForm, Route, Screen, SignInForm, SignUpForm};
use client::inbound::screens::{ActiveScreen, Feedback, Outcome};
use client::test_support::TestApp;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use tokio::runtime::{Builder, Runtime};

// -----------------------------------------------------------------------------
// Test World
// -----------------------------------------------------------------------------

#[derive(Clone)]
struct RuntimeHandle(Arc<Runtime>);

#[derive(Clone)]
struct AppHandle(Arc<TestApp>);

#[derive(Default, ScenarioState)]
struct SessionWorld {
    runtime: Slot<RuntimeHandle>,
    app: Slot<AppHandle>,
    feedback: Slot<Feedback>,
}

impl SessionWorld {
    fn runtime(&self) -> Arc<Runtime> {
        self.runtime.get().expect("runtime").0
    }

    fn app(&self) -> Arc<TestApp> {
        self.app.get().expect("client app").0
    }

    fn setup(&self) {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("create runtime");
        self.runtime.set(RuntimeHandle(Arc::new(runtime)));
        self.app
            .set(AppHandle(Arc::new(TestApp::new().expect("wire client"))));
    }

    fn register(&self, email: &str, password: &str) {
        let app = self.app();
        let form = SignUpForm::new(email, password, password);
        self.runtime()
            .block_on(app.ports.auth.sign_up(&form))
            .expect("sign up");
    }
}

fn unquote(raw: &str) -> &str {
    raw.trim_matches('"')
}

#[fixture]
fn world() -> SessionWorld {
    SessionWorld::default()
}

// -----------------------------------------------------------------------------
// Given Steps
// -----------------------------------------------------------------------------

#[given("a signed-out client")]
fn a_signed_out_client(world: &SessionWorld) {
    world.setup();
    assert_eq!(world.app().navigator.current(), Route::Login);
}

#[given("a registered user {email} with password {password}")]
fn a_registered_user(world: &SessionWorld, email: String, password: String) {
    world.setup();
    world.register(unquote(&email), unquote(&password));
    let app = world.app();
    world
        .runtime()
        .block_on(app.ports.auth.sign_out())
        .expect("sign out");
    assert_eq!(app.navigator.current(), Route::Login);
}

#[given("a signed-in user {email}")]
fn a_signed_in_user(world: &SessionWorld, email: String) {
    world.setup();
    world.register(unquote(&email), "abc123");
    assert_eq!(world.app().navigator.current(), Route::Home);
}

#[given("the user has opened the add service screen")]
fn the_user_has_opened_the_add_service_screen(world: &SessionWorld) {
    let app = world.app();
    app.navigator
        .navigate(Route::AddService)
        .expect("add service reachable");
    assert_eq!(app.navigator.stack(), vec![Route::Home, Route::AddService]);
}

// -----------------------------------------------------------------------------
// When Steps
// -----------------------------------------------------------------------------

#[when("the user signs up as {email} with password {password} confirmed as {confirmation}")]
fn the_user_signs_up(world: &SessionWorld, email: String, password: String, confirmation: String) {
    let app = world.app();
    let ActiveScreen::Login(login) = app.screens.current() else {
        panic!("expected the login screen");
    };
    assert!(login.open_signup());
    let ActiveScreen::Signup(signup) = app.screens.current() else {
        panic!("expected the signup screen");
    };
    signup.form().replace(SignUpForm::new(
        unquote(&email),
        unquote(&password),
        unquote(&confirmation),
    ));
    world.runtime().block_on(signup.submit());
    world.feedback.set(signup.form().feedback());
}

#[when("the user signs in as {email} with password {password}")]
fn the_user_signs_in(world: &SessionWorld, email: String, password: String) {
    let app = world.app();
    let ActiveScreen::Login(login) = app.screens.current() else {
        panic!("expected the login screen");
    };
    login
        .form()
        .replace(SignInForm::new(unquote(&email), unquote(&password)));
    world.runtime().block_on(login.submit());
    world.feedback.set(login.form().feedback());
}

#[when("the user signs out from the home screen")]
fn the_user_signs_out_from_the_home_screen(world: &SessionWorld) {
    let app = world.app();
    let ActiveScreen::Home(home) = app.screens.current() else {
        panic!("expected the home screen");
    };
    assert_eq!(world.runtime().block_on(home.sign_out()), Outcome::Discarded);
}

#[when("the identity provider ends the session")]
fn the_identity_provider_ends_the_session(world: &SessionWorld) {
    let app = world.app();
    app.identity.expire_session();
    app.sync_session();
}

#[when("the user requests a password reset for {email}")]
fn the_user_requests_a_password_reset(world: &SessionWorld, email: String) {
    let app = world.app();
    let ActiveScreen::Login(login) = app.screens.current() else {
        panic!("expected the login screen");
    };
    assert!(login.open_forgot_password());
    let ActiveScreen::ForgotPassword(forgot) = app.screens.current() else {
        panic!("expected the forgot password screen");
    };
    forgot
        .form()
        .replace(PasswordResetForm::new(unquote(&email)));
    assert_eq!(
        world.runtime().block_on(forgot.submit()),
        Outcome::Completed(())
    );
}

// -----------------------------------------------------------------------------
// Then Steps
// -----------------------------------------------------------------------------

#[then("the home screen is shown for {email}")]
fn the_home_screen_is_shown_for(world: &SessionWorld, email: String) {
    let app = world.app();
    assert_eq!(app.navigator.current(), Route::Home);
    let identity = app.session.current_identity().expect("signed in");
    assert_eq!(identity.email().as_ref(), unquote(&email));
}

#[then("the signup screen shows an error on {field}")]
fn the_signup_screen_shows_an_error_on(world: &SessionWorld, field: String) {
    let feedback = world.feedback.get().expect("feedback");
    assert!(feedback.field_errors.for_field(unquote(&field)).is_some());
    assert_eq!(world.app().navigator.current(), Route::Signup);
}

#[then("no account was created")]
fn no_account_was_created(world: &SessionWorld) {
    let app = world.app();
    assert_eq!(app.identity.account_count(), 0);
    assert!(app.session.current_identity().is_none());
}

#[then("the login screen shows a notice")]
fn the_login_screen_shows_a_notice(world: &SessionWorld) {
    let feedback = world.feedback.get().expect("feedback");
    assert!(feedback.notice.is_some());
    assert_eq!(world.app().navigator.current(), Route::Login);
}

#[then("the login screen is shown")]
fn the_login_screen_is_shown(world: &SessionWorld) {
    let app = world.app();
    assert_eq!(app.navigator.current(), Route::Login);
    assert_eq!(app.navigator.stack(), vec![Route::Login]);
}

#[then("the reachable screens are exactly Login, Signup and ForgotPassword")]
fn the_reachable_screens_are_exactly_the_auth_screens(world: &SessionWorld) {
    let reachable: HashSet<Screen> = world
        .app()
        .navigator
        .reachable()
        .iter()
        .copied()
        .collect();
    let expected = HashSet::from([Screen::Login, Screen::Signup, Screen::ForgotPassword]);
    assert_eq!(reachable, expected);
}

#[then("a reset was sent to {email}")]
fn a_reset_was_sent_to(world: &SessionWorld, email: String) {
    let resets = world.app().identity.password_resets();
    assert_eq!(resets.len(), 1);
    assert!(
        resets
            .iter()
            .all(|address| address.as_ref() == unquote(&email))
    );
}

// -----------------------------------------------------------------------------
// Scenario Bindings
// -----------------------------------------------------------------------------

#[scenario(
    path = "tests/features/session_navigation.feature",
    name = "Signing up with a matching confirmation signs the user in"
)]
fn signing_up_signs_the_user_in(world: SessionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/session_navigation.feature",
    name = "A mismatched confirmation never reaches the identity provider"
)]
fn mismatched_confirmation_never_reaches_the_provider(world: SessionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/session_navigation.feature",
    name = "Signing in with a wrong password shows a notice"
)]
fn wrong_password_shows_a_notice(world: SessionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/session_navigation.feature",
    name = "Signing out leaves only the authentication screens reachable"
)]
fn signing_out_leaves_only_auth_screens(world: SessionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/session_navigation.feature",
    name = "An ended session returns to the login screen"
)]
fn ended_session_returns_to_login(world: SessionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/session_navigation.feature",
    name = "Requesting a password reset returns to the login screen"
)]
fn password_reset_returns_to_login(world: SessionWorld) {
    let _ = world;
}
