//! Session-gated navigator.
//!
//! The navigator exposes exactly one screen graph at a time, chosen from the
//! session state: a splash screen while the session is pending, the auth
//! screens when signed out, and the app screens when signed in. Graph changes
//! happen only when the session store notifies a change. Every transition
//! unmounts all mounted screens and resets the stack to the new graph's root,
//! so no screen-local state survives across the authentication boundary.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info};

use crate::domain::{ServiceId, SessionState, SessionStore, UserId};

/// Every screen the client can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Shown while the session is pending.
    Splash,
    /// Sign-in form.
    Login,
    /// Account creation form.
    Signup,
    /// Password reset request.
    ForgotPassword,
    /// Profile and service list.
    Home,
    /// New service form.
    AddService,
    /// One service.
    ServiceDetail,
    /// Edit form of one service.
    EditService,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Splash => "Splash",
            Self::Login => "Login",
            Self::Signup => "Signup",
            Self::ForgotPassword => "ForgotPassword",
            Self::Home => "Home",
            Self::AddService => "AddService",
            Self::ServiceDetail => "ServiceDetail",
            Self::EditService => "EditService",
        };
        f.write_str(name)
    }
}

/// The disjoint screen sets selected by the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenGraph {
    /// Shown while the identity provider has not reported.
    Splash,
    /// Shown without a session.
    Auth,
    /// Shown with a session.
    App,
}

impl ScreenGraph {
    /// Graph exposed for `state`.
    pub fn for_session(state: &SessionState) -> Self {
        match state {
            SessionState::Pending => Self::Splash,
            SessionState::SignedOut => Self::Auth,
            SessionState::SignedIn(_) => Self::App,
        }
    }

    /// Screens reachable inside this graph.
    pub fn screens(self) -> &'static [Screen] {
        match self {
            Self::Splash => &[Screen::Splash],
            Self::Auth => &[Screen::Login, Screen::Signup, Screen::ForgotPassword],
            Self::App => &[
                Screen::Home,
                Screen::AddService,
                Screen::ServiceDetail,
                Screen::EditService,
            ],
        }
    }

    /// Route every stack in this graph starts from.
    pub fn root(self) -> Route {
        match self {
            Self::Splash => Route::Splash,
            Self::Auth => Route::Login,
            Self::App => Route::Home,
        }
    }

    /// True when `screen` belongs to this graph.
    pub fn contains(self, screen: Screen) -> bool {
        self.screens().contains(&screen)
    }
}

impl fmt::Display for ScreenGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Splash => "splash",
            Self::Auth => "auth",
            Self::App => "app",
        };
        f.write_str(name)
    }
}

/// A screen plus the parameters it needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// [`Screen::Splash`].
    Splash,
    /// [`Screen::Login`].
    Login,
    /// [`Screen::Signup`].
    Signup,
    /// [`Screen::ForgotPassword`].
    ForgotPassword,
    /// [`Screen::Home`].
    Home,
    /// [`Screen::AddService`].
    AddService,
    /// Detail of the given service.
    ServiceDetail(ServiceId),
    /// Edit form of the given service.
    EditService(ServiceId),
}

impl Route {
    /// Screen shown by this route.
    pub fn screen(&self) -> Screen {
        match self {
            Self::Splash => Screen::Splash,
            Self::Login => Screen::Login,
            Self::Signup => Screen::Signup,
            Self::ForgotPassword => Screen::ForgotPassword,
            Self::Home => Screen::Home,
            Self::AddService => Screen::AddService,
            Self::ServiceDetail(_) => Screen::ServiceDetail,
            Self::EditService(_) => Screen::EditService,
        }
    }
}

/// Tells an asynchronous completion whether its screen is still shown.
///
/// Every stack entry owns one handle. Popping the entry or resetting the
/// stack flips it to unmounted for good.
#[derive(Debug, Clone)]
pub struct MountHandle(Arc<AtomicBool>);

impl MountHandle {
    fn mounted() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// True while the owning screen is on the stack.
    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn unmount(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Errors returned by [`Navigator::navigate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// The screen belongs to a graph that is not currently exposed.
    #[error("{screen} is not reachable from the {graph} screens")]
    Unreachable { screen: Screen, graph: ScreenGraph },
}

#[derive(Debug)]
struct StackEntry {
    route: Route,
    mount: MountHandle,
}

impl StackEntry {
    fn new(route: Route) -> Self {
        Self {
            route,
            mount: MountHandle::mounted(),
        }
    }
}

#[derive(Debug)]
struct NavigatorState {
    graph: ScreenGraph,
    owner: Option<UserId>,
    root: StackEntry,
    above: Vec<StackEntry>,
    session: watch::Receiver<SessionState>,
}

impl NavigatorState {
    fn refresh(&mut self) -> bool {
        // A closed channel keeps the last exposed graph.
        if !self.session.has_changed().unwrap_or(false) {
            return false;
        }
        let state = self.session.borrow_and_update().clone();
        self.sync(&state)
    }

    fn sync(&mut self, state: &SessionState) -> bool {
        let graph = ScreenGraph::for_session(state);
        let owner = state.identity().map(|identity| identity.user_id().clone());
        if graph == self.graph && owner == self.owner {
            return false;
        }
        info!(from = %self.graph, to = %graph, "session change resets navigation");
        for entry in self.above.drain(..) {
            entry.mount.unmount();
        }
        self.root.mount.unmount();
        self.graph = graph;
        self.owner = owner;
        self.root = StackEntry::new(graph.root());
        true
    }

    fn top(&self) -> &StackEntry {
        self.above.last().unwrap_or(&self.root)
    }

    fn depth(&self) -> usize {
        self.above.len() + 1
    }
}

/// Shared handle onto the navigation stack.
///
/// Clones observe and mutate the same stack. Pending session notifications
/// are applied before every read or mutation, and [`Navigator::follow`]
/// applies them as they arrive.
#[derive(Debug, Clone)]
pub struct Navigator {
    state: Arc<Mutex<NavigatorState>>,
    session: SessionStore,
}

impl Navigator {
    /// Create a navigator exposing the graph for the current session state.
    pub fn new(session: &SessionStore) -> Self {
        let mut receiver = session.subscribe();
        let current = receiver.borrow_and_update().clone();
        let graph = ScreenGraph::for_session(&current);
        let state = NavigatorState {
            graph,
            owner: current.identity().map(|identity| identity.user_id().clone()),
            root: StackEntry::new(graph.root()),
            above: Vec::new(),
            session: receiver,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            session: session.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, NavigatorState> {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        guard.refresh();
        guard
    }

    /// Apply any pending session notification. Returns `true` on a graph reset.
    pub fn refresh(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .refresh()
    }

    /// Apply session notifications as they arrive. Runs until the session
    /// store is dropped.
    pub async fn follow(&self) {
        let mut changes = self.session.subscribe();
        loop {
            self.refresh();
            if changes.changed().await.is_err() {
                break;
            }
        }
    }

    /// Currently exposed graph.
    pub fn graph(&self) -> ScreenGraph {
        self.lock().graph
    }

    /// Screens reachable right now.
    pub fn reachable(&self) -> &'static [Screen] {
        self.graph().screens()
    }

    /// Route on top of the stack.
    pub fn current(&self) -> Route {
        self.lock().top().route.clone()
    }

    /// Mount handle of the route on top of the stack.
    pub fn current_mount(&self) -> MountHandle {
        self.lock().top().mount.clone()
    }

    /// Routes on the stack, root first.
    pub fn stack(&self) -> Vec<Route> {
        let state = self.lock();
        std::iter::once(&state.root)
            .chain(state.above.iter())
            .map(|entry| entry.route.clone())
            .collect()
    }

    /// Show `route`.
    ///
    /// When the same route is already on the stack the navigator returns to
    /// it, unmounting the entries above; otherwise the route is pushed.
    pub fn navigate(&self, route: Route) -> Result<MountHandle, NavigationError> {
        let mut state = self.lock();
        let screen = route.screen();
        if !state.graph.contains(screen) {
            return Err(NavigationError::Unreachable {
                screen,
                graph: state.graph,
            });
        }

        if state.root.route == route {
            for entry in state.above.drain(..) {
                entry.mount.unmount();
            }
        } else if let Some(position) = state.above.iter().position(|entry| entry.route == route) {
            for entry in state.above.drain(position + 1..) {
                entry.mount.unmount();
            }
        } else {
            state.above.push(StackEntry::new(route));
        }
        let top = state.top();
        debug!(screen = %top.route.screen(), depth = state.depth(), "navigated");
        Ok(top.mount.clone())
    }

    /// Pop the top route. The root is never popped.
    pub fn go_back(&self) -> bool {
        let mut state = self.lock();
        let Some(entry) = state.above.pop() else {
            return false;
        };
        entry.mount.unmount();
        debug!(screen = %entry.route.screen(), "popped");
        true
    }
}

#[cfg(test)]
#[path = "navigation_tests.rs"]
mod tests;
