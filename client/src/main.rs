//! Demo entry-point: wires the client core over in-memory backends and walks
//! through the main flows via the screen controllers.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{Context, Report, Result, eyre};
use ortho_config::OrthoConfig as _;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use client::ClientSettings;
use client::domain::ports::IdentityProvider;
use client::domain::{
    Appearance, AuthService, Navigator, ProfilePorts, ProfileService, Route, ServiceCatalogService,
    SessionStore, SignUpForm,
};
use client::inbound::screens::{ActiveScreen, HomeScreen, Outcome, ScreenPorts, Screens};
use client::outbound::local::{DirAvatarVault, JsonFileKeyValueStore};
use client::outbound::memory::{
    InMemoryIdentityProvider, InMemoryProfileStore, InMemoryRecordStore,
};

const DEMO_EMAIL: &str = "new@test.com";
const DEMO_PASSWORD: &str = "abc123";
const LIST_WAIT: Duration = Duration::from_secs(2);

/// Controller of the current route, or an error naming the route found.
macro_rules! current_screen {
    ($screens:expr, $variant:ident) => {
        match $screens.current() {
            ActiveScreen::$variant(screen) => screen,
            _ => {
                return Err(eyre!(
                    "expected the {} screen, found {:?}",
                    stringify!($variant),
                    $screens.navigator().current()
                ));
            }
        }
    };
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = fmt()
        .with_env_filter(filter)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        ClientSettings::load().map_err(|err| eyre!("failed to load client settings: {err}"))?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build client runtime")?;
    runtime.block_on(run(settings))
}

async fn run(settings: ClientSettings) -> Result<()> {
    let timeout = settings.store_timeout();
    let appearance = Appearance::new(settings.appearance()?);
    let data_dir = settings.data_dir();
    let avatars = DirAvatarVault::open(data_dir.join("avatars"))
        .map_err(|err| Report::new(err).wrap_err("failed to open avatar directory"))?;
    let device = JsonFileKeyValueStore::open(&data_dir)
        .map_err(|err| Report::new(err).wrap_err("failed to open local state"))?;

    let session = SessionStore::new();
    let identity = Arc::new(InMemoryIdentityProvider::new());
    let ports = ScreenPorts {
        auth: Arc::new(AuthService::new(
            Arc::clone(&identity),
            session.clone(),
            timeout,
        )),
        catalogue: Arc::new(ServiceCatalogService::new(
            Arc::new(InMemoryRecordStore::new()),
            session.clone(),
            timeout,
        )),
        profile: Arc::new(ProfileService::new(
            ProfilePorts {
                documents: Arc::new(InMemoryProfileStore::new()),
                device: Arc::new(device),
                avatars: Arc::new(avatars),
            },
            session.clone(),
            timeout,
        )),
    };

    let navigator = Navigator::new(&session);
    tokio::spawn({
        let session = session.clone();
        let events = identity.session_events();
        async move { session.follow(events).await }
    });
    tokio::spawn({
        let navigator = navigator.clone();
        async move { navigator.follow().await }
    });
    log_state("start", &navigator);

    session
        .subscribe()
        .wait_for(|state| !state.is_pending())
        .await
        .wrap_err("session store closed while pending")?;
    log_state("session resolved", &navigator);

    let screens = Screens::new(navigator, appearance, ports);
    walkthrough(&screens).await
}

fn log_state(step: &str, navigator: &Navigator) {
    info!(
        step,
        graph = %navigator.graph(),
        route = ?navigator.current(),
        depth = navigator.stack().len(),
        "navigator state"
    );
}

fn completed<T>(step: &str, outcome: Outcome<T>) -> Result<T> {
    match outcome {
        Outcome::Completed(value) => Ok(value),
        Outcome::Failed(code) => Err(eyre!("{step} failed with {code:?}")),
        Outcome::Busy => Err(eyre!("{step} was already running")),
        Outcome::Discarded => Err(eyre!("{step} finished after its screen closed")),
    }
}

fn expect_route(screens: &Screens, step: &str, route: &Route) -> Result<()> {
    let current = screens.navigator().current();
    log_state(step, screens.navigator());
    if current == *route {
        Ok(())
    } else {
        Err(eyre!("{step}: expected {route:?}, found {current:?}"))
    }
}

async fn walkthrough(screens: &Screens) -> Result<()> {
    let login = current_screen!(screens, Login);
    login.open_signup();

    let signup = current_screen!(screens, Signup);
    signup
        .form()
        .replace(SignUpForm::new(DEMO_EMAIL, DEMO_PASSWORD, DEMO_PASSWORD));
    let outcome = signup.submit().await;
    info!(?outcome, "sign up submitted");
    expect_route(screens, "signed up", &Route::Home)?;

    let home = current_screen!(screens, Home);
    completed("load profile", home.load_profile().await)?;
    home.profile().edit(|form| {
        form.full_name = "Lan".to_owned();
        form.age = "30".to_owned();
        form.gender = "Nữ".to_owned();
    });
    let profile = completed("save profile", home.save_profile().await)?;
    info!(full_name = ?profile.full_name, age = ?profile.age, "profile saved");
    completed("mount service list", home.mount_list().await)?;

    home.open_add_service();
    let add = current_screen!(screens, AddService);
    add.form().edit(|form| {
        form.name = "Haircut".to_owned();
        form.description = "Basic cut".to_owned();
        form.price = "25".to_owned();
    });
    let id = completed("add service", add.submit().await)?;
    expect_route(screens, "service added", &Route::Home)?;
    wait_for_services(&home, 1).await?;

    home.open_service(&id);
    let detail = current_screen!(screens, ServiceDetail);
    completed("load service", detail.load().await)?;
    detail.edit();
    let edit = current_screen!(screens, EditService);
    completed("prefill edit form", edit.load().await)?;
    edit.form().edit(|form| {
        form.description = "Basic cut + wash".to_owned();
        form.price = "30".to_owned();
    });
    completed("update service", edit.submit().await)?;
    expect_route(screens, "service updated", &Route::ServiceDetail(id.clone()))?;
    let record = completed("reload service", detail.load().await)?;
    info!(
        name = record.name(),
        description = record.description(),
        price = %record.price(),
        "service detail"
    );

    completed("delete service", detail.delete().await)?;
    expect_route(screens, "service deleted", &Route::Home)?;
    wait_for_services(&home, 0).await?;

    let outcome = home.sign_out().await;
    info!(?outcome, "sign out submitted");
    expect_route(screens, "signed out", &Route::Login)?;
    info!(reachable = ?screens.navigator().reachable(), "walkthrough complete");
    Ok(())
}

async fn wait_for_services(home: &HomeScreen, expected: usize) -> Result<()> {
    while !home.is_list_loaded() || home.services().len() != expected {
        let diff = tokio::time::timeout(LIST_WAIT, home.next_update())
            .await
            .wrap_err("service list did not update in time")?
            .ok_or_else(|| eyre!("service list closed"))?;
        info!(
            added = diff.added.len(),
            updated = diff.updated.len(),
            removed = diff.removed.len(),
            "service list updated"
        );
    }
    Ok(())
}
