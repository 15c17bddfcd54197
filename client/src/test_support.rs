//! Test utilities for the client crate.
//!
//! Shared by unit tests in `src/` and behaviour suites in `tests/`. Wires the
//! in-memory adapters and a temporary data directory behind the real domain
//! services so scenarios drive the screen controllers end to end.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use cap_std::{ambient_authority, fs::Dir};
use tempfile::TempDir;

use crate::domain::ports::IdentityProvider;
use crate::domain::{
    Appearance, AuthService, Navigator, ProfilePorts, ProfileService, ServiceCatalogService,
    SessionStore,
};
use crate::inbound::screens::{ScreenPorts, Screens};
use crate::outbound::local::DirAvatarVault;
use crate::outbound::memory::{
    InMemoryIdentityProvider, InMemoryKeyValueStore, InMemoryProfileStore, InMemoryRecordStore,
};

/// Remote call timeout used by [`TestApp`].
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A fully wired client over in-memory backends.
///
/// The backends are exposed so scenarios can inspect writes or simulate
/// outages.
pub struct TestApp {
    /// Session state shared by every service.
    pub session: SessionStore,
    /// Navigator following `session`.
    pub navigator: Navigator,
    /// Theme and locale.
    pub appearance: Appearance,
    /// Identity provider backing the auth service.
    pub identity: Arc<InMemoryIdentityProvider>,
    /// Record store backing the catalogue.
    pub records: Arc<InMemoryRecordStore>,
    /// Profile documents.
    pub profiles: Arc<InMemoryProfileStore>,
    /// Device-local key-value storage.
    pub device: Arc<InMemoryKeyValueStore>,
    /// Driving ports backed by the services above.
    pub ports: ScreenPorts,
    /// Controller factory sharing `navigator` and `appearance`.
    pub screens: Screens,
    data_dir: TempDir,
}

impl TestApp {
    /// Wire a signed-out client.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the temporary data directory cannot be
    /// created.
    pub fn new() -> io::Result<Self> {
        let data_dir = tempfile::tempdir()?;
        let avatars = DirAvatarVault::open(data_dir.path().join("avatars"))
            .map_err(|err| io::Error::other(err.to_string()))?;

        let session = SessionStore::new();
        let identity = Arc::new(InMemoryIdentityProvider::new());
        let records = Arc::new(InMemoryRecordStore::new());
        let profiles = Arc::new(InMemoryProfileStore::new());
        let device = Arc::new(InMemoryKeyValueStore::new());

        let ports = ScreenPorts {
            auth: Arc::new(AuthService::new(
                Arc::clone(&identity),
                session.clone(),
                TEST_TIMEOUT,
            )),
            catalogue: Arc::new(ServiceCatalogService::new(
                Arc::clone(&records),
                session.clone(),
                TEST_TIMEOUT,
            )),
            profile: Arc::new(ProfileService::new(
                ProfilePorts {
                    documents: profiles.clone(),
                    device: device.clone(),
                    avatars: Arc::new(avatars),
                },
                session.clone(),
                TEST_TIMEOUT,
            )),
        };

        let navigator = Navigator::new(&session);
        let appearance = Appearance::default();
        let app = Self {
            screens: Screens::new(navigator.clone(), appearance.clone(), ports.clone()),
            ports,
            navigator,
            appearance,
            session,
            identity,
            records,
            profiles,
            device,
            data_dir,
        };
        app.sync_session();
        Ok(app)
    }

    /// Apply the provider's current session to the session store.
    pub fn sync_session(&self) {
        self.session.apply(self.identity.current_identity());
    }

    /// Temporary data directory.
    pub fn data_dir(&self) -> &Path {
        self.data_dir.path()
    }

    /// Write an image as an image picker would and return its path.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be written.
    pub fn picked_image(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let dir = Dir::open_ambient_dir(self.data_dir.path(), ambient_authority())?;
        dir.write(name, bytes)?;
        Ok(self.data_dir.path().join(name))
    }
}
