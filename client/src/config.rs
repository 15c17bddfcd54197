//! Client settings loaded via OrthoConfig.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{AppearanceSnapshot, Locale, Theme, UnknownLocale};

const DEFAULT_DATA_DIR: &str = ".service-desk";

/// Settings layered from command-line arguments, `SERVICE_DESK_*`
/// environment variables, and an optional configuration file.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SERVICE_DESK")]
pub struct ClientSettings {
    /// Upper bound for every remote call, in milliseconds.
    #[ortho_config(default = 10_000)]
    pub store_timeout_ms: u64,
    /// Locale tag shown at start-up (`vi` or `en`).
    pub default_locale: Option<String>,
    /// Start with the dark theme.
    #[ortho_config(default = false)]
    pub dark_mode: bool,
    /// Directory holding avatar copies and device-local state.
    pub data_dir: Option<PathBuf>,
}

impl ClientSettings {
    /// Remote call timeout.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Configured locale, falling back to Vietnamese.
    pub fn locale(&self) -> Result<Locale, UnknownLocale> {
        self.default_locale
            .as_deref()
            .map_or(Ok(Locale::default()), str::parse)
    }

    /// Initial appearance derived from the locale and theme settings.
    pub fn appearance(&self) -> Result<AppearanceSnapshot, UnknownLocale> {
        let theme = if self.dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        };
        Ok(AppearanceSnapshot {
            theme,
            locale: self.locale()?,
        })
    }

    /// Data directory, falling back to `./.service-desk`.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for client settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 4] = [
        "SERVICE_DESK_STORE_TIMEOUT_MS",
        "SERVICE_DESK_DEFAULT_LOCALE",
        "SERVICE_DESK_DARK_MODE",
        "SERVICE_DESK_DATA_DIR",
    ];

    fn load_from_empty_args() -> ClientSettings {
        ClientSettings::load_from_iter([OsString::from("service-desk-demo")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.store_timeout(), Duration::from_secs(10));
        assert_eq!(settings.locale(), Ok(Locale::Vi));
        assert_eq!(
            settings.appearance(),
            Ok(AppearanceSnapshot {
                theme: Theme::Light,
                locale: Locale::Vi,
            })
        );
        assert_eq!(settings.data_dir(), PathBuf::from(DEFAULT_DATA_DIR));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("SERVICE_DESK_STORE_TIMEOUT_MS", Some("2500".to_owned())),
            ("SERVICE_DESK_DEFAULT_LOCALE", Some("en".to_owned())),
            ("SERVICE_DESK_DARK_MODE", Some("true".to_owned())),
            ("SERVICE_DESK_DATA_DIR", Some("/tmp/service-desk".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.store_timeout(), Duration::from_millis(2500));
        assert_eq!(
            settings.appearance(),
            Ok(AppearanceSnapshot {
                theme: Theme::Dark,
                locale: Locale::En,
            })
        );
        assert_eq!(settings.data_dir(), PathBuf::from("/tmp/service-desk"));
    }

    #[rstest]
    fn unknown_locale_is_reported() {
        let _guard = lock_env([
            ("SERVICE_DESK_STORE_TIMEOUT_MS", None::<String>),
            ("SERVICE_DESK_DEFAULT_LOCALE", Some("fr".to_owned())),
            ("SERVICE_DESK_DARK_MODE", None::<String>),
            ("SERVICE_DESK_DATA_DIR", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.locale(), Err(UnknownLocale("fr".to_owned())));
    }
}
