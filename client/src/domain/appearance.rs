//! Process-wide theme and locale.
//!
//! Controllers never reach into shared mutable state; they receive an
//! immutable [`AppearanceSnapshot`] plus a receiver for later changes.
//! Nothing here is persisted.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// Colour theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light backgrounds.
    #[default]
    Light,
    /// Dark backgrounds.
    Dark,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// UI language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Vietnamese.
    #[default]
    Vi,
    /// English.
    En,
}

impl Locale {
    /// The other locale.
    pub fn toggled(self) -> Self {
        match self {
            Self::Vi => Self::En,
            Self::En => Self::Vi,
        }
    }

    /// Language tag.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Vi => "vi",
            Self::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error returned when parsing an unsupported locale tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale {0:?}; expected \"vi\" or \"en\"")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vi" => Ok(Self::Vi),
            "en" => Ok(Self::En),
            other => Err(UnknownLocale(other.to_owned())),
        }
    }
}

/// Theme and locale at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AppearanceSnapshot {
    /// Light or dark.
    pub theme: Theme,
    /// Display language.
    pub locale: Locale,
}

/// Shared appearance state.
///
/// # Examples
/// ```
/// use client::domain::{Appearance, AppearanceSnapshot, Locale, Theme};
///
/// let appearance = Appearance::new(AppearanceSnapshot::default());
/// assert_eq!(appearance.toggle_locale().locale, Locale::En);
/// assert_eq!(appearance.snapshot().theme, Theme::Light);
/// ```
#[derive(Debug, Clone)]
pub struct Appearance {
    state: Arc<watch::Sender<AppearanceSnapshot>>,
}

impl Default for Appearance {
    fn default() -> Self {
        Self::new(AppearanceSnapshot::default())
    }
}

impl Appearance {
    /// Create the shared state from an initial snapshot.
    pub fn new(initial: AppearanceSnapshot) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state: Arc::new(state),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> AppearanceSnapshot {
        *self.state.borrow()
    }

    /// Receiver notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<AppearanceSnapshot> {
        self.state.subscribe()
    }

    /// Switch between light and dark; returns the new snapshot.
    pub fn toggle_theme(&self) -> AppearanceSnapshot {
        self.update(|snapshot| snapshot.theme = snapshot.theme.toggled())
    }

    /// Switch between Vietnamese and English; returns the new snapshot.
    pub fn toggle_locale(&self) -> AppearanceSnapshot {
        self.update(|snapshot| snapshot.locale = snapshot.locale.toggled())
    }

    fn update(&self, change: impl FnOnce(&mut AppearanceSnapshot)) -> AppearanceSnapshot {
        self.state.send_modify(change);
        let snapshot = self.snapshot();
        debug!(theme = ?snapshot.theme, locale = %snapshot.locale, "appearance changed");
        snapshot
    }
}
