//! Domain primitives, services, and ports.
//!
//! Purpose: hold everything the screens depend on without naming a concrete
//! backend. Entities validate on construction, services implement the
//! driving ports, and driven ports describe the identity provider, the
//! record and profile stores, device storage, and the avatar vault.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — failure with a stable code.
//! - SessionStore — authoritative session state with a pending phase.
//! - Navigator — session-gated route stack.
//! - AuthService, ServiceCatalogService, ProfileService — driving port
//!   implementations.

pub mod appearance;
pub mod auth;
pub mod auth_service;
pub mod deadline;
pub mod error;
pub mod identity;
pub mod navigation;
pub mod ports;
pub mod profile;
pub mod profile_service;
pub mod service;
pub mod service_catalog;
pub mod service_list;
pub mod session;
pub mod submission;
pub mod validation;

pub use self::appearance::{Appearance, AppearanceSnapshot, Locale, Theme, UnknownLocale};
pub use self::auth::{Credentials, PasswordResetForm, SignInForm, SignUpForm};
pub use self::auth_service::AuthService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, Presentation};
pub use self::identity::{EmailAddress, Identity, IdentityValidationError, UserId};
pub use self::navigation::{
    MountHandle, NavigationError, Navigator, Route, Screen, ScreenGraph,
};
pub use self::profile::{Age, AvatarUri, Gender, Profile, ProfileForm, ProfileValidationError};
pub use self::profile_service::{ProfilePorts, ProfileService};
pub use self::service::{
    Price, ServiceDraft, ServiceForm, ServiceId, ServiceRecord, ServiceValidationError,
};
pub use self::service_catalog::ServiceCatalogService;
pub use self::service_list::{
    ServiceListDiff, ServiceListSnapshot, ServiceListState, ServiceListSubscription,
};
pub use self::session::{SessionState, SessionStore};
pub use self::submission::{SubmissionGuard, SubmissionTicket};
pub use self::validation::{FieldError, FieldErrorKind, ValidationErrors};

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use client::domain::{DomainResult, Error};
///
/// fn lookup() -> DomainResult<()> {
///     Err(Error::not_found("service s1 not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
