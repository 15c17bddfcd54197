//! Headless application core of the Service Desk mobile client.
//!
//! - [`domain`]: entities, validation, the session store, the navigator, and
//!   the services implementing the driving ports.
//! - [`inbound`]: screen controllers holding view state.
//! - [`outbound`]: in-memory backends and local filesystem adapters.
//! - [`config`]: settings loaded through OrthoConfig.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::ClientSettings;
