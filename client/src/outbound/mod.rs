//! Outbound adapters implementing the driven ports.
//!
//! - **memory**: in-process identity provider, record store, profile store,
//!   and key-value store used by the demo binary and behaviour tests.
//! - **local**: device filesystem adapters (durable avatar copies and the
//!   local key-value file) built on `cap_std` directory handles.
//!
//! Adapters translate between port types and their storage. They contain no
//! business logic.

pub mod local;
pub mod memory;
