//! Device filesystem adapters.
//!
//! Both adapters hold a `cap_std` directory handle opened once at start-up,
//! so every later file operation stays inside the application data
//! directory.

mod avatar_vault;
mod key_value_file;

pub use avatar_vault::DirAvatarVault;
pub use key_value_file::JsonFileKeyValueStore;
