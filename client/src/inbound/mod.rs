//! Inbound adapters that turn user intent into domain service calls.
//!
//! The client has no UI toolkit; [`screens`] holds one controller per screen
//! with the view state a renderer would draw.

pub mod screens;
