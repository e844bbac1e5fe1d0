#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The single source of truth for "what is currently selected".
//!
//! [`AppStore`] owns the mutable application state and exposes named, total
//! transitions over it; [`query`] maps that state to and from a shareable
//! URL query string. Decoding happens exactly once at initialization;
//! afterwards the sync is strictly one-directional (state to address bar),
//! with a last-written memo suppressing redundant writes.

pub mod query;
pub mod store;

pub use query::{QuerySync, decode, encode};
pub use store::AppStore;
