//! chukka-core - Core library for Chukka
//!
//! This crate contains the shared models, the local SQLite store, and the
//! sync logic between that store and the remote tournament API, used by
//! every Chukka front-end.

pub mod api;
pub mod error;
pub mod models;
pub mod session;
pub mod store;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{EntityKind, LocalId, RemoteId};
