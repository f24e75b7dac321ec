//! # domotica-adapter-storage-json
//!
//! Persistence adapter keeping the whole home in one JSON file.
//!
//! ## Responsibilities
//! - Implement the `HomeStore` port defined in `domotica-app::ports`
//! - Seed the default home when the file does not exist yet
//! - Replace the file atomically (temporary file, fsync, rename) on save
//! - Map between the domain [`Home`](domotica_domain::home::Home) and the
//!   on-disk document
//!
//! Several processes may open the same file. Nothing locks it: each
//! operation reloads before acting, and concurrent writers overwrite each
//! other.
//!
//! ## Dependency rule
//! Depends on `domotica-app` (for the port trait) and `domotica-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod document;
pub mod error;
pub mod store;

pub use store::{Config, JsonFileStore};
