//! Storage port — the durable home shared by every process.

use std::future::Future;
use std::sync::Arc;

use domotica_domain::error::DomoticaError;
use domotica_domain::home::Home;

/// Owns the canonical in-memory [`Home`] and its durable mirror.
///
/// Several processes may hold a store over the same backing medium. The only
/// synchronization between them is [`reload`](Self::reload) before acting and
/// an atomic whole-state [`save`](Self::save) after; two processes mutating
/// inside the same window overwrite each other, last writer wins.
pub trait HomeStore {
    /// Read the persisted home, seeding and persisting the default home when
    /// nothing has been stored yet.
    ///
    /// Returns [`DomoticaError::CorruptState`] when the persisted data cannot
    /// be turned into a valid home.
    fn load(&self) -> impl Future<Output = Result<Home, DomoticaError>> + Send;

    /// Re-read the persisted home, replacing the in-process view.
    fn reload(&self) -> impl Future<Output = Result<Home, DomoticaError>> + Send;

    /// Persist `home` in one atomic replacement; the in-process view is
    /// updated only once the write succeeded.
    fn save(&self, home: &Home) -> impl Future<Output = Result<(), DomoticaError>> + Send;

    /// Copy of the in-process view as of the last load, reload or save.
    fn snapshot(&self) -> Home;
}

impl<T: HomeStore + Send + Sync> HomeStore for Arc<T> {
    fn load(&self) -> impl Future<Output = Result<Home, DomoticaError>> + Send {
        (**self).load()
    }

    fn reload(&self) -> impl Future<Output = Result<Home, DomoticaError>> + Send {
        (**self).reload()
    }

    fn save(&self, home: &Home) -> impl Future<Output = Result<(), DomoticaError>> + Send {
        (**self).save(home)
    }

    fn snapshot(&self) -> Home {
        (**self).snapshot()
    }
}
