//! Unit of work — reload, validate, mutate, save.

use domotica_domain::error::DomoticaError;
use domotica_domain::home::Home;
use tokio::sync::Mutex;

use crate::ports::HomeStore;

/// Runs each operation against a freshly reloaded home and persists the
/// result, serializing operations issued from the same process.
///
/// Mutations are applied to a working copy. If validation or the save fails
/// the copy is dropped, so neither the store's view nor the backing medium
/// sees a partial change.
pub struct UnitOfWork<S> {
    store: S,
    gate: Mutex<()>,
}

impl<S: HomeStore> UnitOfWork<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            gate: Mutex::new(()),
        }
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reload and run a query.
    ///
    /// # Errors
    ///
    /// Propagates reload failures and whatever `query` returns.
    pub async fn read<T, F>(&self, query: F) -> Result<T, DomoticaError>
    where
        F: FnOnce(&Home) -> Result<T, DomoticaError>,
    {
        let _guard = self.gate.lock().await;
        let home = self.store.reload().await?;
        query(&home)
    }

    /// Reload, apply `change` to a working copy, re-check every invariant and
    /// save.
    ///
    /// # Errors
    ///
    /// Propagates reload failures, whatever `change` returns, invariant
    /// violations left behind by `change`, and save failures.
    pub async fn write<T, F>(&self, change: F) -> Result<T, DomoticaError>
    where
        F: FnOnce(&mut Home) -> Result<T, DomoticaError>,
    {
        let _guard = self.gate.lock().await;
        let mut home = self.store.reload().await?;
        let output = change(&mut home)?;
        home.validate()?;
        self.store.save(&home).await?;
        Ok(output)
    }
}
