//! In-memory [`HomeStore`] shared by the service tests.

use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use domotica_domain::error::DomoticaError;
use domotica_domain::home::Home;

use crate::ports::HomeStore;

/// Keeps a "persisted" home standing in for the backing file, plus the
/// in-process view a real store would cache.
pub(crate) struct InMemoryHomeStore {
    persisted: Mutex<Option<Home>>,
    view: Mutex<Home>,
    saves: AtomicUsize,
    fail_next_save: AtomicBool,
}

impl Default for InMemoryHomeStore {
    fn default() -> Self {
        Self::with_home(Home::with_defaults())
    }
}

impl InMemoryHomeStore {
    pub(crate) fn with_home(home: Home) -> Self {
        Self {
            persisted: Mutex::new(Some(home.clone())),
            view: Mutex::new(home),
            saves: AtomicUsize::new(0),
            fail_next_save: AtomicBool::new(false),
        }
    }

    pub(crate) fn persisted(&self) -> Home {
        self.persisted.lock().unwrap().clone().unwrap_or_default()
    }

    pub(crate) fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_next_save(&self) {
        self.fail_next_save.store(true, Ordering::SeqCst);
    }

    /// Replace the persisted home as another process would.
    pub(crate) fn write_externally(&self, home: Home) {
        *self.persisted.lock().unwrap() = Some(home);
    }

    fn read_persisted(&self) -> Home {
        let mut persisted = self.persisted.lock().unwrap();
        let home = persisted.get_or_insert_with(Home::with_defaults).clone();
        *self.view.lock().unwrap() = home.clone();
        home
    }
}

impl HomeStore for InMemoryHomeStore {
    fn load(&self) -> impl Future<Output = Result<Home, DomoticaError>> + Send {
        let home = self.read_persisted();
        async { Ok(home) }
    }

    fn reload(&self) -> impl Future<Output = Result<Home, DomoticaError>> + Send {
        let home = self.read_persisted();
        async { Ok(home) }
    }

    fn save(&self, home: &Home) -> impl Future<Output = Result<(), DomoticaError>> + Send {
        let result = if self.fail_next_save.swap(false, Ordering::SeqCst) {
            Err(DomoticaError::Storage("disk full".into()))
        } else {
            *self.persisted.lock().unwrap() = Some(home.clone());
            *self.view.lock().unwrap() = home.clone();
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };
        async { result }
    }

    fn snapshot(&self) -> Home {
        self.view.lock().unwrap().clone()
    }
}
