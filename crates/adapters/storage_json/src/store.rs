//! JSON file implementation of [`HomeStore`].

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use domotica_app::ports::HomeStore;
use domotica_domain::error::DomoticaError;
use domotica_domain::home::Home;
use domotica_domain::time;
use tokio::io::AsyncWriteExt;

use crate::document::HomeDocument;
use crate::error::StorageError;

/// Per-write suffix for temporary files, shared by every store in the process.
static NEXT_TEMP: AtomicU64 = AtomicU64::new(0);

/// Configuration for the JSON file storage adapter.
pub struct Config {
    /// Location of the backing file (e.g. `domotica_data.json`).
    pub path: PathBuf,
}

impl Config {
    /// Build a [`JsonFileStore`] from this configuration and load it.
    ///
    /// Creates the backing file with the default home if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::CorruptState`] if the file cannot be turned
    /// into a valid home, or [`DomoticaError::Storage`] on I/O failure.
    pub async fn build(self) -> Result<JsonFileStore, DomoticaError> {
        let store = JsonFileStore {
            path: self.path,
            view: Mutex::new(Home::new()),
        };
        store.read_or_seed().await?;
        Ok(store)
    }
}

/// Keeps the whole home in one JSON file, replaced atomically on save.
pub struct JsonFileStore {
    path: PathBuf,
    view: Mutex<Home>,
}

impl JsonFileStore {
    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn set_view(&self, home: Home) {
        *self.view.lock().unwrap_or_else(PoisonError::into_inner) = home;
    }

    async fn read_or_seed(&self) -> Result<Home, DomoticaError> {
        let home = match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let document: HomeDocument =
                    serde_json::from_slice(&bytes).map_err(StorageError::Decode)?;
                document.into_home().inspect_err(|err| {
                    tracing::warn!(path = %self.path.display(), error = %err, "corrupt home file");
                })?
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                let home = Home::with_defaults();
                self.write_atomically(&home).await?;
                tracing::info!(path = %self.path.display(), "seeded default home");
                home
            }
            Err(err) => return Err(StorageError::Io(err).into()),
        };
        self.set_view(home.clone());
        Ok(home)
    }

    /// Write `home` to a temporary file next to the target, flush it to disk
    /// and rename it over the target.
    async fn write_atomically(&self, home: &Home) -> Result<(), StorageError> {
        let document = HomeDocument::from_home(home, time::now());
        let bytes = serde_json::to_vec_pretty(&document).map_err(StorageError::Encode)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let temp = self.temp_path();
        if let Err(err) = write_synced(&temp, &bytes).await {
            discard_temp(&temp).await;
            return Err(err.into());
        }
        if let Err(err) = tokio::fs::rename(&temp, &self.path).await {
            discard_temp(&temp).await;
            return Err(err.into());
        }
        Ok(())
    }

    /// Sibling of the target, unique per write: the process id keeps other
    /// processes apart and the counter keeps writes within this one apart.
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(|| "home".into(), |name| name.to_string_lossy());
        let seq = NEXT_TEMP.fetch_add(1, Ordering::Relaxed);
        self.path
            .with_file_name(format!(".{name}.{}.{seq}.tmp", std::process::id()))
    }
}

async fn discard_temp(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to remove temporary file");
        }
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

impl HomeStore for JsonFileStore {
    fn load(&self) -> impl Future<Output = Result<Home, DomoticaError>> + Send {
        self.read_or_seed()
    }

    fn reload(&self) -> impl Future<Output = Result<Home, DomoticaError>> + Send {
        async move {
            let home = self.read_or_seed().await?;
            tracing::debug!(
                rooms = home.room_count(),
                devices = home.device_count(),
                "home reloaded"
            );
            Ok(home)
        }
    }

    fn save(&self, home: &Home) -> impl Future<Output = Result<(), DomoticaError>> + Send {
        let home = home.clone();
        async move {
            self.write_atomically(&home).await?;
            tracing::debug!(path = %self.path.display(), "home saved");
            self.set_view(home);
            Ok(())
        }
    }

    fn snapshot(&self) -> Home {
        self.view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domotica_domain::device::{DeviceKind, DeviceState, LightState};
    use domotica_domain::id::DeviceId;
    use domotica_domain::room::RoomKind;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::task::JoinSet;

    async fn setup(dir: &TempDir) -> JsonFileStore {
        Config {
            path: dir.path().join("domotica_data.json"),
        }
        .build()
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn should_seed_default_home_when_file_is_missing() {
        let dir = TempDir::new().unwrap();
        let store = setup(&dir).await;

        assert!(store.path().exists());
        assert_eq!(store.snapshot(), Home::with_defaults());
        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(raw["rooms"][0]["name"], "living");
    }

    #[tokio::test]
    async fn should_create_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = Config {
            path: dir.path().join("nested").join("home.json"),
        }
        .build()
        .await
        .unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn should_reproduce_saved_home_on_load() {
        let dir = TempDir::new().unwrap();
        let store = setup(&dir).await;
        let mut home = store.snapshot();
        let kitchen = home.insert_room(RoomKind::Kitchen, "cocina");
        home.insert_device(&kitchen, DeviceState::default_for(DeviceKind::Oven));
        store.save(&home).await.unwrap();

        let other = setup(&dir).await;

        assert_eq!(other.snapshot(), home);
        assert_eq!(store.snapshot(), home);
    }

    #[tokio::test]
    async fn should_leave_no_temporary_file_behind() {
        let dir = TempDir::new().unwrap();
        let store = setup(&dir).await;
        store.save(&store.snapshot()).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("domotica_data.json")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn should_not_collide_when_saving_concurrently() {
        let dir = TempDir::new().unwrap();
        let first = Arc::new(setup(&dir).await);
        let second = Arc::new(setup(&dir).await);
        let home = first.snapshot();

        let mut saves = JoinSet::new();
        for i in 0..100 {
            let store = if i % 2 == 0 {
                Arc::clone(&first)
            } else {
                Arc::clone(&second)
            };
            let home = home.clone();
            saves.spawn(async move { store.save(&home).await });
        }
        while let Some(result) = saves.join_next().await {
            assert!(result.unwrap().is_ok());
        }

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("domotica_data.json")]);
        assert_eq!(setup(&dir).await.snapshot(), home);
    }

    #[tokio::test]
    async fn should_use_fresh_temporary_name_per_write() {
        let dir = TempDir::new().unwrap();
        let store = setup(&dir).await;
        assert_ne!(store.temp_path(), store.temp_path());
    }

    #[tokio::test]
    async fn should_report_id_at_end_of_sequence_as_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("domotica_data.json");
        std::fs::write(
            &path,
            r#"{
                "rooms": [
                    {"id": "room-4294967295", "name": "living", "type": "living", "device_ids": []}
                ],
                "devices": []
            }"#,
        )
        .unwrap();

        let result = Config { path }.build().await;

        assert!(matches!(result, Err(DomoticaError::CorruptState(_))));
    }

    #[tokio::test]
    async fn should_reflect_external_rewrite_on_reload() {
        let dir = TempDir::new().unwrap();
        let first = setup(&dir).await;
        let second = setup(&dir).await;

        let mut home = second.snapshot();
        home.set_state(
            &DeviceId::from("light-01"),
            DeviceState::Light(LightState { on: true }),
        )
        .unwrap();
        second.save(&home).await.unwrap();

        assert_ne!(first.snapshot(), home);
        let reloaded = first.reload().await.unwrap();
        assert_eq!(reloaded, home);
        assert_eq!(first.snapshot(), home);
    }

    #[tokio::test]
    async fn should_reseed_when_file_disappears() {
        let dir = TempDir::new().unwrap();
        let store = setup(&dir).await;
        let mut home = store.snapshot();
        home.insert_room(RoomKind::Bedroom, "dormitorio");
        store.save(&home).await.unwrap();

        std::fs::remove_file(store.path()).unwrap();

        assert_eq!(store.reload().await.unwrap(), Home::with_defaults());
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn should_report_unparsable_file_as_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("domotica_data.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = Config { path }.build().await;

        assert!(matches!(result, Err(DomoticaError::CorruptState(_))));
    }

    #[tokio::test]
    async fn should_report_broken_invariant_as_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("domotica_data.json");
        std::fs::write(
            &path,
            r#"{
                "rooms": [
                    {"id": "room-01", "name": "living", "type": "living", "device_ids":["light-09"]}
                ],
                "devices": []
            }"#,
        )
        .unwrap();

        let result = Config { path }.build().await;

        assert!(matches!(result, Err(DomoticaError::CorruptState(_))));
    }

    #[tokio::test]
    async fn should_keep_view_when_reload_finds_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let store = setup(&dir).await;
        std::fs::write(store.path(), "[]").unwrap();

        assert!(matches!(
            store.reload().await,
            Err(DomoticaError::CorruptState(_))
        ));
        assert_eq!(store.snapshot(), Home::with_defaults());
    }
}
