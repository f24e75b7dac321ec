//! # domotica — home status tool
//!
//! Composition root that wires the storage adapter into the application
//! services and prints the home overview.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize the tracing subscriber
//! - Open the JSON file store, seeding the default home on first run
//! - Construct application services, injecting the store via the port trait
//! - Print the status overview as JSON on stdout
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use domotica_app::ports::HomeStore;
use domotica_app::services::room_service::RoomService;
use domotica_app::unit_of_work::UnitOfWork;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    // Storage
    let store = domotica_adapter_storage_json::Config {
        path: config.data_file().to_path_buf(),
    }
    .build()
    .await?;
    let home = store.snapshot();
    tracing::info!(
        path = %store.path().display(),
        rooms = home.room_count(),
        devices = home.device_count(),
        "home loaded"
    );

    // Services
    let uow = Arc::new(UnitOfWork::new(store));
    let room_service = RoomService::new(uow);

    let status = room_service.status().await?;
    println!("{}", serde_json::to_string_pretty(&status)?);

    Ok(())
}
