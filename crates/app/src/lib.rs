//! # domotica-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define the **port trait** that storage adapters implement:
//!   - `HomeStore` — load, reload, save and snapshot the whole home
//! - Provide the **unit of work** that wraps every operation in
//!   reload → validate → mutate → save, one operation at a time per process
//! - Define **driving/inbound ports** as use-case structs:
//!   - `RoomService` — list, get, add, rename, delete rooms; status overview
//!   - `DeviceService` — list, get, add, update, delete devices and actuate
//!     lights, thermostats, fans and ovens
//!
//! ## Dependency rule
//! Depends on `domotica-domain` only (plus `tokio::sync` for the gate).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
pub mod unit_of_work;

#[cfg(test)]
pub(crate) mod testing;
