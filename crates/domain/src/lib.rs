//! # domotica-domain
//!
//! Pure domain model for the domotica room and device manager.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Rooms** (typed spaces with a unique display name)
//! - Define **Devices** (lights, thermostats, fans, ovens) and their per-kind state
//! - Define the **Home** arena holding both, linked by id only
//! - Contain the **rule engine**: capacity, placement, naming and range checks
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod home;
pub mod naming;
pub mod room;
pub mod rules;
