//! Device service — use-cases for managing devices.

mod control;

use std::sync::Arc;

use domotica_domain::device::{Device, DeviceKind, DeviceState, StatePatch};
use domotica_domain::error::DomoticaError;
use domotica_domain::home::Home;
use domotica_domain::id::DeviceId;
use domotica_domain::rules;
use serde::Deserialize;

use crate::ports::HomeStore;
use crate::unit_of_work::UnitOfWork;

/// Changes requested by [`DeviceService::update_device`]. Absent fields are
/// left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceUpdate {
    /// Name of the room to move the device to.
    pub room: Option<String>,
    pub state: Option<StatePatch>,
}

/// Application service for device CRUD and actuation.
pub struct DeviceService<S> {
    uow: Arc<UnitOfWork<S>>,
}

impl<S: HomeStore> DeviceService<S> {
    /// Create a new service running on the given unit of work.
    pub fn new(uow: Arc<UnitOfWork<S>>) -> Self {
        Self { uow }
    }

    /// List devices, optionally only those of the room named `room`.
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::NotFound`] when `room` names no room.
    #[tracing::instrument(skip(self))]
    pub async fn list_devices(&self, room: Option<&str>) -> Result<Vec<Device>, DomoticaError> {
        self.uow
            .read(|home| match room {
                Some(name) => {
                    let room = home.require_room_named(name)?;
                    Ok(home.devices_in(&room.id).cloned().collect())
                }
                None => Ok(home.devices().cloned().collect()),
            })
            .await
    }

    /// Look up a device by id.
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::NotFound`] when no device has `id`.
    #[tracing::instrument(skip(self))]
    pub async fn get_device(&self, id: &DeviceId) -> Result<Device, DomoticaError> {
        self.uow
            .read(|home| Ok(home.require_device(id)?.clone()))
            .await
    }

    /// Add a device of `kind` to the room named `room`, starting from the
    /// kind's default state with `initial` applied on top.
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::NotFound`] for an unknown room,
    /// [`DomoticaError::Validation`] when `initial` sets a field the kind does
    /// not have, and [`DomoticaError::Rule`] for capacity, placement or range
    /// violations.
    #[tracing::instrument(skip(self))]
    pub async fn add_device(
        &self,
        room: &str,
        kind: DeviceKind,
        initial: Option<StatePatch>,
    ) -> Result<Device, DomoticaError> {
        let device = self
            .uow
            .write(|home| {
                let room_id = home.require_room_named(room)?.id.clone();
                rules::can_add_device(home, &room_id, kind)?;
                let mut state = DeviceState::default_for(kind);
                if let Some(patch) = initial {
                    state = state.patched(&patch)?;
                }
                rules::check_state(&state)?;
                let id = home.insert_device(&room_id, state);
                Ok(home.require_device(&id)?.clone())
            })
            .await?;
        tracing::info!(device_id = %device.id, room_id = %device.room_id, "device added");
        Ok(device)
    }

    /// Move a device and/or patch its state in one step.
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::NotFound`] for an unknown device or room,
    /// [`DomoticaError::Validation`] for patch fields the kind does not have,
    /// and [`DomoticaError::Rule`] when the destination refuses the device or
    /// a value is out of range.
    #[tracing::instrument(skip(self))]
    pub async fn update_device(
        &self,
        id: &DeviceId,
        update: DeviceUpdate,
    ) -> Result<Device, DomoticaError> {
        let device = self
            .uow
            .write(|home| {
                home.require_device(id)?;
                if let Some(room) = &update.room {
                    let to = home.require_room_named(room)?.id.clone();
                    rules::can_move_device(home, id, &to)?;
                    home.move_device(id, &to)?;
                }
                if let Some(patch) = &update.state {
                    return apply_patch(home, id, patch);
                }
                Ok(home.require_device(id)?.clone())
            })
            .await?;
        tracing::info!(device_id = %device.id, room_id = %device.room_id, "device updated");
        Ok(device)
    }

    /// Remove a device from its room and from the home.
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::NotFound`] when no device has `id`.
    #[tracing::instrument(skip(self))]
    pub async fn delete_device(&self, id: &DeviceId) -> Result<Device, DomoticaError> {
        let device = self
            .uow
            .write(|home| Ok(home.remove_device(id)?))
            .await?;
        tracing::info!(device_id = %device.id, room_id = %device.room_id, "device deleted");
        Ok(device)
    }
}

/// Apply `patch` to a device's state after range-checking the result.
fn apply_patch(
    home: &mut Home,
    id: &DeviceId,
    patch: &StatePatch,
) -> Result<Device, DomoticaError> {
    let next = home.require_device(id)?.state.patched(patch)?;
    rules::check_state(&next)?;
    home.set_state(id, next)?;
    Ok(home.require_device(id)?.clone())
}
