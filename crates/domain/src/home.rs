//! Home — the arena of rooms and devices, linked to each other by id only.

use std::collections::{BTreeMap, HashSet};

use crate::device::{Device, DeviceKind, DeviceState};
use crate::error::{DomoticaError, NotFoundError, RuleViolation, ValidationError};
use crate::id::{DeviceId, IdSequences, RoomId};
use crate::room::{Room, RoomKind};
use crate::rules;

/// Every room and device, plus the identifier sequences.
///
/// Mutating methods keep both sides of the room/device link in agreement but
/// do not enforce placement or capacity rules: callers run [`rules`] first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Home {
    rooms: BTreeMap<RoomId, Room>,
    devices: BTreeMap<DeviceId, Device>,
    sequences: IdSequences,
}

impl Home {
    /// An empty home.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The state a brand new installation starts from: one living room with
    /// a light (off) and a thermostat at its default temperature.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut home = Self::new();
        let living = home.insert_room(RoomKind::Living, RoomKind::Living.label());
        home.insert_device(&living, DeviceState::default_for(DeviceKind::Light));
        home.insert_device(&living, DeviceState::default_for(DeviceKind::Thermostat));
        home
    }

    /// Assemble a home from persisted parts and check every invariant.
    ///
    /// Sequences lagging behind identifiers already in use are advanced.
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::Validation`] on duplicate identifiers, or any
    /// error reported by [`Home::validate`].
    pub fn from_parts(
        rooms: Vec<Room>,
        devices: Vec<Device>,
        mut sequences: IdSequences,
    ) -> Result<Self, DomoticaError> {
        let mut home = Self::new();
        for room in rooms {
            sequences.advance_past_room(&room.id);
            if home.rooms.contains_key(&room.id) {
                return Err(ValidationError::DuplicateId(room.id.to_string()).into());
            }
            home.rooms.insert(room.id.clone(), room);
        }
        for device in devices {
            sequences.advance_past_device(&device.id);
            if home.devices.contains_key(&device.id) {
                return Err(ValidationError::DuplicateId(device.id.to_string()).into());
            }
            home.devices.insert(device.id.clone(), device);
        }
        home.sequences = sequences;
        home.validate()?;
        Ok(home)
    }

    /// Check every collection-wide invariant.
    ///
    /// # Errors
    ///
    /// Returns the first violation found: structural problems as
    /// [`DomoticaError::Validation`], dangling references as
    /// [`DomoticaError::NotFound`], broken rules as [`DomoticaError::Rule`].
    pub fn validate(&self) -> Result<(), DomoticaError> {
        if self.rooms.len() > rules::MAX_ROOMS {
            return Err(rules::room_capacity_exceeded().into());
        }
        if let Some(family) = self.sequences.exhausted() {
            return Err(RuleViolation::SequenceExhausted(family).into());
        }

        let mut names = HashSet::new();
        for room in self.rooms.values() {
            room.validate()?;
            if !names.insert(room.name.as_str()) {
                return Err(RuleViolation::NameConflict(room.name.clone()).into());
            }
            if room.device_ids.len() > rules::MAX_DEVICES_PER_ROOM {
                return Err(rules::device_capacity_exceeded().into());
            }
            for device_id in &room.device_ids {
                let device = self
                    .devices
                    .get(device_id)
                    .ok_or_else(|| NotFoundError::device(device_id.as_str()))?;
                if device.room_id != room.id {
                    return Err(ValidationError::BrokenLink {
                        device: device_id.to_string(),
                        room: room.id.to_string(),
                        assigned: device.room_id.to_string(),
                    }
                    .into());
                }
            }
        }

        for device in self.devices.values() {
            let room = self
                .rooms
                .get(&device.room_id)
                .ok_or_else(|| NotFoundError::room(device.room_id.as_str()))?;
            if !room.holds(&device.id) {
                return Err(ValidationError::BrokenLink {
                    device: device.id.to_string(),
                    room: room.id.to_string(),
                    assigned: device.room_id.to_string(),
                }
                .into());
            }
            rules::check_placement(room, device.kind())?;
            rules::check_state(&device.state)?;
        }
        Ok(())
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    #[must_use]
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn sequences(&self) -> &IdSequences {
        &self.sequences
    }

    #[must_use]
    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    #[must_use]
    pub fn room_by_name(&self, name: &str) -> Option<&Room> {
        self.rooms.values().find(|room| room.name == name)
    }

    #[must_use]
    pub fn device(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.get(id)
    }

    /// Look up a room by name.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no room carries `name`.
    pub fn require_room_named(&self, name: &str) -> Result<&Room, NotFoundError> {
        self.room_by_name(name).ok_or_else(|| NotFoundError::room(name))
    }

    /// Look up a device by id.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no device has `id`.
    pub fn require_device(&self, id: &DeviceId) -> Result<&Device, NotFoundError> {
        self.devices
            .get(id)
            .ok_or_else(|| NotFoundError::device(id.as_str()))
    }

    /// Devices placed in `room_id`, in the room's listing order.
    pub fn devices_in<'a>(&'a self, room_id: &RoomId) -> impl Iterator<Item = &'a Device> {
        self.rooms
            .get(room_id)
            .into_iter()
            .flat_map(|room| room.device_ids.iter())
            .filter_map(|id| self.devices.get(id))
    }

    /// Create an empty room and return its freshly allocated id.
    pub fn insert_room(&mut self, kind: RoomKind, name: impl Into<String>) -> RoomId {
        let id = self.sequences.next_room_id();
        self.rooms.insert(
            id.clone(),
            Room {
                id: id.clone(),
                name: name.into(),
                kind,
                device_ids: Vec::new(),
            },
        );
        id
    }

    /// Create a device in `room_id` and return its freshly allocated id.
    ///
    /// Does nothing but burn an id when the room does not exist; callers
    /// resolve the room first.
    pub fn insert_device(&mut self, room_id: &RoomId, state: DeviceState) -> DeviceId {
        let id = self.sequences.next_device_id(state.kind());
        if let Some(room) = self.rooms.get_mut(room_id) {
            room.device_ids.push(id.clone());
            self.devices.insert(
                id.clone(),
                Device {
                    id: id.clone(),
                    room_id: room_id.clone(),
                    state,
                },
            );
        }
        id
    }

    /// Reassign a device to another room, updating both rooms' listings.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when the device or destination is missing.
    pub fn move_device(&mut self, id: &DeviceId, to: &RoomId) -> Result<(), NotFoundError> {
        if !self.rooms.contains_key(to) {
            return Err(NotFoundError::room(to.as_str()));
        }
        let device = self
            .devices
            .get_mut(id)
            .ok_or_else(|| NotFoundError::device(id.as_str()))?;
        if &device.room_id == to {
            return Ok(());
        }
        let from = std::mem::replace(&mut device.room_id, to.clone());
        if let Some(room) = self.rooms.get_mut(&from) {
            room.device_ids.retain(|held| held != id);
        }
        if let Some(room) = self.rooms.get_mut(to) {
            room.device_ids.push(id.clone());
        }
        Ok(())
    }

    /// Replace the state of a device.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when the device is missing.
    pub fn set_state(&mut self, id: &DeviceId, state: DeviceState) -> Result<(), NotFoundError> {
        let device = self
            .devices
            .get_mut(id)
            .ok_or_else(|| NotFoundError::device(id.as_str()))?;
        device.state = state;
        Ok(())
    }

    /// Remove a device and its entry in the owning room.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when the device is missing.
    pub fn remove_device(&mut self, id: &DeviceId) -> Result<Device, NotFoundError> {
        let device = self
            .devices
            .remove(id)
            .ok_or_else(|| NotFoundError::device(id.as_str()))?;
        if let Some(room) = self.rooms.get_mut(&device.room_id) {
            room.device_ids.retain(|held| held != id);
        }
        Ok(device)
    }

    /// Remove a room. Devices still listed in it are left dangling, so callers
    /// check [`rules::can_delete_room`] first.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when the room is missing.
    pub fn remove_room(&mut self, id: &RoomId) -> Result<Room, NotFoundError> {
        self.rooms
            .remove(id)
            .ok_or_else(|| NotFoundError::room(id.as_str()))
    }

    /// Change the display name of a room.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when the room is missing.
    pub fn rename_room(
        &mut self,
        id: &RoomId,
        name: impl Into<String>,
    ) -> Result<(), NotFoundError> {
        let room = self
            .rooms
            .get_mut(id)
            .ok_or_else(|| NotFoundError::room(id.as_str()))?;
        room.name = name.into();
        Ok(())
    }
}
