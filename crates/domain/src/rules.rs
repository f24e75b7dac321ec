//! Rule engine — checks that need the whole [`Home`] in view.
//!
//! Every function is pure: it inspects the collection and reports whether
//! the requested change may go ahead, without touching anything.

use crate::device::{DeviceKind, DeviceState};
use crate::error::{DomoticaError, NotFoundError, RuleViolation, ValidationError};
use crate::home::Home;
use crate::id::{DeviceId, RoomId};
use crate::naming;
use crate::room::{Room, RoomKind};

pub const MAX_ROOMS: usize = 6;
pub const MAX_DEVICES_PER_ROOM: usize = 10;

pub const THERMOSTAT_TEMPERATURE: Bounds = Bounds::new("temperature", 16, 32);
pub const FAN_SPEED: Bounds = Bounds::new("speed", 0, 5);
pub const OVEN_TEMPERATURE: Bounds = Bounds::new("oven temperature", 160, 240);
pub const OVEN_TIMER: Bounds = Bounds::new("timer_minutes", 0, 240);

/// Inclusive bounds of a numeric state field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub field: &'static str,
    pub min: i32,
    pub max: i32,
}

impl Bounds {
    const fn new(field: &'static str, min: i32, max: i32) -> Self {
        Self { field, min, max }
    }

    /// Accept `value` if it lies within the bounds.
    ///
    /// # Errors
    ///
    /// Returns [`RuleViolation::OutOfRange`] otherwise.
    pub fn check(self, value: i32) -> Result<i32, RuleViolation> {
        if (self.min..=self.max).contains(&value) {
            Ok(value)
        } else {
            Err(RuleViolation::OutOfRange {
                field: self.field,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

pub(crate) fn room_capacity_exceeded() -> RuleViolation {
    RuleViolation::CapacityExceeded {
        what: "rooms",
        limit: MAX_ROOMS,
    }
}

pub(crate) fn device_capacity_exceeded() -> RuleViolation {
    RuleViolation::CapacityExceeded {
        what: "devices per room",
        limit: MAX_DEVICES_PER_ROOM,
    }
}

/// # Errors
///
/// Returns [`RuleViolation::CapacityExceeded`] when [`MAX_ROOMS`] rooms exist.
pub fn can_add_room(home: &Home) -> Result<(), RuleViolation> {
    if home.room_count() >= MAX_ROOMS {
        return Err(room_capacity_exceeded());
    }
    Ok(())
}

/// Display name for a new room of `kind`, unique among existing rooms.
#[must_use]
pub fn resolve_room_name(home: &Home, kind: RoomKind) -> String {
    naming::disambiguate(kind.label(), home.rooms().map(|room| room.name.as_str()))
}

/// Placement restrictions between device kinds and room kinds.
///
/// # Errors
///
/// Returns [`RuleViolation::PlacementForbidden`] for an oven outside a
/// kitchen, or anything but a light inside a bathroom.
pub fn check_placement(room: &Room, device: DeviceKind) -> Result<(), RuleViolation> {
    let reason = match (room.kind, device) {
        (RoomKind::Kitchen, _) | (_, DeviceKind::Light) => return Ok(()),
        (_, DeviceKind::Oven) => "ovens are only allowed in a kitchen",
        (RoomKind::Bathroom, _) => "bathrooms only take lights",
        _ => return Ok(()),
    };
    Err(RuleViolation::PlacementForbidden {
        device,
        room: room.name.clone(),
        reason,
    })
}

/// # Errors
///
/// Returns [`NotFoundError`] for an unknown room,
/// [`RuleViolation::CapacityExceeded`] when the room is full and
/// [`RuleViolation::PlacementForbidden`] per [`check_placement`].
pub fn can_add_device(
    home: &Home,
    room_id: &RoomId,
    kind: DeviceKind,
) -> Result<(), DomoticaError> {
    let room = home
        .room(room_id)
        .ok_or_else(|| NotFoundError::room(room_id.as_str()))?;
    if room.device_ids.len() >= MAX_DEVICES_PER_ROOM {
        return Err(device_capacity_exceeded().into());
    }
    check_placement(room, kind)?;
    Ok(())
}

/// Same checks as [`can_add_device`], run against the destination room. A
/// device staying in its own room does not count against the capacity.
///
/// # Errors
///
/// Returns [`NotFoundError`] for an unknown device or room, otherwise as
/// [`can_add_device`].
pub fn can_move_device(
    home: &Home,
    device_id: &DeviceId,
    new_room_id: &RoomId,
) -> Result<(), DomoticaError> {
    let device = home.require_device(device_id)?;
    let room = home
        .room(new_room_id)
        .ok_or_else(|| NotFoundError::room(new_room_id.as_str()))?;
    let occupied = room
        .device_ids
        .iter()
        .filter(|held| *held != device_id)
        .count();
    if occupied >= MAX_DEVICES_PER_ROOM {
        return Err(device_capacity_exceeded().into());
    }
    check_placement(room, device.kind())?;
    Ok(())
}

/// # Errors
///
/// Returns [`NotFoundError`] for an unknown room and
/// [`RuleViolation::RoomNotEmpty`] while it still holds devices.
pub fn can_delete_room(home: &Home, room_id: &RoomId) -> Result<(), DomoticaError> {
    let room = home
        .room(room_id)
        .ok_or_else(|| NotFoundError::room(room_id.as_str()))?;
    if !room.device_ids.is_empty() {
        return Err(RuleViolation::RoomNotEmpty {
            room: room.name.clone(),
            devices: room.device_ids.iter().map(ToString::to_string).collect(),
        }
        .into());
    }
    Ok(())
}

/// # Errors
///
/// Returns [`ValidationError::EmptyName`] for a blank name and
/// [`RuleViolation::NameConflict`] when another room already uses it.
pub fn can_rename_room(
    home: &Home,
    room_id: &RoomId,
    new_name: &str,
) -> Result<(), DomoticaError> {
    if new_name.trim().is_empty() {
        return Err(ValidationError::EmptyName.into());
    }
    if home
        .rooms()
        .any(|room| room.name == new_name && &room.id != room_id)
    {
        return Err(RuleViolation::NameConflict(new_name.to_string()).into());
    }
    Ok(())
}

/// # Errors
///
/// Returns [`RuleViolation::OutOfRange`] outside 16–32.
pub fn check_thermostat_temperature(value: i32) -> Result<i32, RuleViolation> {
    THERMOSTAT_TEMPERATURE.check(value)
}

/// # Errors
///
/// Returns [`RuleViolation::OutOfRange`] outside 0–5.
pub fn check_fan_speed(value: i32) -> Result<i32, RuleViolation> {
    FAN_SPEED.check(value)
}

/// # Errors
///
/// Returns [`RuleViolation::OutOfRange`] outside 160–240.
pub fn check_oven_temperature(value: i32) -> Result<i32, RuleViolation> {
    OVEN_TEMPERATURE.check(value)
}

/// # Errors
///
/// Returns [`RuleViolation::OutOfRange`] outside 0–240.
pub fn check_oven_timer(value: i32) -> Result<i32, RuleViolation> {
    OVEN_TIMER.check(value)
}

/// Bounds-check every numeric field of a state.
///
/// # Errors
///
/// Returns the first [`RuleViolation::OutOfRange`] found.
pub fn check_state(state: &DeviceState) -> Result<(), RuleViolation> {
    match state {
        DeviceState::Light(_) => {}
        DeviceState::Thermostat(s) => {
            check_thermostat_temperature(s.temperature)?;
        }
        DeviceState::Fan(s) => {
            check_fan_speed(s.speed)?;
        }
        DeviceState::Oven(s) => {
            check_oven_temperature(s.temperature)?;
            check_oven_timer(s.timer_minutes)?;
        }
    }
    Ok(())
}
