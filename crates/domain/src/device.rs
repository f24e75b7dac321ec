//! Device — a controllable appliance placed in exactly one room.

mod patch;
mod state;

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

pub use patch::StatePatch;
pub use state::{
    DeviceState, FanState, LightState, OvenState, ThermostatState, DEFAULT_FAN_SPEED,
    DEFAULT_OVEN_TEMPERATURE, DEFAULT_THERMOSTAT_TEMPERATURE,
};

use crate::error::{DomoticaError, ValidationError};
use crate::id::{DeviceId, RoomId};

/// Kind of device, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Light,
    Thermostat,
    Fan,
    Oven,
}

impl DeviceKind {
    pub const ALL: [Self; 4] = [Self::Light, Self::Thermostat, Self::Fan, Self::Oven];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Thermostat => "thermostat",
            Self::Fan => "fan",
            Self::Oven => "oven",
        }
    }

    /// Prefix of the identifiers allocated to devices of this kind.
    #[must_use]
    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::Thermostat => "thermo",
            other => other.as_str(),
        }
    }

    #[must_use]
    pub fn from_id_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id_prefix() == prefix)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| ValidationError::UnknownDeviceKind(s.to_string()))
    }
}

/// A device and the room it is assigned to.
///
/// The kind is carried by the state variant, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawDevice")]
pub struct Device {
    pub id: DeviceId,
    pub room_id: RoomId,
    pub state: DeviceState,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.state.kind()
    }
}

impl Serialize for Device {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_struct("Device", 4)?;
        out.serialize_field("id", &self.id)?;
        out.serialize_field("type", &self.kind())?;
        out.serialize_field("room_id", &self.room_id)?;
        out.serialize_field("state", &self.state)?;
        out.end()
    }
}

/// Untyped persisted shape, checked against the declared kind on conversion.
#[derive(Deserialize)]
struct RawDevice {
    id: DeviceId,
    #[serde(rename = "type")]
    kind: DeviceKind,
    room_id: RoomId,
    state: serde_json::Value,
}

impl TryFrom<RawDevice> for Device {
    type Error = ValidationError;

    fn try_from(raw: RawDevice) -> Result<Self, Self::Error> {
        Ok(Self {
            id: raw.id,
            room_id: raw.room_id,
            state: DeviceState::from_json(raw.kind, raw.state)?,
        })
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    room_id: Option<RoomId>,
    kind: Option<DeviceKind>,
    state: Option<DeviceState>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn room_id(mut self, room_id: RoomId) -> Self {
        self.room_id = Some(room_id);
        self
    }

    /// Device kind; the state falls back to the kind's defaults.
    #[must_use]
    pub fn kind(mut self, kind: DeviceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn state(mut self, state: DeviceState) -> Self {
        self.state = Some(state);
        self
    }

    /// Consume the builder and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::Validation`] when the id, room or kind is
    /// missing, or when the explicit state belongs to another kind.
    pub fn build(self) -> Result<Device, DomoticaError> {
        let id = self.id.ok_or(ValidationError::MissingField("id"))?;
        let room_id = self.room_id.ok_or(ValidationError::MissingField("room_id"))?;
        let state = match (self.kind, self.state) {
            (Some(kind), Some(state)) if kind != state.kind() => {
                return Err(ValidationError::MalformedState {
                    kind,
                    reason: format!("got a {} state", state.kind()),
                }
                .into());
            }
            (_, Some(state)) => state,
            (Some(kind), None) => DeviceState::default_for(kind),
            (None, None) => return Err(ValidationError::MissingField("type").into()),
        };
        Ok(Device { id, room_id, state })
    }
}
