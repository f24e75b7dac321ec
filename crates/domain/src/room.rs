//! Room — a typed space that references the devices placed in it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomoticaError, ValidationError};
use crate::id::{DeviceId, RoomId};

/// Kind of room, fixed at creation.
///
/// Serialized with the canonical Spanish labels, which double as the base
/// display name of new rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    #[serde(rename = "comedor", alias = "dining")]
    Dining,
    #[serde(rename = "cocina", alias = "kitchen")]
    Kitchen,
    #[serde(rename = "baño", alias = "bathroom")]
    Bathroom,
    #[serde(rename = "living")]
    Living,
    #[serde(rename = "dormitorio", alias = "bedroom")]
    Bedroom,
}

impl RoomKind {
    pub const ALL: [Self; 5] = [
        Self::Dining,
        Self::Kitchen,
        Self::Bathroom,
        Self::Living,
        Self::Bedroom,
    ];

    /// Canonical label, used as the base name of new rooms of this kind.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Dining => "comedor",
            Self::Kitchen => "cocina",
            Self::Bathroom => "baño",
            Self::Living => "living",
            Self::Bedroom => "dormitorio",
        }
    }

    fn english(self) -> &'static str {
        match self {
            Self::Dining => "dining",
            Self::Kitchen => "kitchen",
            Self::Bathroom => "bathroom",
            Self::Living => "living",
            Self::Bedroom => "bedroom",
        }
    }
}

impl fmt::Display for RoomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RoomKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == needle || kind.english() == needle)
            .ok_or_else(|| ValidationError::UnknownRoomKind(s.to_string()))
    }
}

/// A room of the home.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RoomKind,
    #[serde(default)]
    pub device_ids: Vec<DeviceId>,
}

impl Room {
    /// Create a builder for constructing a [`Room`].
    #[must_use]
    pub fn builder() -> RoomBuilder {
        RoomBuilder::default()
    }

    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::Validation`] when `name` is blank or the
    /// same device is listed twice.
    pub fn validate(&self) -> Result<(), DomoticaError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        for (idx, device_id) in self.device_ids.iter().enumerate() {
            if self.device_ids[..idx].contains(device_id) {
                return Err(ValidationError::DuplicateId(device_id.to_string()).into());
            }
        }
        Ok(())
    }

    /// Whether `device_id` is listed in this room.
    #[must_use]
    pub fn holds(&self, device_id: &DeviceId) -> bool {
        self.device_ids.contains(device_id)
    }
}

/// Step-by-step builder for [`Room`].
#[derive(Debug, Default)]
pub struct RoomBuilder {
    id: Option<RoomId>,
    name: Option<String>,
    kind: Option<RoomKind>,
    device_ids: Vec<DeviceId>,
}

impl RoomBuilder {
    #[must_use]
    pub fn id(mut self, id: RoomId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: RoomKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn device_id(mut self, device_id: DeviceId) -> Self {
        self.device_ids.push(device_id);
        self
    }

    /// Consume the builder, validate, and return a [`Room`].
    ///
    /// A missing name defaults to the kind's label.
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::Validation`] if the id or kind is missing, or
    /// if [`Room::validate`] fails.
    pub fn build(self) -> Result<Room, DomoticaError> {
        let kind = self.kind.ok_or(ValidationError::MissingField("type"))?;
        let id = self.id.ok_or(ValidationError::MissingField("id"))?;
        let room = Room {
            id,
            name: self.name.unwrap_or_else(|| kind.label().to_string()),
            kind,
            device_ids: self.device_ids,
        };
        room.validate()?;
        Ok(room)
    }
}
