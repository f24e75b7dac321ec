//! Typed identifier newtypes backed by readable `<prefix>-NN` strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::device::DeviceKind;

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Build the identifier for sequence number `seq` under `prefix`.
            #[must_use]
            pub fn from_sequence(prefix: &str, seq: u32) -> Self {
                Self(format!("{prefix}-{seq:02}"))
            }

            /// Borrow the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Split into `(prefix, sequence)` when the id follows the
            /// `<prefix>-<digits>` shape.
            #[must_use]
            pub fn sequence(&self) -> Option<(&str, u32)> {
                let (prefix, digits) = self.0.rsplit_once('-')?;
                digits.parse().ok().map(|seq| (prefix, seq))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(
    /// Unique identifier for a [`Room`](crate::room::Room).
    RoomId
);

define_id!(
    /// Unique identifier for a [`Device`](crate::device::Device).
    DeviceId
);

/// Next free sequence number per identifier family.
///
/// Persisted alongside the collection so identifiers are never handed out
/// twice, even after the entity holding them was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdSequences {
    pub room: u32,
    pub light: u32,
    pub thermo: u32,
    pub fan: u32,
    pub oven: u32,
}

impl Default for IdSequences {
    fn default() -> Self {
        Self {
            room: 1,
            light: 1,
            thermo: 1,
            fan: 1,
            oven: 1,
        }
    }
}

impl IdSequences {
    const ROOM_PREFIX: &'static str = "room";

    /// Allocate the next room identifier.
    ///
    /// The counter stops at `u32::MAX`; see [`IdSequences::exhausted`].
    pub fn next_room_id(&mut self) -> RoomId {
        let id = RoomId::from_sequence(Self::ROOM_PREFIX, self.room);
        self.room = self.room.saturating_add(1);
        id
    }

    /// Allocate the next identifier for a device of the given kind.
    ///
    /// The counter stops at `u32::MAX`; see [`IdSequences::exhausted`].
    pub fn next_device_id(&mut self, kind: DeviceKind) -> DeviceId {
        let counter = self.device_counter_mut(kind);
        let id = DeviceId::from_sequence(kind.id_prefix(), *counter);
        *counter = counter.saturating_add(1);
        id
    }

    /// Name of the first identifier family whose counter reached `u32::MAX`.
    ///
    /// Such a counter can no longer hand out a fresh identifier, so a home
    /// carrying it is refused by [`Home::validate`](crate::home::Home::validate).
    #[must_use]
    pub fn exhausted(&self) -> Option<&'static str> {
        [
            (Self::ROOM_PREFIX, self.room),
            ("light", self.light),
            ("thermo", self.thermo),
            ("fan", self.fan),
            ("oven", self.oven),
        ]
        .into_iter()
        .find_map(|(family, counter)| (counter == u32::MAX).then_some(family))
    }

    /// Advance the counters past every sequence number already in use.
    pub fn advance_past_room(&mut self, id: &RoomId) {
        if let Some((prefix, seq)) = id.sequence()
            && prefix == Self::ROOM_PREFIX
        {
            self.room = self.room.max(seq.saturating_add(1));
        }
    }

    /// Advance the device counter matching the prefix of `id`, if any.
    pub fn advance_past_device(&mut self, id: &DeviceId) {
        if let Some((prefix, seq)) = id.sequence()
            && let Some(kind) = DeviceKind::from_id_prefix(prefix)
        {
            let counter = self.device_counter_mut(kind);
            *counter = (*counter).max(seq.saturating_add(1));
        }
    }

    fn device_counter_mut(&mut self, kind: DeviceKind) -> &mut u32 {
        match kind {
            DeviceKind::Light => &mut self.light,
            DeviceKind::Thermostat => &mut self.thermo,
            DeviceKind::Fan => &mut self.fan,
            DeviceKind::Oven => &mut self.oven,
        }
    }
}
