//! Common error types used across the workspace.
//!
//! Each failure family has its own typed error and converts into
//! [`DomoticaError`] via `#[from]`.

use crate::device::DeviceKind;

/// Top-level error returned by every domain and application operation.
#[derive(Debug, thiserror::Error)]
pub enum DomoticaError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("rule violation")]
    Rule(#[from] RuleViolation),

    #[error("wrong device type")]
    WrongDeviceType(#[from] WrongDeviceTypeError),

    #[error("corrupt state")]
    CorruptState(#[from] CorruptStateError),

    #[error("storage error")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// Structurally malformed input, detected without looking at the collection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("missing required field {0:?}")]
    MissingField(&'static str),

    #[error("unknown room type {0:?}")]
    UnknownRoomKind(String),

    #[error("unknown device type {0:?}")]
    UnknownDeviceKind(String),

    #[error("malformed {kind} state: {reason}")]
    MalformedState { kind: DeviceKind, reason: String },

    #[error("field {field:?} does not apply to a {kind}")]
    FieldNotApplicable {
        kind: DeviceKind,
        field: &'static str,
    },

    #[error("step must be at least 1, got {0}")]
    InvalidStep(i32),

    #[error("device {device} is listed by room {room} but assigned to {assigned}")]
    BrokenLink {
        device: String,
        room: String,
        assigned: String,
    },

    #[error("duplicate identifier {0}")]
    DuplicateId(String),
}

/// A referenced room, device or name does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {key:?} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub key: String,
}

impl NotFoundError {
    #[must_use]
    pub fn room(key: impl Into<String>) -> Self {
        Self {
            entity: "room",
            key: key.into(),
        }
    }

    #[must_use]
    pub fn device(key: impl Into<String>) -> Self {
        Self {
            entity: "device",
            key: key.into(),
        }
    }
}

/// A cross-entity invariant would be broken by the requested operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    #[error("capacity exceeded: at most {limit} {what}")]
    CapacityExceeded { what: &'static str, limit: usize },

    #[error("a {device} cannot be placed in room {room:?}: {reason}")]
    PlacementForbidden {
        device: DeviceKind,
        room: String,
        reason: &'static str,
    },

    #[error("room {room:?} still holds devices {devices:?}")]
    RoomNotEmpty { room: String, devices: Vec<String> },

    #[error("a room named {0:?} already exists")]
    NameConflict(String),

    #[error("no {0} identifiers left to allocate")]
    SequenceExhausted(&'static str),

    #[error("{field} {value} out of range ({min}-{max})")]
    OutOfRange {
        field: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },
}

/// An actuation was requested on a device of another type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("device {device} is a {actual}, not a {expected}")]
pub struct WrongDeviceTypeError {
    pub device: String,
    pub expected: DeviceKind,
    pub actual: DeviceKind,
}

/// The persisted state cannot be turned into a valid collection.
#[derive(Debug, thiserror::Error)]
#[error("persisted state is corrupt: {reason}")]
pub struct CorruptStateError {
    pub reason: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CorruptStateError {
    #[must_use]
    pub fn new(
        reason: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            reason: reason.into(),
            source: Some(source.into()),
        }
    }
}
