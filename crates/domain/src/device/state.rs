//! Per-kind device state payloads.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::DeviceKind;
use crate::error::ValidationError;

pub const DEFAULT_THERMOSTAT_TEMPERATURE: i32 = 21;
pub const DEFAULT_FAN_SPEED: i32 = 0;
pub const DEFAULT_OVEN_TEMPERATURE: i32 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LightState {
    pub on: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThermostatState {
    pub temperature: i32,
}

/// Fan speed, `0` meaning off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FanState {
    pub speed: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OvenState {
    pub temperature: i32,
    #[serde(alias = "timer")]
    pub timer_minutes: i32,
    pub active: bool,
}

/// State of a device, one variant per [`DeviceKind`].
///
/// Serialized as the bare payload object; the kind travels next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DeviceState {
    Light(LightState),
    Thermostat(ThermostatState),
    Fan(FanState),
    Oven(OvenState),
}

impl DeviceState {
    /// State of a freshly added device of the given kind.
    #[must_use]
    pub fn default_for(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Light => Self::Light(LightState { on: false }),
            DeviceKind::Thermostat => Self::Thermostat(ThermostatState {
                temperature: DEFAULT_THERMOSTAT_TEMPERATURE,
            }),
            DeviceKind::Fan => Self::Fan(FanState {
                speed: DEFAULT_FAN_SPEED,
            }),
            DeviceKind::Oven => Self::Oven(OvenState {
                temperature: DEFAULT_OVEN_TEMPERATURE,
                timer_minutes: 0,
                active: false,
            }),
        }
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::Light(_) => DeviceKind::Light,
            Self::Thermostat(_) => DeviceKind::Thermostat,
            Self::Fan(_) => DeviceKind::Fan,
            Self::Oven(_) => DeviceKind::Oven,
        }
    }

    /// Interpret a JSON payload as the state of a `kind` device.
    ///
    /// Scalar payloads (`true` for a light, `21` for a thermostat, `3` for a
    /// fan) are accepted as shorthand for the single-field objects.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedState`] when fields are missing,
    /// unknown, or of the wrong JSON type.
    pub fn from_json(kind: DeviceKind, value: serde_json::Value) -> Result<Self, ValidationError> {
        use serde_json::Value;

        let value = match (kind, value) {
            (DeviceKind::Light, Value::Bool(on)) => serde_json::json!({ "on": on }),
            (DeviceKind::Thermostat, Value::Number(n)) => {
                serde_json::json!({ "temperature": n })
            }
            (DeviceKind::Fan, Value::Number(n)) => serde_json::json!({ "speed": n }),
            (_, other) => other,
        };
        Ok(match kind {
            DeviceKind::Light => Self::Light(parse(kind, value)?),
            DeviceKind::Thermostat => Self::Thermostat(parse(kind, value)?),
            DeviceKind::Fan => Self::Fan(parse(kind, value)?),
            DeviceKind::Oven => Self::Oven(parse(kind, value)?),
        })
    }
}

fn parse<T: DeserializeOwned>(
    kind: DeviceKind,
    value: serde_json::Value,
) -> Result<T, ValidationError> {
    serde_json::from_value(value).map_err(|err| ValidationError::MalformedState {
        kind,
        reason: err.to_string(),
    })
}
