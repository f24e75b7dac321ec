//! Partial state updates.

use serde::{Deserialize, Serialize};

use super::{DeviceKind, DeviceState};
use crate::error::ValidationError;

/// A partial update of a device state.
///
/// Only the fields that exist for the target device's kind may be set:
/// `on` for lights, `temperature` for thermostats and ovens, `speed` for fans,
/// `timer_minutes` and `active` for ovens. Range checks are left to
/// [`rules`](crate::rules).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<i32>,
    #[serde(alias = "timer", skip_serializing_if = "Option::is_none")]
    pub timer_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl StatePatch {
    #[must_use]
    pub fn on(mut self, on: bool) -> Self {
        self.on = Some(on);
        self
    }

    #[must_use]
    pub fn temperature(mut self, temperature: i32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn speed(mut self, speed: i32) -> Self {
        self.speed = Some(speed);
        self
    }

    #[must_use]
    pub fn timer_minutes(mut self, minutes: i32) -> Self {
        self.timer_minutes = Some(minutes);
        self
    }

    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn set_fields(&self) -> impl Iterator<Item = &'static str> {
        [
            ("on", self.on.is_some()),
            ("temperature", self.temperature.is_some()),
            ("speed", self.speed.is_some()),
            ("timer_minutes", self.timer_minutes.is_some()),
            ("active", self.active.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
    }
}

fn accepted_fields(kind: DeviceKind) -> &'static [&'static str] {
    match kind {
        DeviceKind::Light => &["on"],
        DeviceKind::Thermostat => &["temperature"],
        DeviceKind::Fan => &["speed"],
        DeviceKind::Oven => &["temperature", "timer_minutes", "active"],
    }
}

impl DeviceState {
    /// Return a copy of this state with `patch` applied.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::FieldNotApplicable`] for the first patch
    /// field the device kind does not have.
    pub fn patched(&self, patch: &StatePatch) -> Result<Self, ValidationError> {
        let kind = self.kind();
        if let Some(field) = patch
            .set_fields()
            .find(|field| !accepted_fields(kind).contains(field))
        {
            return Err(ValidationError::FieldNotApplicable { kind, field });
        }

        let mut next = *self;
        match &mut next {
            Self::Light(state) => {
                state.on = patch.on.unwrap_or(state.on);
            }
            Self::Thermostat(state) => {
                state.temperature = patch.temperature.unwrap_or(state.temperature);
            }
            Self::Fan(state) => {
                state.speed = patch.speed.unwrap_or(state.speed);
            }
            Self::Oven(state) => {
                state.temperature = patch.temperature.unwrap_or(state.temperature);
                state.timer_minutes = patch.timer_minutes.unwrap_or(state.timer_minutes);
                state.active = patch.active.unwrap_or(state.active);
            }
        }
        Ok(next)
    }
}
