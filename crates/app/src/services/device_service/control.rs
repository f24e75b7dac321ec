//! Actuation — typed operations on lights, thermostats, fans and ovens.

use domotica_domain::device::{Device, DeviceKind, DeviceState, StatePatch};
use domotica_domain::error::{DomoticaError, ValidationError, WrongDeviceTypeError};
use domotica_domain::id::DeviceId;

use super::{DeviceService, apply_patch};
use crate::ports::HomeStore;

impl<S: HomeStore> DeviceService<S> {
    /// Resolve the device, derive a patch from its current state and apply
    /// it. `patch_for` returns `None` when the state is not of the expected
    /// kind.
    async fn actuate<F>(
        &self,
        id: &DeviceId,
        expected: DeviceKind,
        patch_for: F,
    ) -> Result<Device, DomoticaError>
    where
        F: FnOnce(&DeviceState) -> Option<StatePatch>,
    {
        let device = self
            .uow
            .write(|home| {
                let device = home.require_device(id)?;
                let patch = patch_for(&device.state).ok_or_else(|| WrongDeviceTypeError {
                    device: id.to_string(),
                    expected,
                    actual: device.kind(),
                })?;
                apply_patch(home, id, &patch)
            })
            .await?;
        tracing::info!(device_id = %device.id, state = ?device.state, "device actuated");
        Ok(device)
    }

    async fn actuate_kind(
        &self,
        id: &DeviceId,
        expected: DeviceKind,
        patch: StatePatch,
    ) -> Result<Device, DomoticaError> {
        self.actuate(id, expected, |state| (state.kind() == expected).then_some(patch))
            .await
    }

    /// Flip a light on or off.
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::NotFound`] for an unknown device and
    /// [`DomoticaError::WrongDeviceType`] when it is not a light.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_light(&self, id: &DeviceId) -> Result<Device, DomoticaError> {
        self.actuate(id, DeviceKind::Light, |state| match state {
            DeviceState::Light(light) => Some(StatePatch::default().on(!light.on)),
            _ => None,
        })
        .await
    }

    /// # Errors
    ///
    /// As [`toggle_light`](Self::toggle_light).
    #[tracing::instrument(skip(self))]
    pub async fn turn_on_light(&self, id: &DeviceId) -> Result<Device, DomoticaError> {
        self.actuate_kind(id, DeviceKind::Light, StatePatch::default().on(true))
            .await
    }

    /// # Errors
    ///
    /// As [`toggle_light`](Self::toggle_light).
    #[tracing::instrument(skip(self))]
    pub async fn turn_off_light(&self, id: &DeviceId) -> Result<Device, DomoticaError> {
        self.actuate_kind(id, DeviceKind::Light, StatePatch::default().on(false))
            .await
    }

    /// Set a thermostat's target temperature.
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::NotFound`], [`DomoticaError::WrongDeviceType`]
    /// or, outside 16–32, [`DomoticaError::Rule`].
    #[tracing::instrument(skip(self))]
    pub async fn set_temperature(
        &self,
        id: &DeviceId,
        temperature: i32,
    ) -> Result<Device, DomoticaError> {
        self.actuate_kind(
            id,
            DeviceKind::Thermostat,
            StatePatch::default().temperature(temperature),
        )
        .await
    }

    /// Raise a thermostat by `by` degrees. A step that would leave the
    /// allowed range is refused, never clamped.
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::Validation`] when `by` is below 1, otherwise
    /// as [`set_temperature`](Self::set_temperature).
    #[tracing::instrument(skip(self))]
    pub async fn increase_temperature(
        &self,
        id: &DeviceId,
        by: i32,
    ) -> Result<Device, DomoticaError> {
        let by = step(by)?;
        self.shift_temperature(id, by).await
    }

    /// Lower a thermostat by `by` degrees.
    ///
    /// # Errors
    ///
    /// As [`increase_temperature`](Self::increase_temperature).
    #[tracing::instrument(skip(self))]
    pub async fn decrease_temperature(
        &self,
        id: &DeviceId,
        by: i32,
    ) -> Result<Device, DomoticaError> {
        let by = step(by)?;
        self.shift_temperature(id, -by).await
    }

    async fn shift_temperature(&self, id: &DeviceId, delta: i32) -> Result<Device, DomoticaError> {
        self.actuate(id, DeviceKind::Thermostat, |state| match state {
            DeviceState::Thermostat(thermostat) => Some(
                StatePatch::default().temperature(thermostat.temperature.saturating_add(delta)),
            ),
            _ => None,
        })
        .await
    }

    /// Set a fan's speed, `0` meaning off.
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::NotFound`], [`DomoticaError::WrongDeviceType`]
    /// or, outside 0–5, [`DomoticaError::Rule`].
    #[tracing::instrument(skip(self))]
    pub async fn set_fan_speed(&self, id: &DeviceId, speed: i32) -> Result<Device, DomoticaError> {
        self.actuate_kind(id, DeviceKind::Fan, StatePatch::default().speed(speed))
            .await
    }

    /// # Errors
    ///
    /// Returns [`DomoticaError::NotFound`] or [`DomoticaError::WrongDeviceType`].
    #[tracing::instrument(skip(self))]
    pub async fn stop_fan(&self, id: &DeviceId) -> Result<Device, DomoticaError> {
        self.set_fan_speed(id, 0).await
    }

    /// Change any subset of an oven's settings at once.
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::NotFound`], [`DomoticaError::WrongDeviceType`]
    /// or [`DomoticaError::Rule`] for a temperature outside 160–240 or a timer
    /// outside 0–240 minutes.
    #[tracing::instrument(skip(self))]
    pub async fn configure_oven(
        &self,
        id: &DeviceId,
        temperature: Option<i32>,
        timer_minutes: Option<i32>,
        active: Option<bool>,
    ) -> Result<Device, DomoticaError> {
        let patch = StatePatch {
            temperature,
            timer_minutes,
            active,
            ..StatePatch::default()
        };
        self.actuate_kind(id, DeviceKind::Oven, patch).await
    }

    /// # Errors
    ///
    /// Returns [`DomoticaError::NotFound`] or [`DomoticaError::WrongDeviceType`].
    #[tracing::instrument(skip(self))]
    pub async fn turn_on_oven(&self, id: &DeviceId) -> Result<Device, DomoticaError> {
        self.configure_oven(id, None, None, Some(true)).await
    }

    /// # Errors
    ///
    /// Returns [`DomoticaError::NotFound`] or [`DomoticaError::WrongDeviceType`].
    #[tracing::instrument(skip(self))]
    pub async fn turn_off_oven(&self, id: &DeviceId) -> Result<Device, DomoticaError> {
        self.configure_oven(id, None, None, Some(false)).await
    }

    /// # Errors
    ///
    /// As [`configure_oven`](Self::configure_oven).
    #[tracing::instrument(skip(self))]
    pub async fn set_oven_timer(
        &self,
        id: &DeviceId,
        minutes: i32,
    ) -> Result<Device, DomoticaError> {
        self.configure_oven(id, None, Some(minutes), None).await
    }
}

fn step(by: i32) -> Result<i32, ValidationError> {
    if by < 1 {
        return Err(ValidationError::InvalidStep(by));
    }
    Ok(by)
}
