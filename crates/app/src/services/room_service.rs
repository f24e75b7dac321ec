//! Room service — use-cases for managing rooms.

use std::sync::Arc;

use domotica_domain::device::{Device, DeviceKind};
use domotica_domain::error::{DomoticaError, NotFoundError};
use domotica_domain::home::Home;
use domotica_domain::room::{Room, RoomKind};
use domotica_domain::rules;
use serde::Serialize;

use crate::ports::HomeStore;
use crate::unit_of_work::UnitOfWork;

/// A room with its device counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RoomKind,
    pub light_count: usize,
    pub thermostat_count: usize,
    pub fan_count: usize,
    pub oven_count: usize,
    pub total_devices: usize,
}

impl RoomSummary {
    fn of(home: &Home, room: &Room) -> Self {
        let count = |kind: DeviceKind| {
            home.devices_in(&room.id)
                .filter(|device| device.kind() == kind)
                .count()
        };
        Self {
            id: room.id.to_string(),
            name: room.name.clone(),
            kind: room.kind,
            light_count: count(DeviceKind::Light),
            thermostat_count: count(DeviceKind::Thermostat),
            fan_count: count(DeviceKind::Fan),
            oven_count: count(DeviceKind::Oven),
            total_devices: room.device_ids.len(),
        }
    }
}

/// A room together with the devices it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomDetail {
    #[serde(flatten)]
    pub room: Room,
    pub devices: Vec<Device>,
}

/// Overview of the whole home.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeStatus {
    pub rooms: Vec<RoomSummary>,
    pub devices: Vec<Device>,
    pub total_rooms: usize,
    pub total_devices: usize,
    pub max_rooms: usize,
}

/// Application service for room operations.
pub struct RoomService<S> {
    uow: Arc<UnitOfWork<S>>,
}

impl<S: HomeStore> RoomService<S> {
    /// Create a new service running on the given unit of work.
    pub fn new(uow: Arc<UnitOfWork<S>>) -> Self {
        Self { uow }
    }

    /// List every room with its device counts.
    ///
    /// # Errors
    ///
    /// Returns a storage or corrupt-state error from the reload.
    #[tracing::instrument(skip(self))]
    pub async fn list_rooms(&self) -> Result<Vec<RoomSummary>, DomoticaError> {
        self.uow
            .read(|home| Ok(home.rooms().map(|room| RoomSummary::of(home, room)).collect()))
            .await
    }

    /// Look up a room by name, with its devices.
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::NotFound`] when no room carries `name`.
    #[tracing::instrument(skip(self))]
    pub async fn get_room(&self, name: &str) -> Result<RoomDetail, DomoticaError> {
        self.uow
            .read(|home| {
                let room = home.require_room_named(name)?;
                Ok(RoomDetail {
                    room: room.clone(),
                    devices: home.devices_in(&room.id).cloned().collect(),
                })
            })
            .await
    }

    /// Add an empty room of `kind`, named after the kind and suffixed with the
    /// smallest free number when the plain name is taken.
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::Rule`] when the home already has the maximum
    /// number of rooms.
    #[tracing::instrument(skip(self))]
    pub async fn add_room(&self, kind: RoomKind) -> Result<Room, DomoticaError> {
        let room = self
            .uow
            .write(|home| {
                rules::can_add_room(home)?;
                let name = rules::resolve_room_name(home, kind);
                let id = home.insert_room(kind, name);
                let room = home
                    .room(&id)
                    .cloned()
                    .ok_or_else(|| NotFoundError::room(id.as_str()))?;
                Ok(room)
            })
            .await?;
        tracing::info!(room_id = %room.id, room_name = %room.name, "room added");
        Ok(room)
    }

    /// Rename a room. Renaming a room to its current name changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::NotFound`] for an unknown room,
    /// [`DomoticaError::Validation`] for a blank name and
    /// [`DomoticaError::Rule`] when another room already uses `new_name`.
    #[tracing::instrument(skip(self))]
    pub async fn rename_room(
        &self,
        old_name: &str,
        new_name: &str,
    ) -> Result<Room, DomoticaError> {
        if old_name == new_name {
            return self
                .uow
                .read(|home| Ok(home.require_room_named(old_name)?.clone()))
                .await;
        }
        let room = self
            .uow
            .write(|home| {
                let id = home.require_room_named(old_name)?.id.clone();
                rules::can_rename_room(home, &id, new_name)?;
                home.rename_room(&id, new_name)?;
                let room = home
                    .room(&id)
                    .cloned()
                    .ok_or_else(|| NotFoundError::room(id.as_str()))?;
                Ok(room)
            })
            .await?;
        tracing::info!(room_id = %room.id, old_name, new_name, "room renamed");
        Ok(room)
    }

    /// Delete an empty room.
    ///
    /// # Errors
    ///
    /// Returns [`DomoticaError::NotFound`] for an unknown room and
    /// [`DomoticaError::Rule`] while it still holds devices.
    #[tracing::instrument(skip(self))]
    pub async fn delete_room(&self, name: &str) -> Result<Room, DomoticaError> {
        let room = self
            .uow
            .write(|home| {
                let id = home.require_room_named(name)?.id.clone();
                rules::can_delete_room(home, &id)?;
                Ok(home.remove_room(&id)?)
            })
            .await?;
        tracing::info!(room_id = %room.id, room_name = %room.name, "room deleted");
        Ok(room)
    }

    /// Overview of every room and device.
    ///
    /// # Errors
    ///
    /// Returns a storage or corrupt-state error from the reload.
    #[tracing::instrument(skip(self))]
    pub async fn status(&self) -> Result<HomeStatus, DomoticaError> {
        self.uow
            .read(|home| {
                Ok(HomeStatus {
                    rooms: home.rooms().map(|room| RoomSummary::of(home, room)).collect(),
                    devices: home.devices().cloned().collect(),
                    total_rooms: home.room_count(),
                    total_devices: home.device_count(),
                    max_rooms: rules::MAX_ROOMS,
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryHomeStore;
    use domotica_domain::error::{RuleViolation, ValidationError};
    use domotica_domain::id::{DeviceId, IdSequences};

    fn service() -> RoomService<InMemoryHomeStore> {
        RoomService::new(Arc::new(UnitOfWork::new(InMemoryHomeStore::default())))
    }

    #[tokio::test]
    async fn should_list_default_living_room_with_counts() {
        let rooms = service().list_rooms().await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].name, "living");
        assert_eq!(rooms[0].light_count, 1);
        assert_eq!(rooms[0].thermostat_count, 1);
        assert_eq!(rooms[0].fan_count, 0);
        assert_eq!(rooms[0].total_devices, 2);
    }

    #[tokio::test]
    async fn should_return_room_with_devices() {
        let detail = service().get_room("living").await.unwrap();
        let ids: Vec<&str> = detail.devices.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["light-01", "thermo-01"]);
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_room() {
        let result = service().get_room("garaje").await;
        assert!(matches!(result, Err(DomoticaError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_refuse_seventh_room_without_creating_it() {
        let service = service();
        for kind in [
            RoomKind::Kitchen,
            RoomKind::Bathroom,
            RoomKind::Bedroom,
            RoomKind::Bedroom,
            RoomKind::Dining,
        ] {
            service.add_room(kind).await.unwrap();
        }

        let result = service.add_room(RoomKind::Bedroom).await;

        assert!(matches!(
            result,
            Err(DomoticaError::Rule(RuleViolation::CapacityExceeded { limit: 6, .. }))
        ));
        assert_eq!(service.list_rooms().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn should_number_rooms_of_same_kind_and_reuse_freed_suffix() {
        let service = service();
        let first = service.add_room(RoomKind::Bedroom).await.unwrap();
        let second = service.add_room(RoomKind::Bedroom).await.unwrap();
        let third = service.add_room(RoomKind::Bedroom).await.unwrap();
        assert_eq!(first.name, "dormitorio");
        assert_eq!(second.name, "dormitorio 2");
        assert_eq!(third.name, "dormitorio 3");

        service.delete_room("dormitorio 2").await.unwrap();
        let again = service.add_room(RoomKind::Bedroom).await.unwrap();

        assert_eq!(again.name, "dormitorio 2");
        assert_ne!(again.id, second.id);
    }

    #[tokio::test]
    async fn should_refuse_deleting_room_until_empty() {
        let uow = Arc::new(UnitOfWork::new(InMemoryHomeStore::default()));
        let service = RoomService::new(Arc::clone(&uow));

        let result = service.delete_room("living").await;
        assert!(matches!(
            result,
            Err(DomoticaError::Rule(RuleViolation::RoomNotEmpty { .. }))
        ));

        uow.write(|home| {
            home.remove_device(&DeviceId::from("light-01"))?;
            home.remove_device(&DeviceId::from("thermo-01"))?;
            Ok(())
        })
        .await
        .unwrap();

        service.delete_room("living").await.unwrap();
        assert!(service.list_rooms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_rename_room() {
        let service = service();
        let room = service.rename_room("living", "salón").await.unwrap();
        assert_eq!(room.name, "salón");
        assert!(service.get_room("salón").await.is_ok());
        assert!(matches!(
            service.get_room("living").await,
            Err(DomoticaError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_reject_rename_onto_taken_name() {
        let service = service();
        service.add_room(RoomKind::Kitchen).await.unwrap();

        let result = service.rename_room("living", "cocina").await;

        assert!(matches!(
            result,
            Err(DomoticaError::Rule(RuleViolation::NameConflict(_)))
        ));
        assert!(service.get_room("living").await.is_ok());
    }

    #[tokio::test]
    async fn should_reject_blank_name() {
        let result = service().rename_room("living", "  ").await;
        assert!(matches!(
            result,
            Err(DomoticaError::Validation(ValidationError::EmptyName))
        ));
    }

    #[tokio::test]
    async fn should_treat_rename_to_same_name_as_noop() {
        let store = InMemoryHomeStore::default();
        let uow = Arc::new(UnitOfWork::new(store));
        let service = RoomService::new(Arc::clone(&uow));

        let room = service.rename_room("living", "living").await.unwrap();

        assert_eq!(room.name, "living");
        assert_eq!(uow.store().save_count(), 0);
    }

    #[tokio::test]
    async fn should_refuse_room_once_identifiers_run_out() {
        let sequences = IdSequences {
            room: u32::MAX - 1,
            ..IdSequences::default()
        };
        let home = Home::from_parts(Vec::new(), Vec::new(), sequences).unwrap();
        let uow = Arc::new(UnitOfWork::new(InMemoryHomeStore::with_home(home.clone())));
        let service = RoomService::new(Arc::clone(&uow));

        let result = service.add_room(RoomKind::Kitchen).await;

        assert!(matches!(
            result,
            Err(DomoticaError::Rule(RuleViolation::SequenceExhausted("room")))
        ));
        assert_eq!(uow.store().save_count(), 0);
        assert_eq!(uow.store().persisted(), home);
    }

    #[tokio::test]
    async fn should_report_status_totals() {
        let service = service();
        service.add_room(RoomKind::Kitchen).await.unwrap();

        let status = service.status().await.unwrap();

        assert_eq!(status.total_rooms, 2);
        assert_eq!(status.total_devices, 2);
        assert_eq!(status.max_rooms, 6);
        assert_eq!(status.devices.len(), 2);
    }

    #[tokio::test]
    async fn should_serialize_summary_with_type_key() {
        let rooms = service().list_rooms().await.unwrap();
        let value = serde_json::to_value(&rooms[0]).unwrap();
        assert_eq!(value["type"], "living");
        assert_eq!(value["light_count"], 1);
    }
}
