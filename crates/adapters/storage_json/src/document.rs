//! On-disk shape of the home.

use domotica_domain::device::Device;
use domotica_domain::error::{CorruptStateError, DomoticaError};
use domotica_domain::home::Home;
use domotica_domain::id::IdSequences;
use domotica_domain::room::Room;
use domotica_domain::time::Timestamp;
use serde::{Deserialize, Serialize};

/// The whole home as stored in the backing file.
///
/// `counters` and `saved_at` may be missing from files written by older
/// versions; sequences are then rebuilt from the identifiers in use.
#[derive(Debug, Serialize, Deserialize)]
pub struct HomeDocument {
    pub rooms: Vec<Room>,
    pub devices: Vec<Device>,
    #[serde(default)]
    pub counters: IdSequences,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<Timestamp>,
}

impl HomeDocument {
    #[must_use]
    pub fn from_home(home: &Home, saved_at: Timestamp) -> Self {
        Self {
            rooms: home.rooms().cloned().collect(),
            devices: home.devices().cloned().collect(),
            counters: home.sequences().clone(),
            saved_at: Some(saved_at),
        }
    }

    /// Rebuild the home, checking every invariant.
    ///
    /// # Errors
    ///
    /// Returns [`CorruptStateError`] when the document breaks an invariant.
    pub fn into_home(self) -> Result<Home, CorruptStateError> {
        Home::from_parts(self.rooms, self.devices, self.counters).map_err(|err: DomoticaError| {
            CorruptStateError::new(format!("backing file holds an invalid home: {err}"), err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domotica_domain::device::{DeviceState, OvenState};
    use domotica_domain::id::DeviceId;
    use domotica_domain::room::RoomKind;

    #[test]
    fn should_write_type_keys_and_counters() {
        let doc = HomeDocument::from_home(&Home::with_defaults(), domotica_domain::time::now());
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["rooms"][0]["type"], "living");
        assert_eq!(value["rooms"][0]["device_ids"][0], "light-01");
        assert_eq!(value["devices"][1]["type"], "thermostat");
        assert_eq!(value["devices"][1]["state"]["temperature"], 21);
        assert_eq!(value["counters"]["light"], 2);
        assert!(value["saved_at"].is_string());
    }

    #[test]
    fn should_read_legacy_document_without_counters() {
        let raw = r#"{
            "rooms": [
                { "id": "room-03", "name": "cocina", "type": "cocina", "device_ids": ["oven-02"] }
            ],
            "devices": [
                {
                    "id": "oven-02",
                    "type": "oven",
                    "room_id": "room-03",
                    "state": { "temperature": 200, "timer": 15, "active": true }
                }
            ]
        }"#;
        let doc: HomeDocument = serde_json::from_str(raw).unwrap();
        let mut home = doc.into_home().unwrap();

        assert_eq!(
            home.device(&DeviceId::from("oven-02")).unwrap().state,
            DeviceState::Oven(OvenState {
                temperature: 200,
                timer_minutes: 15,
                active: true,
            })
        );
        assert_eq!(home.insert_room(RoomKind::Living, "living").as_str(), "room-04");
    }

    #[test]
    fn should_reject_document_breaking_placement_rule() {
        let raw = r#"{
            "rooms": [
                { "id": "room-01", "name": "baño", "type": "baño", "device_ids": ["fan-01"] }
            ],
            "devices": [
                { "id": "fan-01", "type": "fan", "room_id": "room-01", "state": { "speed": 1 } }
            ]
        }"#;
        let doc: HomeDocument = serde_json::from_str(raw).unwrap();
        assert!(doc.into_home().is_err());
    }
}
