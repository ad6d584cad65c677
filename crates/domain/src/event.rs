//! Event: change notifications broadcast to every view of the house.
//!
//! Each layout event names the location and device that changed, so that
//! listeners can resynchronize just that part of their view.

use serde::{Deserialize, Serialize};

use crate::id::{DoorId, WindowId};
use crate::location::LocationKey;
use crate::time::{Timestamp, now};

/// Which device of a location changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ChangedDevice {
    Window(WindowId),
    Door(DoorId),
    Light,
}

/// Descriptor of a device-related change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutChange {
    pub location: LocationKey,
    pub device: ChangedDevice,
    pub timestamp: Timestamp,
}

impl LayoutChange {
    #[must_use]
    pub fn new(location: LocationKey, device: ChangedDevice) -> Self {
        Self {
            location,
            device,
            timestamp: now(),
        }
    }
}

/// Events carried by the refresh bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HouseEvent {
    /// Something device-related changed; re-fetch your view of it.
    LayoutChanged(LayoutChange),
    /// Access rights changed; fully reset any selection state.
    PermissionsChanged,
}

impl HouseEvent {
    #[must_use]
    pub fn layout_changed(location: LocationKey, device: ChangedDevice) -> Self {
        Self::LayoutChanged(LayoutChange::new(location, device))
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LayoutChanged(_) => "update_layout",
            Self::PermissionsChanged => "update_permissions",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::RoomPosition;
    use crate::location::OutdoorPlace;

    #[test]
    fn should_stamp_layout_change_with_current_time() {
        let before = now();
        let change = LayoutChange::new(
            LocationKey::Outdoor {
                place: OutdoorPlace::Backyard,
            },
            ChangedDevice::Light,
        );
        assert!(change.timestamp >= before);
    }

    #[test]
    fn should_serialize_change_descriptor() {
        let event = HouseEvent::layout_changed(
            LocationKey::Room {
                position: RoomPosition::new(0, 2),
            },
            ChangedDevice::Window(WindowId::new(1)),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "layout_changed");
        assert_eq!(json["location"]["position"]["roomId"], 2);
        assert_eq!(json["device"], serde_json::json!({"kind": "window", "id": 1}));
    }

    #[test]
    fn should_name_events_for_logging() {
        assert_eq!(HouseEvent::PermissionsChanged.name(), "update_permissions");
    }
}
