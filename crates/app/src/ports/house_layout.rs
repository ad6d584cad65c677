//! House layout port: the device/location registry.
//!
//! The registry owns the canonical state of every location and device.
//! Commands sent through it are acknowledged with `Ok(())`; callers never
//! receive the updated record and must re-fetch it if they need it.

use std::future::Future;
use std::sync::Arc;

use simhome_domain::device::{DoorState, LightState};
use simhome_domain::error::SimHomeError;
use simhome_domain::id::{DoorId, RoomPosition, WindowId};
use simhome_domain::location::{Location, OutdoorPlace};

/// Remote registry of locations and the devices they hold.
pub trait HouseLayout {
    /// All locations of the house, in registry order.
    fn get_all_locations(&self)
    -> impl Future<Output = Result<Vec<Location>, SimHomeError>> + Send;

    /// Open a window.
    fn open_window(
        &self,
        position: RoomPosition,
        window_id: WindowId,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send;

    /// Lift the block on a window, leaving it closed.
    fn unblock_window(
        &self,
        position: RoomPosition,
        window_id: WindowId,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send;

    /// Move a door to `state`.
    fn change_door_state(
        &self,
        position: RoomPosition,
        door_id: DoorId,
        state: DoorState,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send;

    /// Switch the light of a room.
    fn modify_room_light_state(
        &self,
        position: RoomPosition,
        state: LightState,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send;

    /// Switch the light of an outdoor area.
    fn modify_outside_light_state(
        &self,
        place: OutdoorPlace,
        state: LightState,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send;

    /// Replace the whole house with `locations`.
    fn create_layout(
        &self,
        locations: Vec<Location>,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send;
}

impl<T: HouseLayout + Send + Sync> HouseLayout for Arc<T> {
    fn get_all_locations(
        &self,
    ) -> impl Future<Output = Result<Vec<Location>, SimHomeError>> + Send {
        (**self).get_all_locations()
    }

    fn open_window(
        &self,
        position: RoomPosition,
        window_id: WindowId,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        (**self).open_window(position, window_id)
    }

    fn unblock_window(
        &self,
        position: RoomPosition,
        window_id: WindowId,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        (**self).unblock_window(position, window_id)
    }

    fn change_door_state(
        &self,
        position: RoomPosition,
        door_id: DoorId,
        state: DoorState,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        (**self).change_door_state(position, door_id, state)
    }

    fn modify_room_light_state(
        &self,
        position: RoomPosition,
        state: LightState,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        (**self).modify_room_light_state(position, state)
    }

    fn modify_outside_light_state(
        &self,
        place: OutdoorPlace,
        state: LightState,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        (**self).modify_outside_light_state(place, state)
    }

    fn create_layout(
        &self,
        locations: Vec<Location>,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        (**self).create_layout(locations)
    }
}
