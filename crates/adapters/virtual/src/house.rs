//! In-memory location registry.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use simhome_app::ports::HouseLayout;
use simhome_domain::device::{Direction, DoorState, LightState, WindowState};
use simhome_domain::error::SimHomeError;
use simhome_domain::id::{DoorId, RoomPosition, WindowId};
use simhome_domain::location::{Location, LocationKey, OutdoorPlace, Room};

use crate::error::VirtualError;

/// A simulated house that acknowledges commands and keeps their effect.
pub struct VirtualHouse {
    locations: Mutex<Vec<Location>>,
    reachable: AtomicBool,
}

impl Default for VirtualHouse {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl VirtualHouse {
    #[must_use]
    pub fn new(locations: Vec<Location>) -> Self {
        Self {
            locations: Mutex::new(locations),
            reachable: AtomicBool::new(true),
        }
    }

    /// Four rooms on two rows plus both outdoor areas.
    ///
    /// # Errors
    ///
    /// Only fails if a built-in room is invalid.
    pub fn demo() -> Result<Self, SimHomeError> {
        let kitchen = Room::builder()
            .position(0, 0)
            .name("Kitchen")
            .window(Direction::North, WindowState::Closed)
            .door(Direction::South, DoorState::Closed)
            .build()?;
        let living = Room::builder()
            .position(0, 1)
            .name("Living Room")
            .light(LightState::On)
            .window(Direction::North, WindowState::Open)
            .window(Direction::East, WindowState::Blocked)
            .door(Direction::West, DoorState::Open)
            .build()?;
        let bedroom = Room::builder()
            .position(1, 0)
            .name("Bedroom")
            .window(Direction::West, WindowState::Closed)
            .door(Direction::North, DoorState::Locked)
            .build()?;
        let bathroom = Room::builder()
            .position(1, 1)
            .name("Bathroom")
            .window(Direction::South, WindowState::Closed)
            .door(Direction::North, DoorState::Closed)
            .build()?;

        let mut locations: Vec<Location> =
            vec![kitchen.into(), living.into(), bedroom.into(), bathroom.into()];
        locations.extend(OutdoorPlace::ALL.map(Location::outdoor));
        Ok(Self::new(locations))
    }

    /// Take the house on or off line. Offline, every call fails.
    pub fn set_reachable(&self, reachable: bool) {
        tracing::info!(reachable, "virtual house reachability changed");
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Location>> {
        self.locations.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_reachable(&self) -> Result<(), VirtualError> {
        if self.is_reachable() {
            Ok(())
        } else {
            Err(VirtualError::Unreachable)
        }
    }

    fn with_location<R>(
        &self,
        key: LocationKey,
        f: impl FnOnce(&mut Location) -> Result<R, VirtualError>,
    ) -> Result<R, VirtualError> {
        self.ensure_reachable()?;
        let mut locations = self.lock();
        let location = locations
            .iter_mut()
            .find(|l| l.key() == key)
            .ok_or(VirtualError::UnknownLocation(key))?;
        f(location)
    }

    fn set_window(
        &self,
        position: RoomPosition,
        id: WindowId,
        open: bool,
    ) -> Result<(), VirtualError> {
        self.with_location(LocationKey::Room { position }, |location| {
            let window = location
                .find_window_mut(id)
                .ok_or(VirtualError::UnknownDevice {
                    device: "window",
                    id: id.get(),
                    position,
                })?;
            if open {
                if window.state == WindowState::Blocked {
                    return Err(VirtualError::WindowBlocked {
                        id: id.get(),
                        position,
                    });
                }
                window.state = WindowState::Open;
            } else {
                window.state = WindowState::Closed;
            }
            tracing::debug!(%position, window = %id, state = %window.state, "window changed");
            Ok(())
        })
    }

    fn set_door(
        &self,
        position: RoomPosition,
        id: DoorId,
        state: DoorState,
    ) -> Result<(), VirtualError> {
        self.with_location(LocationKey::Room { position }, |location| {
            let door = location
                .find_door_mut(id)
                .ok_or(VirtualError::UnknownDevice {
                    device: "door",
                    id: id.get(),
                    position,
                })?;
            door.state = state;
            tracing::debug!(%position, door = %id, %state, "door changed");
            Ok(())
        })
    }

    fn set_light(&self, key: LocationKey, state: LightState) -> Result<(), VirtualError> {
        self.with_location(key, |location| {
            location.light_mut().state = state;
            tracing::debug!(location = %key, %state, "light changed");
            Ok(())
        })
    }

    fn replace(&self, locations: Vec<Location>) -> Result<(), VirtualError> {
        self.ensure_reachable()?;
        let mut seen = HashSet::new();
        for location in &locations {
            if let Location::Room(room) = location {
                room.validate().map_err(VirtualError::Domain)?;
            }
            if !seen.insert(location.key()) {
                return Err(VirtualError::DuplicateLocation(location.key()));
            }
        }
        tracing::info!(locations = locations.len(), "virtual house layout replaced");
        *self.lock() = locations;
        Ok(())
    }
}

impl HouseLayout for VirtualHouse {
    fn get_all_locations(
        &self,
    ) -> impl Future<Output = Result<Vec<Location>, SimHomeError>> + Send {
        let result = self
            .ensure_reachable()
            .map(|()| self.lock().clone())
            .map_err(SimHomeError::from);
        async move { result }
    }

    fn open_window(
        &self,
        position: RoomPosition,
        window_id: WindowId,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        let result = self
            .set_window(position, window_id, true)
            .map_err(SimHomeError::from);
        async move { result }
    }

    fn unblock_window(
        &self,
        position: RoomPosition,
        window_id: WindowId,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        let result = self
            .set_window(position, window_id, false)
            .map_err(SimHomeError::from);
        async move { result }
    }

    fn change_door_state(
        &self,
        position: RoomPosition,
        door_id: DoorId,
        state: DoorState,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        let result = self
            .set_door(position, door_id, state)
            .map_err(SimHomeError::from);
        async move { result }
    }

    fn modify_room_light_state(
        &self,
        position: RoomPosition,
        state: LightState,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        let result = self
            .set_light(LocationKey::Room { position }, state)
            .map_err(SimHomeError::from);
        async move { result }
    }

    fn modify_outside_light_state(
        &self,
        place: OutdoorPlace,
        state: LightState,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        let result = self
            .set_light(LocationKey::Outdoor { place }, state)
            .map_err(SimHomeError::from);
        async move { result }
    }

    fn create_layout(
        &self,
        locations: Vec<Location>,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        let result = self.replace(locations).map_err(SimHomeError::from);
        async move { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KITCHEN: RoomPosition = RoomPosition::new(0, 0);
    const LIVING: RoomPosition = RoomPosition::new(0, 1);

    fn room_window(house: &VirtualHouse, position: RoomPosition, id: u32) -> WindowState {
        house.lock()
            .iter()
            .find(|l| l.key() == LocationKey::Room { position })
            .and_then(|l| l.find_window(WindowId::new(id)))
            .map(|w| w.state)
            .unwrap()
    }

    #[tokio::test]
    async fn should_list_demo_locations_in_order() {
        let house = VirtualHouse::demo().unwrap();

        let labels: Vec<String> = house
            .get_all_locations()
            .await
            .unwrap()
            .iter()
            .map(|l| l.label().to_string())
            .collect();

        assert_eq!(
            labels,
            vec!["Kitchen", "Living Room", "Bedroom", "Bathroom", "Backyard", "Entrance"]
        );
    }

    #[tokio::test]
    async fn should_open_and_close_window() {
        let house = VirtualHouse::demo().unwrap();

        house.open_window(KITCHEN, WindowId::new(0)).await.unwrap();
        assert_eq!(room_window(&house, KITCHEN, 0), WindowState::Open);

        house.unblock_window(KITCHEN, WindowId::new(0)).await.unwrap();
        assert_eq!(room_window(&house, KITCHEN, 0), WindowState::Closed);
    }

    #[tokio::test]
    async fn should_refuse_to_open_blocked_window() {
        let house = VirtualHouse::demo().unwrap();

        let result = house.open_window(LIVING, WindowId::new(1)).await;

        assert!(matches!(result, Err(SimHomeError::Remote(_))));
        assert_eq!(room_window(&house, LIVING, 1), WindowState::Blocked);
    }

    #[tokio::test]
    async fn should_unblock_blocked_window() {
        let house = VirtualHouse::demo().unwrap();

        house.unblock_window(LIVING, WindowId::new(1)).await.unwrap();

        assert_eq!(room_window(&house, LIVING, 1), WindowState::Closed);
    }

    #[tokio::test]
    async fn should_switch_outdoor_light() {
        let house = VirtualHouse::demo().unwrap();

        house
            .modify_outside_light_state(OutdoorPlace::Entrance, LightState::On)
            .await
            .unwrap();

        let locations = house.get_all_locations().await.unwrap();
        let entrance = locations
            .iter()
            .find(|l| l.label() == "Entrance")
            .unwrap();
        assert_eq!(entrance.light().state, LightState::On);
    }

    #[tokio::test]
    async fn should_fail_every_call_while_unreachable() {
        let house = VirtualHouse::demo().unwrap();
        house.set_reachable(false);

        assert!(house.get_all_locations().await.is_err());
        assert!(house
            .change_door_state(KITCHEN, DoorId::new(0), DoorState::Open)
            .await
            .is_err());

        house.set_reachable(true);
        assert!(house
            .change_door_state(KITCHEN, DoorId::new(0), DoorState::Open)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn should_reject_unknown_device() {
        let house = VirtualHouse::demo().unwrap();

        let result = house
            .change_door_state(KITCHEN, DoorId::new(7), DoorState::Locked)
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn should_replace_layout() {
        let house = VirtualHouse::default();

        house
            .create_layout(vec![Location::outdoor(OutdoorPlace::Backyard)])
            .await
            .unwrap();

        assert_eq!(house.get_all_locations().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_reject_layout_with_duplicate_locations() {
        let house = VirtualHouse::demo().unwrap();

        let result = house
            .create_layout(vec![
                Location::outdoor(OutdoorPlace::Backyard),
                Location::outdoor(OutdoorPlace::Backyard),
            ])
            .await;

        assert!(matches!(result, Err(SimHomeError::Remote(_))));
        assert_eq!(house.get_all_locations().await.unwrap().len(), 6);
    }
}
