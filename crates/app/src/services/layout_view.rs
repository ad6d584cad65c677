//! Layout view: a snapshot of every location, kept in sync with change events.

use tokio_stream::StreamExt;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use simhome_domain::error::SimHomeError;
use simhome_domain::event::HouseEvent;
use simhome_domain::location::{Location, LocationKey};

use crate::event_bus::Subscription;
use crate::ports::HouseLayout;

pub struct LayoutView<H> {
    house: H,
    locations: Vec<Location>,
    revision: u64,
}

impl<H: HouseLayout> LayoutView<H> {
    pub fn new(house: H) -> Self {
        Self {
            house,
            locations: Vec::new(),
            revision: 0,
        }
    }

    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Bumped every time the snapshot actually changes.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn find(&self, key: LocationKey) -> Option<&Location> {
        self.locations.iter().find(|l| l.key() == key)
    }

    /// Replace the whole snapshot with the registry's.
    ///
    /// # Errors
    ///
    /// Returns the registry error, leaving the snapshot untouched.
    pub async fn reload(&mut self) -> Result<(), SimHomeError> {
        let fresh = self.house.get_all_locations().await?;
        if fresh != self.locations {
            self.locations = fresh;
            self.revision += 1;
        }
        Ok(())
    }

    /// Apply one bus event. Returns whether the snapshot changed.
    ///
    /// Only the location named by a layout change is replaced; a location
    /// the registry no longer has is removed.
    ///
    /// # Errors
    ///
    /// Returns the registry error, leaving the snapshot untouched.
    pub async fn apply(&mut self, event: &HouseEvent) -> Result<bool, SimHomeError> {
        let HouseEvent::LayoutChanged(change) = event else {
            return Ok(false);
        };
        let fresh = self
            .house
            .get_all_locations()
            .await?
            .into_iter()
            .find(|l| l.key() == change.location);
        let index = self
            .locations
            .iter()
            .position(|l| l.key() == change.location);

        let changed = match (index, fresh) {
            (Some(i), Some(fresh)) if self.locations[i] != fresh => {
                self.locations[i] = fresh;
                true
            }
            (Some(i), None) => {
                self.locations.remove(i);
                true
            }
            (None, Some(fresh)) => {
                self.locations.push(fresh);
                true
            }
            _ => false,
        };
        if changed {
            self.revision += 1;
            tracing::debug!(location = %change.location, revision = self.revision, "layout view resynchronized");
        }
        Ok(changed)
    }

    /// Drive the view from `subscription` until the bus closes.
    ///
    /// A lagging subscription falls back to a full reload.
    pub async fn run(mut self, subscription: Subscription) -> Self {
        let mut stream = subscription.into_stream();
        while let Some(item) = stream.next().await {
            let result = match item {
                Ok(event) => self.apply(&event).await.map(|_| ()),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "layout view lagged, reloading");
                    self.reload().await
                }
            };
            if let Err(err) = result {
                tracing::warn!(error = %err, "layout view failed to resynchronize");
            }
        }
        tracing::debug!(revision = self.revision, "layout view stopped");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::{Arc, Mutex};

    use simhome_domain::device::{DoorState, LightState};
    use simhome_domain::event::ChangedDevice;
    use simhome_domain::id::{DoorId, RoomPosition, WindowId};
    use simhome_domain::location::{OutdoorPlace, Room};

    use crate::event_bus::InProcessEventBus;
    use crate::ports::EventPublisher;

    struct SharedHouse(Mutex<Vec<Location>>);

    impl SharedHouse {
        fn with(locations: Vec<Location>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(locations)))
        }

        fn switch_light(&self, key: LocationKey, state: LightState) {
            let mut locations = self.0.lock().unwrap();
            let location = locations.iter_mut().find(|l| l.key() == key).unwrap();
            location.light_mut().state = state;
        }
    }

    impl HouseLayout for SharedHouse {
        fn get_all_locations(
            &self,
        ) -> impl Future<Output = Result<Vec<Location>, SimHomeError>> + Send {
            let result = Ok(self.0.lock().unwrap().clone());
            async move { result }
        }

        fn open_window(
            &self,
            _position: RoomPosition,
            _window_id: WindowId,
        ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
            async { Ok(()) }
        }

        fn unblock_window(
            &self,
            _position: RoomPosition,
            _window_id: WindowId,
        ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
            async { Ok(()) }
        }

        fn change_door_state(
            &self,
            _position: RoomPosition,
            _door_id: DoorId,
            _state: DoorState,
        ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
            async { Ok(()) }
        }

        fn modify_room_light_state(
            &self,
            _position: RoomPosition,
            _state: LightState,
        ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
            async { Ok(()) }
        }

        fn modify_outside_light_state(
            &self,
            _place: OutdoorPlace,
            _state: LightState,
        ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
            async { Ok(()) }
        }

        fn create_layout(
            &self,
            locations: Vec<Location>,
        ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
            *self.0.lock().unwrap() = locations;
            async { Ok(()) }
        }
    }

    const BACKYARD: LocationKey = LocationKey::Outdoor {
        place: OutdoorPlace::Backyard,
    };

    fn house() -> Arc<SharedHouse> {
        let kitchen = Room::builder().position(0, 0).name("Kitchen").build().unwrap();
        SharedHouse::with(vec![kitchen.into(), Location::outdoor(OutdoorPlace::Backyard)])
    }

    #[tokio::test]
    async fn should_replace_only_the_changed_location() {
        let house = house();
        let mut view = LayoutView::new(Arc::clone(&house));
        view.reload().await.unwrap();
        assert_eq!(view.revision(), 1);

        house.switch_light(BACKYARD, LightState::On);
        let kitchen_key = LocationKey::Room {
            position: RoomPosition::new(0, 0),
        };
        house.switch_light(kitchen_key, LightState::On);

        let changed = view
            .apply(&HouseEvent::layout_changed(BACKYARD, ChangedDevice::Light))
            .await
            .unwrap();

        assert!(changed);
        assert_eq!(view.revision(), 2);
        assert_eq!(view.find(BACKYARD).unwrap().light().state, LightState::On);
        assert_eq!(view.find(kitchen_key).unwrap().light().state, LightState::Off);
    }

    #[tokio::test]
    async fn should_be_idempotent() {
        let house = house();
        let mut view = LayoutView::new(Arc::clone(&house));
        view.reload().await.unwrap();
        house.switch_light(BACKYARD, LightState::On);
        let event = HouseEvent::layout_changed(BACKYARD, ChangedDevice::Light);

        assert!(view.apply(&event).await.unwrap());
        assert!(!view.apply(&event).await.unwrap());
        assert_eq!(view.revision(), 2);
    }

    #[tokio::test]
    async fn should_ignore_permissions_change() {
        let house = house();
        let mut view = LayoutView::new(house);
        view.reload().await.unwrap();

        let changed = view.apply(&HouseEvent::PermissionsChanged).await.unwrap();

        assert!(!changed);
        assert_eq!(view.revision(), 1);
    }

    #[tokio::test]
    async fn should_drop_location_missing_from_registry() {
        let house = house();
        let mut view = LayoutView::new(Arc::clone(&house));
        view.reload().await.unwrap();
        house.0.lock().unwrap().retain(|l| l.key() != BACKYARD);

        let changed = view
            .apply(&HouseEvent::layout_changed(BACKYARD, ChangedDevice::Light))
            .await
            .unwrap();

        assert!(changed);
        assert!(view.find(BACKYARD).is_none());
        assert_eq!(view.locations().len(), 1);
    }

    #[tokio::test]
    async fn should_run_until_bus_closes() {
        let house = house();
        let bus = InProcessEventBus::new(8);
        let view = LayoutView::new(Arc::clone(&house));
        let subscription = bus.subscribe();

        house.switch_light(BACKYARD, LightState::On);
        bus.publish(HouseEvent::layout_changed(BACKYARD, ChangedDevice::Light))
            .await
            .unwrap();
        drop(bus);

        let view = view.run(subscription).await;

        assert_eq!(view.find(BACKYARD).unwrap().light().state, LightState::On);
    }

    #[tokio::test]
    async fn should_reload_after_lagging() {
        let house = house();
        let bus = InProcessEventBus::new(1);
        let view = LayoutView::new(Arc::clone(&house));
        let subscription = bus.subscribe();

        bus.publish(HouseEvent::PermissionsChanged).await.unwrap();
        bus.publish(HouseEvent::PermissionsChanged).await.unwrap();
        drop(bus);

        let view = view.run(subscription).await;

        assert_eq!(view.locations().len(), 2);
        assert_eq!(view.revision(), 1);
    }
}
