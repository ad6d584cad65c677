//! Control panel: pick a location, an item kind and a device, then command it.

use std::collections::HashMap;

use simhome_domain::device::{
    DoorAction, DoorState, ItemKind, LightState, Window, WindowAction, WindowState,
};
use simhome_domain::error::{NotFoundError, SelectionError, SimHomeError};
use simhome_domain::event::HouseEvent;
use simhome_domain::id::{DoorId, RoomPosition};
use simhome_domain::location::{Location, LocationKey};
use simhome_domain::parameters::User;
use simhome_domain::selection::{DeviceRef, Selection};

use crate::ports::{EventPublisher, HouseLayout, Parameters};
use crate::services::command::{DeviceCommand, PendingCommand};

/// Operator-facing control panel over the house.
///
/// Commands take `&mut self`: a command holds the panel until its remote
/// call has been settled, so nothing can re-select in the meantime.
pub struct ControlPanel<H, P, E> {
    house: H,
    parameters: P,
    publisher: E,
    locations: Vec<Location>,
    user: Option<User>,
    selection: Selection,
    // state each door had before it was locked from this panel
    door_memory: HashMap<(RoomPosition, DoorId), DoorState>,
}

impl<H, P, E> ControlPanel<H, P, E>
where
    H: HouseLayout,
    P: Parameters,
    E: EventPublisher,
{
    /// Create a panel with nothing loaded; call [`mount`](Self::mount) next.
    pub fn new(house: H, parameters: P, publisher: E) -> Self {
        Self {
            house,
            parameters,
            publisher,
            locations: Vec::new(),
            user: None,
            selection: Selection::Idle,
            door_memory: HashMap::new(),
        }
    }

    /// Load the location registry and the current user.
    ///
    /// # Errors
    ///
    /// Returns the error of whichever remote call failed.
    #[tracing::instrument(skip(self))]
    pub async fn mount(&mut self) -> Result<(), SimHomeError> {
        let locations = self.house.get_all_locations().await?;
        let user = self.parameters.get_user().await?;
        self.set_locations(locations);
        self.user = Some(user);
        tracing::debug!(locations = self.locations.len(), "control panel mounted");
        Ok(())
    }

    /// Reload everything, clear the selection and forget remembered
    /// pre-lock door states.
    ///
    /// # Errors
    ///
    /// Returns the error of whichever remote call failed, leaving the
    /// previous locations and user in place; the selection and the door
    /// memory are cleared regardless.
    #[tracing::instrument(skip(self))]
    pub async fn reset_all(&mut self) -> Result<(), SimHomeError> {
        self.selection = Selection::Idle;
        self.door_memory.clear();
        self.mount().await
    }

    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Select the location addressed by `key`, using a fresh copy from the
    /// registry so that device states are current.
    ///
    /// # Errors
    ///
    /// Returns [`SimHomeError::NotFound`] when the registry has no such
    /// location, or the registry error.
    #[tracing::instrument(skip(self), fields(location = %key))]
    pub async fn select_location(&mut self, key: LocationKey) -> Result<(), SimHomeError> {
        let locations = self.house.get_all_locations().await?;
        self.set_locations(locations);
        let location = self
            .locations
            .iter()
            .find(|l| l.key() == key)
            .cloned()
            .ok_or_else(|| NotFoundError {
                entity: "Location",
                id: key.to_string(),
            })?;
        self.selection = Selection::select_location(location);
        Ok(())
    }

    /// Select a location by its label (room name or outdoor place).
    ///
    /// # Errors
    ///
    /// Same as [`select_location`](Self::select_location).
    pub async fn select_location_by_label(&mut self, label: &str) -> Result<(), SimHomeError> {
        let key = self
            .locations
            .iter()
            .find(|l| l.label().eq_ignore_ascii_case(label))
            .map(Location::key)
            .ok_or_else(|| NotFoundError {
                entity: "Location",
                id: label.to_string(),
            })?;
        self.select_location(key).await
    }

    /// # Errors
    ///
    /// See [`Selection::select_item_kind`].
    pub fn select_item_kind(&mut self, kind: ItemKind) -> Result<(), SimHomeError> {
        self.selection = self.selection.select_item_kind(kind)?;
        Ok(())
    }

    /// # Errors
    ///
    /// See [`Selection::select_device`].
    pub fn select_device(&mut self, device: DeviceRef) -> Result<(), SimHomeError> {
        self.selection = self.selection.select_device(device)?;
        Ok(())
    }

    /// Actions offered for the selected window.
    #[must_use]
    pub fn window_actions(&self) -> Vec<WindowAction> {
        self.selection
            .selected_window()
            .map(Window::actions)
            .unwrap_or_default()
    }

    /// Actions offered for the selected door, unlocking to the remembered state.
    #[must_use]
    pub fn door_actions(&self) -> Vec<DoorAction> {
        let Some(door) = self.selection.selected_door() else {
            return Vec::new();
        };
        door.actions(self.remembered_unlock_state(door.id))
    }

    /// Light states reachable while the light kind is active.
    #[must_use]
    pub fn light_actions(&self) -> Vec<LightState> {
        match (self.selection.item_kind(), self.selection.location()) {
            (Some(ItemKind::Light), Some(location)) => vec![location.light().state.toggled()],
            _ => Vec::new(),
        }
    }

    /// Open the selected window, or close it. Closing lifts any block.
    ///
    /// # Errors
    ///
    /// - [`SimHomeError::Selection`] without a selected window
    /// - [`SimHomeError::Transition`] for a blocked window or an unchanged state
    /// - the remote error, after rolling back
    #[tracing::instrument(skip(self))]
    pub async fn set_window_state(&mut self, target: WindowState) -> Result<(), SimHomeError> {
        let window = self
            .selection
            .selected_window()
            .ok_or(SelectionError::NoDevice(ItemKind::Window))?;
        window.check_transition(target)?;
        let (id, current) = (window.id, window.state);
        let position = self.selected_position()?;

        let pending = PendingCommand::new(
            LocationKey::Room { position },
            DeviceCommand::Window { id, state: current },
            DeviceCommand::Window { id, state: target },
        );
        let outcome = match target {
            WindowState::Open => self.house.open_window(position, id).await,
            WindowState::Closed | WindowState::Blocked => {
                self.house.unblock_window(position, id).await
            }
        };
        pending
            .finish(&mut self.selection, &self.publisher, outcome)
            .await
    }

    /// Switch the light of the selected location.
    ///
    /// # Errors
    ///
    /// - [`SimHomeError::Selection`] unless the light kind is active
    /// - the remote error, after rolling back
    #[tracing::instrument(skip(self))]
    pub async fn set_light_state(&mut self, target: LightState) -> Result<(), SimHomeError> {
        let location = self
            .selection
            .location()
            .ok_or(SelectionError::NoLocation)?;
        let active = self.selection.item_kind();
        if active != Some(ItemKind::Light) {
            return Err(SelectionError::KindMismatch {
                requested: ItemKind::Light,
                active,
            }
            .into());
        }
        let key = location.key();
        let current = location.light().state;

        let pending = PendingCommand::new(
            key,
            DeviceCommand::Light { state: current },
            DeviceCommand::Light { state: target },
        );
        let outcome = match key {
            LocationKey::Outdoor { place } => {
                self.house.modify_outside_light_state(place, target).await
            }
            LocationKey::Room { position } => {
                self.house.modify_room_light_state(position, target).await
            }
        };
        pending
            .finish(&mut self.selection, &self.publisher, outcome)
            .await
    }

    /// Move the selected door to `target`.
    ///
    /// A locked door can only be unlocked, back to the state it had before
    /// it was locked here, or closed when that is unknown.
    ///
    /// # Errors
    ///
    /// - [`SimHomeError::Selection`] without a selected door
    /// - [`SimHomeError::Transition`] when `target` is not reachable
    /// - the remote error, after rolling back
    #[tracing::instrument(skip(self))]
    pub async fn set_door_state(&mut self, target: DoorState) -> Result<(), SimHomeError> {
        let door = self
            .selection
            .selected_door()
            .ok_or(SelectionError::NoDevice(ItemKind::Door))?;
        door.check_transition(target, self.remembered_unlock_state(door.id))?;
        let (id, current) = (door.id, door.state);
        let position = self.selected_position()?;

        let pending = PendingCommand::new(
            LocationKey::Room { position },
            DeviceCommand::Door { id, state: current },
            DeviceCommand::Door { id, state: target },
        );
        let outcome = self.house.change_door_state(position, id, target).await;
        pending
            .finish(&mut self.selection, &self.publisher, outcome)
            .await?;

        if target == DoorState::Locked {
            self.door_memory.insert((position, id), current);
        } else if current == DoorState::Locked {
            self.door_memory.remove(&(position, id));
        }
        Ok(())
    }

    /// React to a bus event.
    ///
    /// Handling is idempotent: the same event twice leaves the panel as once.
    ///
    /// # Errors
    ///
    /// Returns the registry error raised while resynchronizing.
    #[tracing::instrument(skip(self, event), fields(event = event.name()))]
    pub async fn handle_event(&mut self, event: &HouseEvent) -> Result<(), SimHomeError> {
        match event {
            HouseEvent::PermissionsChanged => self.reset_all().await,
            HouseEvent::LayoutChanged(change) => {
                let locations = self.house.get_all_locations().await?;
                self.set_locations(locations);
                if let Some(fresh) = self.locations.iter().find(|l| l.key() == change.location) {
                    self.selection = self.selection.refresh(fresh.clone());
                }
                tracing::debug!(location = %change.location, "control panel resynchronized");
                Ok(())
            }
        }
    }

    /// Replace the location snapshot. A remembered pre-lock state only
    /// survives while its door is still locked.
    fn set_locations(&mut self, locations: Vec<Location>) {
        self.door_memory.retain(|(position, id), _| {
            locations
                .iter()
                .find(|l| l.key() == LocationKey::Room { position: *position })
                .and_then(|l| l.find_door(*id))
                .is_some_and(|door| door.state == DoorState::Locked)
        });
        self.locations = locations;
    }

    fn remembered_unlock_state(&self, id: DoorId) -> Option<DoorState> {
        let position = self.selected_position().ok()?;
        self.door_memory.get(&(position, id)).copied()
    }

    fn selected_position(&self) -> Result<RoomPosition, SelectionError> {
        match self.selection.location().map(Location::key) {
            Some(LocationKey::Room { position }) => Ok(position),
            Some(LocationKey::Outdoor { place }) => Err(SelectionError::IndoorOnly {
                kind: self.selection.item_kind().unwrap_or(ItemKind::Window),
                location: place.to_string(),
            }),
            None => Err(SelectionError::NoLocation),
        }
    }
}
