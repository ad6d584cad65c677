//! Device commands: one pending/commit/rollback path for windows, doors and lights.
//!
//! A command is recorded as pending before its remote call is issued. Once
//! the call returns, the target is committed as the confirmed state on
//! success, or the prior confirmed state is restored on failure. Either way a
//! single `LayoutChanged` event is published for the device.

use simhome_domain::device::{DoorState, LightState, WindowState};
use simhome_domain::error::SimHomeError;
use simhome_domain::event::{ChangedDevice, HouseEvent};
use simhome_domain::id::{DoorId, WindowId};
use simhome_domain::location::LocationKey;
use simhome_domain::selection::Selection;

use crate::ports::EventPublisher;

/// A device state, addressed within the selected location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    Window { id: WindowId, state: WindowState },
    Door { id: DoorId, state: DoorState },
    Light { state: LightState },
}

impl DeviceCommand {
    #[must_use]
    pub const fn changed_device(self) -> ChangedDevice {
        match self {
            Self::Window { id, .. } => ChangedDevice::Window(id),
            Self::Door { id, .. } => ChangedDevice::Door(id),
            Self::Light { .. } => ChangedDevice::Light,
        }
    }

    /// Write the state into the selection. Returns `false` when the device
    /// is no longer part of it.
    fn apply(self, selection: &mut Selection) -> bool {
        match self {
            Self::Window { id, state } => selection.set_window_state(id, state),
            Self::Door { id, state } => selection.set_door_state(id, state),
            Self::Light { state } => selection.set_light_state(state),
        }
    }
}

/// A command whose remote call is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a pending command must be finished"]
pub struct PendingCommand {
    location: LocationKey,
    previous: DeviceCommand,
    target: DeviceCommand,
}

impl PendingCommand {
    /// Record `target` as pending, remembering `previous` as the confirmed state.
    pub const fn new(location: LocationKey, previous: DeviceCommand, target: DeviceCommand) -> Self {
        Self {
            location,
            previous,
            target,
        }
    }

    #[must_use]
    pub const fn target(&self) -> DeviceCommand {
        self.target
    }

    #[must_use]
    pub const fn previous(&self) -> DeviceCommand {
        self.previous
    }

    /// Settle the command with the outcome of its remote call.
    ///
    /// Commits the target or rolls back to the previous state, then publishes
    /// one `LayoutChanged` event. A failed publish is logged, never returned.
    ///
    /// # Errors
    ///
    /// Returns the remote error unchanged after rolling back.
    pub async fn finish<E: EventPublisher>(
        self,
        selection: &mut Selection,
        publisher: &E,
        outcome: Result<(), SimHomeError>,
    ) -> Result<(), SimHomeError> {
        match &outcome {
            Ok(()) => {
                if !self.target.apply(selection) {
                    tracing::debug!(location = %self.location, "selection moved on before commit");
                }
            }
            Err(err) => {
                tracing::warn!(
                    location = %self.location,
                    target = ?self.target,
                    error = %err,
                    "remote call failed, rolling back"
                );
                self.previous.apply(selection);
            }
        }

        let event = HouseEvent::layout_changed(self.location, self.target.changed_device());
        if let Err(err) = publisher.publish(event).await {
            tracing::warn!(error = %err, "failed to publish layout change");
        }
        outcome
    }
}
