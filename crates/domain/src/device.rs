//! Devices: the windows, doors and lights a location exposes.
//!
//! Every device carries its current state; the allowed transitions out of
//! that state are defined here so that both the control panel and the
//! simulated registry agree on them.

use serde::{Deserialize, Serialize};

use crate::error::TransitionError;
use crate::id::{DoorId, WindowId};
use crate::macros::string_enum;

/// A string did not name any known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
}

/// Wall a window or door sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "W")]
    West,
}

string_enum!(Direction, "direction", {
    North => "N",
    East => "E",
    South => "S",
    West => "W",
});

/// Category of device manipulated within a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Window,
    Light,
    Door,
}

string_enum!(ItemKind, "item kind", {
    Window => "Window",
    Light => "Light",
    Door => "Door",
});

impl ItemKind {
    /// Kinds offered for an indoor location, in display order.
    pub const ALL: [ItemKind; 3] = [ItemKind::Window, ItemKind::Light, ItemKind::Door];

    /// Whether the kind only exists inside rooms.
    #[must_use]
    pub const fn is_indoor_only(self) -> bool {
        matches!(self, Self::Window | Self::Door)
    }
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WindowState {
    Open,
    Closed,
    Blocked,
}

string_enum!(WindowState, "window state", {
    Open => "OPEN",
    Closed => "CLOSED",
    Blocked => "BLOCKED",
});

/// Operator actions on a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAction {
    Open,
    Close,
}

impl WindowAction {
    #[must_use]
    pub const fn target(self) -> WindowState {
        match self {
            Self::Open => WindowState::Open,
            Self::Close => WindowState::Closed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub id: WindowId,
    pub direction: Direction,
    pub state: WindowState,
}

impl Window {
    /// Actions reachable from the current state. A blocked window offers none.
    #[must_use]
    pub fn actions(&self) -> Vec<WindowAction> {
        match self.state {
            WindowState::Closed => vec![WindowAction::Open],
            WindowState::Open => vec![WindowAction::Close],
            WindowState::Blocked => Vec::new(),
        }
    }

    /// Check that `target` is reachable through one of [`actions`](Self::actions).
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::WindowBlocked`] for a blocked window and
    /// [`TransitionError::Window`] when the target is not reachable.
    pub fn check_transition(&self, target: WindowState) -> Result<(), TransitionError> {
        if self.state == WindowState::Blocked {
            return Err(TransitionError::WindowBlocked);
        }
        if self.actions().iter().any(|a| a.target() == target) {
            Ok(())
        } else {
            Err(TransitionError::Window {
                from: self.state,
                to: target,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Door
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DoorState {
    Open,
    Closed,
    Locked,
}

string_enum!(DoorState, "door state", {
    Open => "OPEN",
    Closed => "CLOSED",
    Locked => "LOCKED",
});

/// State a locked door returns to when nothing is known about it.
pub const DEFAULT_UNLOCK_STATE: DoorState = DoorState::Closed;

/// Operator actions on a door.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorAction {
    Lock,
    Unlock { to: DoorState },
    Open,
    Close,
}

impl DoorAction {
    #[must_use]
    pub const fn target(self) -> DoorState {
        match self {
            Self::Lock => DoorState::Locked,
            Self::Unlock { to } => to,
            Self::Open => DoorState::Open,
            Self::Close => DoorState::Closed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub id: DoorId,
    pub direction: Direction,
    pub state: DoorState,
}

impl Door {
    /// Actions reachable from the current state.
    ///
    /// A locked door only offers "unlock", targeting `unlock_to` (the state it
    /// had before locking, when known) or [`DEFAULT_UNLOCK_STATE`]. Any other
    /// door offers "lock" plus the open/close toggle.
    #[must_use]
    pub fn actions(&self, unlock_to: Option<DoorState>) -> Vec<DoorAction> {
        match self.state {
            DoorState::Locked => {
                let to = unlock_to
                    .filter(|s| *s != DoorState::Locked)
                    .unwrap_or(DEFAULT_UNLOCK_STATE);
                vec![DoorAction::Unlock { to }]
            }
            DoorState::Open => vec![DoorAction::Lock, DoorAction::Close],
            DoorState::Closed => vec![DoorAction::Lock, DoorAction::Open],
        }
    }

    /// Check that `target` is reachable through one of [`actions`](Self::actions).
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Door`] when the target is not reachable.
    pub fn check_transition(
        &self,
        target: DoorState,
        unlock_to: Option<DoorState>,
    ) -> Result<(), TransitionError> {
        if self.actions(unlock_to).iter().any(|a| a.target() == target) {
            Ok(())
        } else {
            Err(TransitionError::Door {
                from: self.state,
                to: target,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Light
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LightState {
    On,
    #[default]
    Off,
}

string_enum!(LightState, "light state", {
    On => "ON",
    Off => "OFF",
});

impl LightState {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }
}

/// The light attached to a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Light {
    pub state: LightState,
}

impl Light {
    #[must_use]
    pub const fn new(state: LightState) -> Self {
        Self { state }
    }
}
