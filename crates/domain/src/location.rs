//! Location: a room of the house or an outdoor area.
//!
//! Rooms carry windows and doors; outdoor areas only carry a light. The
//! two are distinct variants so that an outdoor location can never expose a
//! window or a door.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::{Direction, Door, DoorState, ItemKind, Light, LightState, Window, WindowState};
use crate::error::{SimHomeError, ValidationError};
use crate::id::{DoorId, RoomPosition, WindowId};
use crate::macros::string_enum;

/// The fixed outdoor areas of the simulated house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutdoorPlace {
    Backyard,
    Entrance,
}

string_enum!(OutdoorPlace, "outdoor place", {
    Backyard => "Backyard",
    Entrance => "Entrance",
});

impl OutdoorPlace {
    pub const ALL: [OutdoorPlace; 2] = [OutdoorPlace::Backyard, OutdoorPlace::Entrance];
}

/// Stable key of a location, used to address it in change descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LocationKey {
    Room { position: RoomPosition },
    Outdoor { place: OutdoorPlace },
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Room { position } => write!(f, "room {position}"),
            Self::Outdoor { place } => write!(f, "{place}"),
        }
    }
}

/// An indoor room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub position: RoomPosition,
    pub name: String,
    #[serde(default)]
    pub light: Light,
    #[serde(default)]
    pub windows: Vec<Window>,
    #[serde(default)]
    pub doors: Vec<Door>,
}

impl Room {
    /// Create a builder for constructing a [`Room`].
    #[must_use]
    pub fn builder() -> RoomBuilder {
        RoomBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SimHomeError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), SimHomeError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Room`].
///
/// Window and door ids are assigned sequentially from zero, in insertion order.
#[derive(Debug, Default)]
pub struct RoomBuilder {
    position: Option<RoomPosition>,
    name: Option<String>,
    light: LightState,
    windows: Vec<(Direction, WindowState)>,
    doors: Vec<(Direction, DoorState)>,
}

impl RoomBuilder {
    #[must_use]
    pub fn position(mut self, row_id: u32, room_id: u32) -> Self {
        self.position = Some(RoomPosition::new(row_id, room_id));
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn light(mut self, state: LightState) -> Self {
        self.light = state;
        self
    }

    #[must_use]
    pub fn window(mut self, direction: Direction, state: WindowState) -> Self {
        self.windows.push((direction, state));
        self
    }

    #[must_use]
    pub fn door(mut self, direction: Direction, state: DoorState) -> Self {
        self.doors.push((direction, state));
        self
    }

    /// Consume the builder, validate, and return a [`Room`].
    ///
    /// # Errors
    ///
    /// Returns [`SimHomeError::Validation`] if `name` is missing or empty.
    pub fn build(self) -> Result<Room, SimHomeError> {
        let room = Room {
            position: self.position.unwrap_or(RoomPosition::new(0, 0)),
            name: self.name.unwrap_or_default(),
            light: Light::new(self.light),
            windows: (0u32..)
                .zip(self.windows)
                .map(|(id, (direction, state))| Window {
                    id: WindowId::new(id),
                    direction,
                    state,
                })
                .collect(),
            doors: (0u32..)
                .zip(self.doors)
                .map(|(id, (direction, state))| Door {
                    id: DoorId::new(id),
                    direction,
                    state,
                })
                .collect(),
        };
        room.validate()?;
        Ok(room)
    }
}

/// An outdoor area: only a light, no windows or doors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdoorArea {
    pub place: OutdoorPlace,
    #[serde(default)]
    pub light: Light,
}

/// A location of the house as supplied by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Location {
    Room(Room),
    Outdoor(OutdoorArea),
}

impl Location {
    /// An outdoor location with its light off.
    #[must_use]
    pub fn outdoor(place: OutdoorPlace) -> Self {
        Self::Outdoor(OutdoorArea {
            place,
            light: Light::default(),
        })
    }

    /// The operator-facing label: the room name or the outdoor place name.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Room(room) => &room.name,
            Self::Outdoor(area) => area.place.as_str(),
        }
    }

    #[must_use]
    pub fn key(&self) -> LocationKey {
        match self {
            Self::Room(room) => LocationKey::Room {
                position: room.position,
            },
            Self::Outdoor(area) => LocationKey::Outdoor { place: area.place },
        }
    }

    #[must_use]
    pub fn is_outdoor(&self) -> bool {
        matches!(self, Self::Outdoor(_))
    }

    #[must_use]
    pub fn light(&self) -> Light {
        match self {
            Self::Room(room) => room.light,
            Self::Outdoor(area) => area.light,
        }
    }

    pub fn light_mut(&mut self) -> &mut Light {
        match self {
            Self::Room(room) => &mut room.light,
            Self::Outdoor(area) => &mut area.light,
        }
    }

    /// Windows of the location; always empty outdoors.
    #[must_use]
    pub fn windows(&self) -> &[Window] {
        match self {
            Self::Room(room) => &room.windows,
            Self::Outdoor(_) => &[],
        }
    }

    /// Doors of the location; always empty outdoors.
    #[must_use]
    pub fn doors(&self) -> &[Door] {
        match self {
            Self::Room(room) => &room.doors,
            Self::Outdoor(_) => &[],
        }
    }

    #[must_use]
    pub fn find_window(&self, id: WindowId) -> Option<&Window> {
        self.windows().iter().find(|w| w.id == id)
    }

    pub fn find_window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        match self {
            Self::Room(room) => room.windows.iter_mut().find(|w| w.id == id),
            Self::Outdoor(_) => None,
        }
    }

    #[must_use]
    pub fn find_door(&self, id: DoorId) -> Option<&Door> {
        self.doors().iter().find(|d| d.id == id)
    }

    pub fn find_door_mut(&mut self, id: DoorId) -> Option<&mut Door> {
        match self {
            Self::Room(room) => room.doors.iter_mut().find(|d| d.id == id),
            Self::Outdoor(_) => None,
        }
    }

    /// Item kinds the operator may pick here.
    #[must_use]
    pub fn available_item_kinds(&self) -> &'static [ItemKind] {
        match self {
            Self::Room(_) => &ItemKind::ALL,
            Self::Outdoor(_) => &[ItemKind::Light],
        }
    }
}

impl From<Room> for Location {
    fn from(room: Room) -> Self {
        Self::Room(room)
    }
}
