//! Selection: which location, item kind and device the operator is working on.
//!
//! ```text
//! Idle ──select_location──▶ Location(None) ──select_item_kind──▶ Location(Window(None))
//!                                                                   │ select_device
//!                                                                   ▼
//!                                                         Location(Window(Some(id)))
//! ```
//!
//! Every transition returns a new [`Selection`]; invalid combinations (a door
//! selected on an outdoor location, a window selected while the light kind is
//! active, …) cannot be represented.

use crate::device::{Door, DoorState, ItemKind, LightState, Window, WindowState};
use crate::error::{NotFoundError, SelectionError, SimHomeError};
use crate::id::{DoorId, WindowId};
use crate::location::Location;

/// A selectable device together with the label shown for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice<'a, T> {
    pub value: &'a T,
    pub label: &'static str,
}

/// A device reference inside the selected location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceRef {
    Window(WindowId),
    Door(DoorId),
}

impl DeviceRef {
    #[must_use]
    pub const fn kind(self) -> ItemKind {
        match self {
            Self::Window(_) => ItemKind::Window,
            Self::Door(_) => ItemKind::Door,
        }
    }
}

/// The active item kind and, for windows and doors, the chosen device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemSelection {
    #[default]
    None,
    Window(Option<WindowId>),
    Light,
    Door(Option<DoorId>),
}

impl ItemSelection {
    #[must_use]
    pub const fn kind(self) -> Option<ItemKind> {
        match self {
            Self::None => None,
            Self::Window(_) => Some(ItemKind::Window),
            Self::Light => Some(ItemKind::Light),
            Self::Door(_) => Some(ItemKind::Door),
        }
    }

    fn empty(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Window => Self::Window(None),
            ItemKind::Light => Self::Light,
            ItemKind::Door => Self::Door(None),
        }
    }
}

/// Selection rooted at a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationSelection {
    location: Location,
    item: ItemSelection,
}

impl LocationSelection {
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    #[must_use]
    pub fn item(&self) -> ItemSelection {
        self.item
    }
}

/// Operator selection state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Idle,
    Location(LocationSelection),
}

impl Selection {
    /// Select a location, clearing the item kind and any selected device,
    /// whatever was selected before.
    ///
    /// Outdoor locations yield empty window and door lists.
    #[must_use]
    pub fn select_location(location: Location) -> Self {
        Self::Location(LocationSelection {
            location,
            item: ItemSelection::None,
        })
    }

    /// Make `kind` the single active item kind.
    ///
    /// Switching to a different kind drops the device chosen under the
    /// previous one; re-selecting the active kind keeps it.
    ///
    /// # Errors
    ///
    /// - [`SelectionError::NoLocation`] when nothing is selected
    /// - [`SelectionError::IndoorOnly`] for windows/doors on an outdoor location
    pub fn select_item_kind(&self, kind: ItemKind) -> Result<Self, SimHomeError> {
        let current = self.require_location()?;
        if !current.location.available_item_kinds().contains(&kind) {
            return Err(SelectionError::IndoorOnly {
                kind,
                location: current.location.label().to_string(),
            }
            .into());
        }
        let item = if current.item.kind() == Some(kind) {
            current.item
        } else {
            ItemSelection::empty(kind)
        };
        Ok(Self::Location(LocationSelection {
            location: current.location.clone(),
            item,
        }))
    }

    /// Choose a specific window or door under the matching active item kind.
    ///
    /// # Errors
    ///
    /// - [`SelectionError::NoLocation`] when nothing is selected
    /// - [`SelectionError::KindMismatch`] when the device's kind is not active
    /// - [`SimHomeError::NotFound`] when the id is not in the location's lists
    pub fn select_device(&self, device: DeviceRef) -> Result<Self, SimHomeError> {
        let current = self.require_location()?;
        let item = match (current.item, device) {
            (ItemSelection::Window(_), DeviceRef::Window(id)) => {
                current
                    .location
                    .find_window(id)
                    .ok_or_else(|| not_found("Window", id))?;
                ItemSelection::Window(Some(id))
            }
            (ItemSelection::Door(_), DeviceRef::Door(id)) => {
                current
                    .location
                    .find_door(id)
                    .ok_or_else(|| not_found("Door", id))?;
                ItemSelection::Door(Some(id))
            }
            (item, device) => {
                return Err(SelectionError::KindMismatch {
                    requested: device.kind(),
                    active: item.kind(),
                }
                .into());
            }
        };
        Ok(Self::Location(LocationSelection {
            location: current.location.clone(),
            item,
        }))
    }

    /// Swap in a fresher record of the selected location.
    ///
    /// The item selection survives when its device still exists. Records of
    /// other locations leave the selection untouched.
    #[must_use]
    pub fn refresh(&self, location: Location) -> Self {
        match self {
            Self::Location(current) if current.location.key() == location.key() => {
                let item = match current.item {
                    ItemSelection::Window(Some(id)) if location.find_window(id).is_none() => {
                        ItemSelection::Window(None)
                    }
                    ItemSelection::Door(Some(id)) if location.find_door(id).is_none() => {
                        ItemSelection::Door(None)
                    }
                    item => item,
                };
                Self::Location(LocationSelection { location, item })
            }
            _ => self.clone(),
        }
    }

    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Idle => None,
            Self::Location(sel) => Some(&sel.location),
        }
    }

    #[must_use]
    pub fn item(&self) -> ItemSelection {
        match self {
            Self::Idle => ItemSelection::None,
            Self::Location(sel) => sel.item,
        }
    }

    #[must_use]
    pub fn item_kind(&self) -> Option<ItemKind> {
        self.item().kind()
    }

    /// Item kinds selectable for the current location (none while idle).
    #[must_use]
    pub fn available_item_kinds(&self) -> &'static [ItemKind] {
        match self.location() {
            Some(location) => location.available_item_kinds(),
            None => &[],
        }
    }

    /// Windows of the selected location, labelled by direction.
    #[must_use]
    pub fn windows(&self) -> Vec<Choice<'_, Window>> {
        self.location()
            .map(|loc| {
                loc.windows()
                    .iter()
                    .map(|w| Choice {
                        value: w,
                        label: w.direction.as_str(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Doors of the selected location, labelled by direction.
    #[must_use]
    pub fn doors(&self) -> Vec<Choice<'_, Door>> {
        self.location()
            .map(|loc| {
                loc.doors()
                    .iter()
                    .map(|d| Choice {
                        value: d,
                        label: d.direction.as_str(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn selected_window(&self) -> Option<&Window> {
        match self {
            Self::Location(LocationSelection {
                location,
                item: ItemSelection::Window(Some(id)),
            }) => location.find_window(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn selected_door(&self) -> Option<&Door> {
        match self {
            Self::Location(LocationSelection {
                location,
                item: ItemSelection::Door(Some(id)),
            }) => location.find_door(*id),
            _ => None,
        }
    }

    /// Record a confirmed window state in the selected location.
    ///
    /// Returns `false` when the window is not part of the selection.
    pub fn set_window_state(&mut self, id: WindowId, state: WindowState) -> bool {
        self.location_mut()
            .and_then(|loc| loc.find_window_mut(id))
            .map(|w| w.state = state)
            .is_some()
    }

    /// Record a confirmed door state in the selected location.
    ///
    /// Returns `false` when the door is not part of the selection.
    pub fn set_door_state(&mut self, id: DoorId, state: DoorState) -> bool {
        self.location_mut()
            .and_then(|loc| loc.find_door_mut(id))
            .map(|d| d.state = state)
            .is_some()
    }

    /// Record a confirmed light state for the selected location.
    ///
    /// Returns `false` while idle.
    pub fn set_light_state(&mut self, state: LightState) -> bool {
        self.location_mut()
            .map(|loc| loc.light_mut().state = state)
            .is_some()
    }

    fn location_mut(&mut self) -> Option<&mut Location> {
        match self {
            Self::Idle => None,
            Self::Location(sel) => Some(&mut sel.location),
        }
    }

    fn require_location(&self) -> Result<&LocationSelection, SelectionError> {
        match self {
            Self::Idle => Err(SelectionError::NoLocation),
            Self::Location(sel) => Ok(sel),
        }
    }
}

fn not_found(entity: &'static str, id: impl ToString) -> NotFoundError {
    NotFoundError {
        entity,
        id: id.to_string(),
    }
}
