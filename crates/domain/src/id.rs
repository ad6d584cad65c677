//! Typed identifier newtypes backed by the registry's integer indices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Wrap a raw registry index.
            #[must_use]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Access the raw registry index.
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

define_id!(
    /// Row index of a room in the house layout grid.
    RowId
);

define_id!(
    /// Index of a room within its row.
    RoomId
);

define_id!(
    /// Identifier of a [`Window`](crate::device::Window) within its room.
    WindowId
);

define_id!(
    /// Identifier of a [`Door`](crate::device::Door) within its room.
    DoorId
);

/// Grid position of a room: the registry keys every indoor call by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPosition {
    pub row_id: RowId,
    pub room_id: RoomId,
}

impl RoomPosition {
    #[must_use]
    pub const fn new(row_id: u32, room_id: u32) -> Self {
        Self {
            row_id: RowId::new(row_id),
            room_id: RoomId::new(room_id),
        }
    }
}

impl fmt::Display for RoomPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.row_id, self.room_id)
    }
}
