//! Virtual adapter error types.

use simhome_domain::error::SimHomeError;
use simhome_domain::id::RoomPosition;
use simhome_domain::location::LocationKey;

/// Errors raised by the virtual house and its services.
#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    /// The house was switched offline.
    #[error("virtual house unreachable")]
    Unreachable,

    #[error("no location {0}")]
    UnknownLocation(LocationKey),

    #[error("no {device} {id} in room {position}")]
    UnknownDevice {
        device: &'static str,
        id: u32,
        position: RoomPosition,
    },

    #[error("window {id} in room {position} is blocked")]
    WindowBlocked { id: u32, position: RoomPosition },

    #[error("layout has two locations keyed {0}")]
    DuplicateLocation(LocationKey),

    #[error("{name} temperature {value} outside of {min}..={max}")]
    TemperatureOutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A domain-level error (validation, not-found, etc.).
    #[error("domain error")]
    Domain(#[source] SimHomeError),
}

impl VirtualError {
    /// Convert into a [`SimHomeError::Remote`] for propagation across port
    /// boundaries.
    pub fn into_domain(self) -> SimHomeError {
        match self {
            Self::Domain(err) => err,
            other => SimHomeError::remote(other),
        }
    }
}

impl From<VirtualError> for SimHomeError {
    fn from(err: VirtualError) -> Self {
        err.into_domain()
    }
}
