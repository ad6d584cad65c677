//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`SimHomeError`] via `#[from]`.

use crate::device::{DoorState, ItemKind, WindowState};

/// Top-level error carried across every port boundary.
#[derive(Debug, thiserror::Error)]
pub enum SimHomeError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("selection error")]
    Selection(#[from] SelectionError),

    #[error("transition error")]
    Transition(#[from] TransitionError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A remote collaborator (device registry, parameter service, heater)
    /// rejected or failed the call.
    #[error("remote call failed")]
    Remote(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SimHomeError {
    /// Wrap any error raised by a remote collaborator.
    pub fn remote(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Remote(err.into())
    }
}

/// Local validation failures, detected before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("A name for the user must be set")]
    MissingUserName,

    #[error("A layout must be uploaded")]
    LayoutNotUploaded,

    #[error("A location for the user must be chosen")]
    MissingUserLocation,
}

/// Operations attempted without the selection they depend on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("no location selected")]
    NoLocation,

    #[error("{kind} is not available in outdoor location {location}")]
    IndoorOnly { kind: ItemKind, location: String },

    #[error("{requested} selected while {active:?} is the active item kind")]
    KindMismatch {
        requested: ItemKind,
        active: Option<ItemKind>,
    },

    #[error("no {0} selected")]
    NoDevice(ItemKind),
}

/// Device state changes that the current state does not allow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("window is blocked")]
    WindowBlocked,

    #[error("window cannot go from {from} to {to}")]
    Window { from: WindowState, to: WindowState },

    #[error("door cannot go from {from} to {to}")]
    Door { from: DoorState, to: DoorState },
}

/// A referenced record does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
