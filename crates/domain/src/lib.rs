//! # simhome-domain
//!
//! Pure domain model for the simhome house simulator console.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Locations** (rooms and outdoor areas) and their **Devices**
//!   (windows, doors, lights) together with the allowed state transitions
//! - Define the operator **Selection** state machine
//! - Define **Events** (typed change descriptors broadcast after commands)
//! - Define **Simulation parameters** and their save preconditions
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

mod macros;

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod event;
pub mod location;
pub mod parameters;
pub mod selection;
