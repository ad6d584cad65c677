//! # simhome-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `HouseLayout`: the location and device registry
//!   - `Parameters` / `Heater`: simulation settings and their consumer
//!   - `FlagStore` / `Notifier`: durable operator flags and notifications
//!   - `EventPublisher`: the refresh bus
//! - Define the **use-cases** driven by the operator:
//!   - `ControlPanel`: select a location, item kind and device, then command it
//!   - `LayoutView`: keep a snapshot of the house in sync with change events
//!   - `ParametersForm`: upload a layout and submit the simulation parameters
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `simhome-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod services;
