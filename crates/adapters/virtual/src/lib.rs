//! # simhome-adapter-virtual
//!
//! Virtual house that stands in for the remote device registry and
//! parameter service, for demonstration and testing.
//!
//! ## Provided services
//!
//! | Type | Port | Behaviour |
//! |------|------|-----------|
//! | [`VirtualHouse`] | `HouseLayout` | Keeps locations in memory; refuses to open blocked windows; can be taken offline |
//! | [`VirtualParameters`] | `Parameters` | Offers one profile per role; rejects temperatures outside -60..=60 °C |
//! | [`VirtualHeater`] | `Heater` | Counts initializations |
//! | [`VirtualFlags`] | `FlagStore` | Process-lifetime session flags |
//!
//! ## Dependency rule
//!
//! Depends on `simhome-app` (port traits) and `simhome-domain` only.

mod error;
mod house;
mod parameters;

pub use error::VirtualError;
pub use house::VirtualHouse;
pub use parameters::{VirtualFlags, VirtualHeater, VirtualParameters};
