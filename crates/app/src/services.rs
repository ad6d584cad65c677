//! Application services, the use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod command;
pub mod control_panel;
pub mod layout_view;
pub mod parameters_form;

pub use control_panel::ControlPanel;
pub use layout_view::LayoutView;
pub use parameters_form::{FormEntry, ParametersForm};
