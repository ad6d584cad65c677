//! Session ports: durable operator flags and blocking notifications.

use std::sync::Arc;

/// Durable flags that gate entry into the parameters form.
///
/// Implementations use interior mutability; the flags outlive any single
/// form or panel.
pub trait FlagStore {
    /// Whether a house layout has been uploaded.
    fn layout_uploaded(&self) -> bool;

    fn set_layout_uploaded(&self, value: bool);

    /// Whether the simulation parameters were saved successfully.
    fn parameters_finalized(&self) -> bool;

    fn set_parameters_finalized(&self, value: bool);
}

/// Shows a message the operator must acknowledge.
pub trait Notifier {
    fn notify(&self, message: &str);
}

impl<T: FlagStore + ?Sized> FlagStore for Arc<T> {
    fn layout_uploaded(&self) -> bool {
        (**self).layout_uploaded()
    }

    fn set_layout_uploaded(&self, value: bool) {
        (**self).set_layout_uploaded(value);
    }

    fn parameters_finalized(&self) -> bool {
        (**self).parameters_finalized()
    }

    fn set_parameters_finalized(&self, value: bool) {
        (**self).set_parameters_finalized(value);
    }
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, message: &str) {
        (**self).notify(message);
    }
}
