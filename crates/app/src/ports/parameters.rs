//! Parameters and heater ports: simulation settings and their consumers.

use std::future::Future;
use std::sync::Arc;

use simhome_domain::error::SimHomeError;
use simhome_domain::parameters::{Profile, SimulationParameters, User};

/// Remote store of the simulation user and parameters.
pub trait Parameters {
    /// The currently configured user.
    fn get_user(&self) -> impl Future<Output = Result<User, SimHomeError>> + Send;

    /// Profiles the user may be given, in display order.
    fn get_profiles(&self) -> impl Future<Output = Result<Vec<Profile>, SimHomeError>> + Send;

    /// Submit the full parameter set. The remote side may reject it.
    fn save_params(
        &self,
        params: SimulationParameters,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send;
}

/// Heating module, told to pick up the saved temperatures.
pub trait Heater {
    fn init_temp(&self) -> impl Future<Output = Result<(), SimHomeError>> + Send;
}

impl<T: Parameters + Send + Sync> Parameters for Arc<T> {
    fn get_user(&self) -> impl Future<Output = Result<User, SimHomeError>> + Send {
        (**self).get_user()
    }

    fn get_profiles(&self) -> impl Future<Output = Result<Vec<Profile>, SimHomeError>> + Send {
        (**self).get_profiles()
    }

    fn save_params(
        &self,
        params: SimulationParameters,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        (**self).save_params(params)
    }
}

impl<T: Heater + Send + Sync> Heater for Arc<T> {
    fn init_temp(&self) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        (**self).init_temp()
    }
}
