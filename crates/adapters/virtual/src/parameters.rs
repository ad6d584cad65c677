//! In-memory parameter service, heater and session flags.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use simhome_app::ports::{FlagStore, Heater, Parameters};
use simhome_domain::error::{NotFoundError, SimHomeError};
use simhome_domain::parameters::{Profile, Role, SimulationParameters, User};

use crate::error::VirtualError;

const MIN_TEMP: f64 = -60.0;
const MAX_TEMP: f64 = 60.0;

/// Parameter service that keeps the last accepted submission.
pub struct VirtualParameters {
    profiles: Vec<Profile>,
    user: Mutex<User>,
    saved: Mutex<Option<SimulationParameters>>,
}

impl Default for VirtualParameters {
    fn default() -> Self {
        let profiles = [
            ("Parent", Role::Parent),
            ("Child", Role::Child),
            ("Guest", Role::Guest),
            ("Stranger", Role::Stranger),
        ]
        .into_iter()
        .map(|(name, role)| Profile {
            name: name.to_string(),
            role,
        })
        .collect();
        Self {
            profiles,
            user: Mutex::new(User {
                name: "Guest".to_string(),
                profile: "Guest".to_string(),
                location: None,
            }),
            saved: Mutex::new(None),
        }
    }
}

impl VirtualParameters {
    /// The last accepted parameters, if any.
    #[must_use]
    pub fn saved(&self) -> Option<SimulationParameters> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn accept(&self, params: SimulationParameters) -> Result<(), VirtualError> {
        check_temperature("inside", params.inside_temp)?;
        check_temperature("outside", params.outside_temp)?;
        if !self.profiles.iter().any(|p| p.name == params.user.profile) {
            return Err(VirtualError::Domain(
                NotFoundError {
                    entity: "Profile",
                    id: params.user.profile,
                }
                .into(),
            ));
        }
        tracing::info!(user = %params.user.name, profile = %params.user.profile, "parameters saved");
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = params.user.clone();
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = Some(params);
        Ok(())
    }
}

fn check_temperature(name: &'static str, value: Option<f64>) -> Result<(), VirtualError> {
    match value {
        Some(value) if !(MIN_TEMP..=MAX_TEMP).contains(&value) => {
            Err(VirtualError::TemperatureOutOfRange {
                name,
                value,
                min: MIN_TEMP,
                max: MAX_TEMP,
            })
        }
        _ => Ok(()),
    }
}

impl Parameters for VirtualParameters {
    fn get_user(&self) -> impl Future<Output = Result<User, SimHomeError>> + Send {
        let user = self
            .user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        async move { Ok(user) }
    }

    fn get_profiles(&self) -> impl Future<Output = Result<Vec<Profile>, SimHomeError>> + Send {
        let profiles = self.profiles.clone();
        async move { Ok(profiles) }
    }

    fn save_params(
        &self,
        params: SimulationParameters,
    ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        let result = self.accept(params).map_err(SimHomeError::from);
        async move { result }
    }
}

/// Heater that only counts how often it was initialized.
#[derive(Default)]
pub struct VirtualHeater {
    initialized: AtomicUsize,
}

impl VirtualHeater {
    #[must_use]
    pub fn init_count(&self) -> usize {
        self.initialized.load(Ordering::SeqCst)
    }
}

impl Heater for VirtualHeater {
    fn init_temp(&self) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        let count = self.initialized.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(count, "heater temperatures initialized");
        async { Ok(()) }
    }
}

/// Session flags kept for the lifetime of the process.
#[derive(Default)]
pub struct VirtualFlags {
    layout_uploaded: AtomicBool,
    parameters_finalized: AtomicBool,
}

impl FlagStore for VirtualFlags {
    fn layout_uploaded(&self) -> bool {
        self.layout_uploaded.load(Ordering::SeqCst)
    }

    fn set_layout_uploaded(&self, value: bool) {
        self.layout_uploaded.store(value, Ordering::SeqCst);
    }

    fn parameters_finalized(&self) -> bool {
        self.parameters_finalized.load(Ordering::SeqCst)
    }

    fn set_parameters_finalized(&self, value: bool) {
        self.parameters_finalized.store(value, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simhome_domain::parameters::{SeasonDates, UserLocation};

    fn params(inside: f64) -> SimulationParameters {
        SimulationParameters {
            user: User {
                name: "Alice".to_string(),
                profile: "Parent".to_string(),
                location: Some(UserLocation::Outside),
            },
            inside_temp: Some(inside),
            outside_temp: None,
            date_time: None,
            season_dates: SeasonDates::default(),
        }
    }

    #[tokio::test]
    async fn should_offer_profile_for_every_role() {
        let parameters = VirtualParameters::default();

        let profiles = parameters.get_profiles().await.unwrap();

        assert_eq!(profiles.len(), 4);
        assert_eq!(profiles[0].role, Role::Parent);
    }

    #[tokio::test]
    async fn should_keep_saved_user() {
        let parameters = VirtualParameters::default();

        parameters.save_params(params(21.0)).await.unwrap();

        assert_eq!(parameters.get_user().await.unwrap().name, "Alice");
        assert!(parameters.saved().is_some());
    }

    #[tokio::test]
    async fn should_reject_out_of_range_temperature() {
        let parameters = VirtualParameters::default();

        let result = parameters.save_params(params(75.0)).await;

        assert!(matches!(result, Err(SimHomeError::Remote(_))));
        assert!(parameters.saved().is_none());
    }

    #[tokio::test]
    async fn should_reject_unknown_profile() {
        let parameters = VirtualParameters::default();
        let mut submitted = params(20.0);
        submitted.user.profile = "Burglar".to_string();

        let result = parameters.save_params(submitted).await;

        assert!(matches!(result, Err(SimHomeError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_count_heater_initializations() {
        let heater = VirtualHeater::default();

        heater.init_temp().await.unwrap();
        heater.init_temp().await.unwrap();

        assert_eq!(heater.init_count(), 2);
    }

    #[test]
    fn should_start_with_flags_cleared() {
        let flags = VirtualFlags::default();
        assert!(!flags.layout_uploaded());
        flags.set_parameters_finalized(true);
        assert!(flags.parameters_finalized());
    }
}
