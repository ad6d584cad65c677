//! Simulation parameters form: layout upload and parameter submission.
//!
//! Failures the operator has to act on are raised through the [`Notifier`]
//! as well as returned.

use chrono::{NaiveDate, NaiveTime};

use simhome_domain::error::{NotFoundError, SimHomeError};
use simhome_domain::location::{Location, OutdoorPlace};
use simhome_domain::parameters::{ParametersDraft, Profile, UserLocation};

use crate::ports::{FlagStore, Heater, HouseLayout, Notifier, Parameters};

/// Shown when the registry refuses an uploaded layout.
pub const INVALID_FILE: &str = "Invalid File";

/// Shown when the parameter service rejects a submission.
pub const PARAMETERS_REJECTED: &str = "One or more system parameters were inappropriate";

/// Label of the user location that stands for every outdoor area.
pub const OUTSIDE: &str = "Outside";

/// Where the operator lands when the form is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEntry {
    /// Parameters were already saved; skip the form.
    Dashboard,
    Editing,
}

pub struct ParametersForm<H, P, T, F, N> {
    house: H,
    parameters: P,
    heater: T,
    flags: F,
    notifier: N,
    draft: ParametersDraft,
    profiles: Vec<Profile>,
    locations: Vec<Location>,
}

impl<H, P, T, F, N> ParametersForm<H, P, T, F, N>
where
    H: HouseLayout,
    P: Parameters,
    T: Heater,
    F: FlagStore,
    N: Notifier,
{
    pub fn new(house: H, parameters: P, heater: T, flags: F, notifier: N) -> Self {
        Self {
            house,
            parameters,
            heater,
            flags,
            notifier,
            draft: ParametersDraft::default(),
            profiles: Vec::new(),
            locations: Vec::new(),
        }
    }

    /// Load what the form needs, unless the parameters were already saved.
    ///
    /// The first profile becomes the default choice. Locations are only
    /// loaded once a layout has been uploaded.
    ///
    /// # Errors
    ///
    /// Returns the error of whichever remote call failed.
    #[tracing::instrument(skip(self))]
    pub async fn mount(&mut self) -> Result<FormEntry, SimHomeError> {
        if self.flags.parameters_finalized() {
            return Ok(FormEntry::Dashboard);
        }
        self.profiles = self.parameters.get_profiles().await?;
        if self.draft.profile.is_empty() {
            self.draft.profile = self
                .profiles
                .first()
                .map(|p| p.name.clone())
                .unwrap_or_default();
        }
        if self.flags.layout_uploaded() {
            self.locations = self.house.get_all_locations().await?;
        }
        Ok(FormEntry::Editing)
    }

    #[must_use]
    pub fn draft(&self) -> &ParametersDraft {
        &self.draft
    }

    #[must_use]
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Labels the user location can be picked from: rooms, then [`OUTSIDE`].
    #[must_use]
    pub fn location_choices(&self) -> Vec<&str> {
        let mut choices: Vec<&str> = self
            .locations
            .iter()
            .filter(|l| !l.is_outdoor())
            .map(Location::label)
            .collect();
        if !self.locations.is_empty() {
            choices.push(OUTSIDE);
        }
        choices
    }

    pub fn set_user_name(&mut self, name: impl Into<String>) {
        self.draft.user_name = Some(name.into());
    }

    /// # Errors
    ///
    /// Returns [`SimHomeError::NotFound`] for a profile that was not offered.
    pub fn select_profile(&mut self, name: &str) -> Result<(), SimHomeError> {
        let profile = self
            .profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| NotFoundError {
                entity: "Profile",
                id: name.to_string(),
            })?;
        self.draft.profile.clone_from(&profile.name);
        Ok(())
    }

    /// Pick where the user stands, by room name. [`OUTSIDE`] and the outdoor
    /// area names all mean outside.
    ///
    /// # Errors
    ///
    /// Returns [`SimHomeError::NotFound`] for an unknown label.
    pub fn select_user_location(&mut self, label: &str) -> Result<(), SimHomeError> {
        let outdoor = label.eq_ignore_ascii_case(OUTSIDE) || label.parse::<OutdoorPlace>().is_ok();
        let location = if outdoor {
            UserLocation::Outside
        } else {
            self.locations
                .iter()
                .find(|l| l.label().eq_ignore_ascii_case(label))
                .map(UserLocation::of)
                .ok_or_else(|| NotFoundError {
                    entity: "Location",
                    id: label.to_string(),
                })?
        };
        self.draft.user_location = Some(location);
        Ok(())
    }

    pub fn set_inside_temp(&mut self, celsius: f64) {
        self.draft.inside_temp = Some(celsius);
    }

    pub fn set_outside_temp(&mut self, celsius: f64) {
        self.draft.outside_temp = Some(celsius);
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.draft.date = Some(date);
    }

    pub fn set_time(&mut self, time: NaiveTime) {
        self.draft.time = Some(time);
    }

    pub fn set_summer_start(&mut self, date: NaiveDate) {
        self.draft.summer_start = Some(date);
    }

    pub fn set_winter_start(&mut self, date: NaiveDate) {
        self.draft.winter_start = Some(date);
    }

    /// Hand a new house layout to the registry.
    ///
    /// # Errors
    ///
    /// Returns the registry error after notifying [`INVALID_FILE`].
    #[tracing::instrument(skip(self, locations), fields(locations = locations.len()))]
    pub async fn upload_layout(&mut self, locations: Vec<Location>) -> Result<(), SimHomeError> {
        if let Err(err) = self.house.create_layout(locations).await {
            tracing::warn!(error = %err, "layout upload rejected");
            self.notifier.notify(INVALID_FILE);
            return Err(err);
        }
        self.flags.set_layout_uploaded(true);
        self.locations = self.house.get_all_locations().await?;
        Ok(())
    }

    /// Validate and submit the parameters.
    ///
    /// A missing precondition is notified and aborts the save before any
    /// remote call. Once saved, the heater is asked to pick up the new
    /// temperatures; its failure is only logged.
    ///
    /// # Errors
    ///
    /// - [`SimHomeError::Validation`] for a missing user name, layout or
    ///   user location
    /// - the parameter service error, after notifying [`PARAMETERS_REJECTED`]
    #[tracing::instrument(skip(self))]
    pub async fn save(&mut self) -> Result<(), SimHomeError> {
        let params = match self.draft.validate(self.flags.layout_uploaded()) {
            Ok(params) => params,
            Err(err) => {
                self.notifier.notify(&err.to_string());
                return Err(err.into());
            }
        };
        if let Err(err) = self.parameters.save_params(params).await {
            tracing::warn!(error = %err, "parameters rejected");
            self.notifier.notify(PARAMETERS_REJECTED);
            return Err(err);
        }
        self.flags.set_parameters_finalized(true);
        if let Err(err) = self.heater.init_temp().await {
            tracing::warn!(error = %err, "heater failed to initialize temperatures");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use simhome_domain::device::{DoorState, LightState};
    use simhome_domain::error::ValidationError;
    use simhome_domain::id::{DoorId, RoomPosition, WindowId};
    use simhome_domain::location::Room;
    use simhome_domain::parameters::{Role, SimulationParameters, User};
    use simhome_domain::time::{parse_date, parse_time_of_day};

    // -- In-memory doubles -------------------------------------------------

    #[derive(Default)]
    struct MemoryHouse {
        locations: Mutex<Vec<Location>>,
        reject: AtomicBool,
    }

    impl HouseLayout for MemoryHouse {
        fn get_all_locations(
            &self,
        ) -> impl Future<Output = Result<Vec<Location>, SimHomeError>> + Send {
            let result = Ok(self.locations.lock().unwrap().clone());
            async move { result }
        }

        fn open_window(
            &self,
            _position: RoomPosition,
            _window_id: WindowId,
        ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
            async { Ok(()) }
        }

        fn unblock_window(
            &self,
            _position: RoomPosition,
            _window_id: WindowId,
        ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
            async { Ok(()) }
        }

        fn change_door_state(
            &self,
            _position: RoomPosition,
            _door_id: DoorId,
            _state: DoorState,
        ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
            async { Ok(()) }
        }

        fn modify_room_light_state(
            &self,
            _position: RoomPosition,
            _state: LightState,
        ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
            async { Ok(()) }
        }

        fn modify_outside_light_state(
            &self,
            _place: OutdoorPlace,
            _state: LightState,
        ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
            async { Ok(()) }
        }

        fn create_layout(
            &self,
            locations: Vec<Location>,
        ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
            let result = if self.reject.load(Ordering::SeqCst) {
                Err(SimHomeError::remote("malformed layout"))
            } else {
                *self.locations.lock().unwrap() = locations;
                Ok(())
            };
            async move { result }
        }
    }

    #[derive(Default)]
    struct MemoryParameters {
        saved: Mutex<Vec<SimulationParameters>>,
        reject: AtomicBool,
    }

    impl MemoryParameters {
        fn save_count(&self) -> usize {
            self.saved.lock().unwrap().len()
        }
    }

    impl Parameters for MemoryParameters {
        fn get_user(&self) -> impl Future<Output = Result<User, SimHomeError>> + Send {
            async {
                Ok(User {
                    name: String::new(),
                    profile: String::new(),
                    location: None,
                })
            }
        }

        fn get_profiles(&self) -> impl Future<Output = Result<Vec<Profile>, SimHomeError>> + Send {
            async {
                Ok(vec![
                    Profile {
                        name: "Parent".to_string(),
                        role: Role::Parent,
                    },
                    Profile {
                        name: "Guest".to_string(),
                        role: Role::Guest,
                    },
                ])
            }
        }

        fn save_params(
            &self,
            params: SimulationParameters,
        ) -> impl Future<Output = Result<(), SimHomeError>> + Send {
            let result = if self.reject.load(Ordering::SeqCst) {
                Err(SimHomeError::remote("temperature out of range"))
            } else {
                self.saved.lock().unwrap().push(params);
                Ok(())
            };
            async move { result }
        }
    }

    #[derive(Default)]
    struct CountingHeater(AtomicUsize);

    impl Heater for CountingHeater {
        fn init_temp(&self) -> impl Future<Output = Result<(), SimHomeError>> + Send {
            self.0.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        }
    }

    #[derive(Default)]
    struct MemoryFlags {
        layout: AtomicBool,
        finalized: AtomicBool,
    }

    impl FlagStore for MemoryFlags {
        fn layout_uploaded(&self) -> bool {
            self.layout.load(Ordering::SeqCst)
        }

        fn set_layout_uploaded(&self, value: bool) {
            self.layout.store(value, Ordering::SeqCst);
        }

        fn parameters_finalized(&self) -> bool {
            self.finalized.load(Ordering::SeqCst)
        }

        fn set_parameters_finalized(&self, value: bool) {
            self.finalized.store(value, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct RecordingNotifier(Mutex<Vec<String>>);

    impl RecordingNotifier {
        fn messages(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    #[derive(Default)]
    struct Fixture {
        house: Arc<MemoryHouse>,
        parameters: Arc<MemoryParameters>,
        heater: Arc<CountingHeater>,
        flags: Arc<MemoryFlags>,
        notifier: Arc<RecordingNotifier>,
    }

    type Form = ParametersForm<
        Arc<MemoryHouse>,
        Arc<MemoryParameters>,
        Arc<CountingHeater>,
        Arc<MemoryFlags>,
        Arc<RecordingNotifier>,
    >;

    impl Fixture {
        fn form(&self) -> Form {
            ParametersForm::new(
                Arc::clone(&self.house),
                Arc::clone(&self.parameters),
                Arc::clone(&self.heater),
                Arc::clone(&self.flags),
                Arc::clone(&self.notifier),
            )
        }
    }

    fn layout() -> Vec<Location> {
        let kitchen = Room::builder().position(0, 0).name("Kitchen").build().unwrap();
        vec![kitchen.into(), Location::outdoor(OutdoorPlace::Backyard)]
    }

    async fn filled_form(fixture: &Fixture) -> Form {
        let mut form = fixture.form();
        assert_eq!(form.mount().await.unwrap(), FormEntry::Editing);
        form.upload_layout(layout()).await.unwrap();
        form.set_user_name("Alice");
        form.select_user_location("Kitchen").unwrap();
        form.set_inside_temp(21.0);
        form.set_outside_temp(3.5);
        form.set_date(parse_date("2026-03-01").unwrap());
        form.set_time(parse_time_of_day("08:30").unwrap());
        form
    }

    // -- Mount ---------------------------------------------------------------

    #[tokio::test]
    async fn should_go_to_dashboard_once_finalized() {
        let fixture = Fixture::default();
        fixture.flags.set_parameters_finalized(true);

        let entry = fixture.form().mount().await.unwrap();

        assert_eq!(entry, FormEntry::Dashboard);
    }

    #[tokio::test]
    async fn should_default_to_first_profile() {
        let fixture = Fixture::default();
        let mut form = fixture.form();

        form.mount().await.unwrap();

        assert_eq!(form.profiles().len(), 2);
        assert_eq!(form.draft().profile, "Parent");
        form.select_profile("guest").unwrap();
        assert_eq!(form.draft().profile, "Guest");
        assert!(form.select_profile("Burglar").is_err());
    }

    #[tokio::test]
    async fn should_load_locations_only_when_layout_uploaded() {
        let fixture = Fixture::default();
        *fixture.house.locations.lock().unwrap() = layout();

        let mut form = fixture.form();
        form.mount().await.unwrap();
        assert!(form.location_choices().is_empty());

        fixture.flags.set_layout_uploaded(true);
        let mut form = fixture.form();
        form.mount().await.unwrap();
        assert_eq!(form.location_choices(), vec!["Kitchen", OUTSIDE]);
    }

    // -- Upload --------------------------------------------------------------

    #[tokio::test]
    async fn should_set_flag_after_upload() {
        let fixture = Fixture::default();
        let mut form = fixture.form();

        form.upload_layout(layout()).await.unwrap();

        assert!(fixture.flags.layout_uploaded());
        assert!(fixture.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn should_notify_invalid_file_when_upload_rejected() {
        let fixture = Fixture::default();
        fixture.house.reject.store(true, Ordering::SeqCst);
        let mut form = fixture.form();

        let result = form.upload_layout(layout()).await;

        assert!(result.is_err());
        assert!(!fixture.flags.layout_uploaded());
        assert_eq!(fixture.notifier.messages(), vec![INVALID_FILE]);
    }

    // -- Save ----------------------------------------------------------------

    #[tokio::test]
    async fn should_save_and_initialize_heater() {
        let fixture = Fixture::default();
        let mut form = filled_form(&fixture).await;

        form.save().await.unwrap();

        assert!(fixture.flags.parameters_finalized());
        assert_eq!(fixture.heater.0.load(Ordering::SeqCst), 1);
        let saved = fixture.parameters.saved.lock().unwrap()[0].clone();
        assert_eq!(saved.user.name, "Alice");
        assert_eq!(
            saved.user.location,
            Some(UserLocation::Room {
                position: RoomPosition::new(0, 0)
            })
        );
        assert_eq!(
            saved.date_time.map(|dt| dt.to_string()),
            Some("2026-03-01 08:30:00".to_string())
        );
    }

    #[tokio::test]
    async fn should_abort_save_without_user_name() {
        let fixture = Fixture::default();
        let mut form = filled_form(&fixture).await;
        form.set_user_name("   ");

        let result = form.save().await;

        assert!(matches!(
            result,
            Err(SimHomeError::Validation(ValidationError::MissingUserName))
        ));
        assert_eq!(
            fixture.notifier.messages(),
            vec!["A name for the user must be set"]
        );
        assert_eq!(fixture.parameters.save_count(), 0);
    }

    #[tokio::test]
    async fn should_abort_save_without_uploaded_layout() {
        let fixture = Fixture::default();
        let mut form = fixture.form();
        form.mount().await.unwrap();
        form.set_user_name("Alice");
        form.select_user_location(OUTSIDE).unwrap();

        let result = form.save().await;

        assert!(matches!(
            result,
            Err(SimHomeError::Validation(ValidationError::LayoutNotUploaded))
        ));
        assert_eq!(fixture.notifier.messages(), vec!["A layout must be uploaded"]);
        assert_eq!(fixture.parameters.save_count(), 0);
    }

    #[tokio::test]
    async fn should_abort_save_without_user_location() {
        let fixture = Fixture::default();
        let mut form = fixture.form();
        form.upload_layout(layout()).await.unwrap();
        form.set_user_name("Alice");

        let result = form.save().await;

        assert!(matches!(
            result,
            Err(SimHomeError::Validation(ValidationError::MissingUserLocation))
        ));
        assert_eq!(
            fixture.notifier.messages(),
            vec!["A location for the user must be chosen"]
        );
        assert_eq!(fixture.parameters.save_count(), 0);
    }

    #[tokio::test]
    async fn should_notify_generic_message_when_save_rejected() {
        let fixture = Fixture::default();
        fixture.parameters.reject.store(true, Ordering::SeqCst);
        let mut form = filled_form(&fixture).await;

        let result = form.save().await;

        assert!(matches!(result, Err(SimHomeError::Remote(_))));
        assert_eq!(fixture.notifier.messages(), vec![PARAMETERS_REJECTED]);
        assert!(!fixture.flags.parameters_finalized());
        assert_eq!(fixture.heater.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn should_map_outdoor_areas_to_outside() {
        let fixture = Fixture::default();
        let mut form = filled_form(&fixture).await;

        form.select_user_location("Backyard").unwrap();

        assert_eq!(form.draft().user_location, Some(UserLocation::Outside));
        assert!(form.select_user_location("Attic").is_err());
    }
}
