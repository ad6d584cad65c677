//! Simulation parameters: the user, their profile and location, and the
//! environment the simulation starts from.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::RoomPosition;
use crate::location::Location;
use crate::macros::string_enum;
use crate::time::{SimulationTime, simulation_time, start_of_day};

/// Access role attached to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Parent,
    Child,
    Guest,
    Stranger,
}

string_enum!(Role, "role", {
    Parent => "PARENT",
    Child => "CHILD",
    Guest => "GUEST",
    Stranger => "STRANGER",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub role: Role,
}

/// Where the simulated user stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UserLocation {
    Room { position: RoomPosition },
    Outside,
}

impl UserLocation {
    /// The user location matching a house location; outdoor areas all map
    /// to [`UserLocation::Outside`].
    #[must_use]
    pub fn of(location: &Location) -> Self {
        match location {
            Location::Room(room) => Self::Room {
                position: room.position,
            },
            Location::Outdoor(_) => Self::Outside,
        }
    }
}

impl fmt::Display for UserLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Room { position } => write!(f, "room {position}"),
            Self::Outside => f.write_str("Outside"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub profile: String,
    pub location: Option<UserLocation>,
}

/// Dates at which summer and winter begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonDates {
    pub summer_start: Option<SimulationTime>,
    pub winter_start: Option<SimulationTime>,
}

/// Everything submitted when the operator applies the parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    pub user: User,
    pub inside_temp: Option<f64>,
    pub outside_temp: Option<f64>,
    pub date_time: Option<SimulationTime>,
    pub season_dates: SeasonDates,
}

/// Parameters as they are being filled in; nothing is required until
/// [`validate`](Self::validate) runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParametersDraft {
    pub user_name: Option<String>,
    pub profile: String,
    pub user_location: Option<UserLocation>,
    pub inside_temp: Option<f64>,
    pub outside_temp: Option<f64>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub summer_start: Option<NaiveDate>,
    pub winter_start: Option<NaiveDate>,
}

impl ParametersDraft {
    /// The simulation start, once both a date and a time were chosen.
    #[must_use]
    pub fn date_time(&self) -> Option<SimulationTime> {
        Some(simulation_time(self.date?, self.time?))
    }

    /// Check the save preconditions, in the order the operator is told
    /// about them: user name, uploaded layout, user location.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`ValidationError`].
    pub fn validate(&self, layout_uploaded: bool) -> Result<SimulationParameters, ValidationError> {
        let name = self
            .user_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(ValidationError::MissingUserName)?;
        if !layout_uploaded {
            return Err(ValidationError::LayoutNotUploaded);
        }
        let location = self
            .user_location
            .ok_or(ValidationError::MissingUserLocation)?;

        Ok(SimulationParameters {
            user: User {
                name: name.to_string(),
                profile: self.profile.clone(),
                location: Some(location),
            },
            inside_temp: self.inside_temp,
            outside_temp: self.outside_temp,
            date_time: self.date_time(),
            season_dates: SeasonDates {
                summer_start: self.summer_start.map(start_of_day),
                winter_start: self.winter_start.map(start_of_day),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::OutdoorPlace;
    use crate::time::{parse_date, parse_time_of_day};

    fn complete_draft() -> ParametersDraft {
        ParametersDraft {
            user_name: Some("Alice".to_string()),
            profile: "Parent".to_string(),
            user_location: Some(UserLocation::Room {
                position: RoomPosition::new(0, 0),
            }),
            inside_temp: Some(21.0),
            outside_temp: Some(-4.5),
            date: Some(parse_date("2026-01-10").unwrap()),
            time: Some(parse_time_of_day("07:45").unwrap()),
            summer_start: Some(parse_date("2026-06-01").unwrap()),
            winter_start: None,
        }
    }

    #[test]
    fn should_build_parameters_when_all_preconditions_hold() {
        let params = complete_draft().validate(true).unwrap();
        assert_eq!(params.user.name, "Alice");
        assert_eq!(
            params.date_time.map(|t| t.to_string()).as_deref(),
            Some("2026-01-10 07:45:00")
        );
        assert_eq!(
            params.season_dates.summer_start.map(|t| t.to_string()).as_deref(),
            Some("2026-06-01 00:00:00")
        );
        assert!(params.season_dates.winter_start.is_none());
    }

    #[test]
    fn should_require_user_name() {
        let mut draft = complete_draft();
        draft.user_name = None;
        assert_eq!(draft.validate(true), Err(ValidationError::MissingUserName));

        draft.user_name = Some("   ".to_string());
        assert_eq!(draft.validate(true), Err(ValidationError::MissingUserName));
    }

    #[test]
    fn should_require_uploaded_layout() {
        assert_eq!(
            complete_draft().validate(false),
            Err(ValidationError::LayoutNotUploaded)
        );
    }

    #[test]
    fn should_require_user_location() {
        let mut draft = complete_draft();
        draft.user_location = None;
        assert_eq!(
            draft.validate(true),
            Err(ValidationError::MissingUserLocation)
        );
    }

    #[test]
    fn should_report_name_before_layout_and_location() {
        let draft = ParametersDraft::default();
        assert_eq!(draft.validate(false), Err(ValidationError::MissingUserName));
    }

    #[test]
    fn should_leave_date_time_empty_without_time() {
        let mut draft = complete_draft();
        draft.time = None;
        assert!(draft.date_time().is_none());
    }

    #[test]
    fn should_map_outdoor_locations_to_outside() {
        let loc = Location::outdoor(OutdoorPlace::Entrance);
        assert_eq!(UserLocation::of(&loc), UserLocation::Outside);
        assert_eq!(UserLocation::Outside.to_string(), "Outside");
    }

    #[test]
    fn should_serialize_parameters_in_camel_case() {
        let params = complete_draft().validate(true).unwrap();
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["insideTemp"], 21.0);
        assert!(json["seasonDates"]["summerStart"].is_string());
    }
}
