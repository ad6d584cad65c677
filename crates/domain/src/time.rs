//! Time and timestamp helpers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// UTC timestamp used for event times.
pub type Timestamp = DateTime<Utc>;

/// Wall-clock time inside the simulation; it carries no time zone.
pub type SimulationTime = NaiveDateTime;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Combine a calendar date and a time of day into a simulation time.
#[must_use]
pub fn simulation_time(date: NaiveDate, time: NaiveTime) -> SimulationTime {
    date.and_time(time)
}

/// Midnight at the start of `date`, used for season boundaries.
#[must_use]
pub fn start_of_day(date: NaiveDate) -> SimulationTime {
    date.and_time(NaiveTime::MIN)
}

/// Parse a time of day given as `HH:MM` (seconds default to zero) or `HH:MM:SS`.
///
/// # Errors
///
/// Returns the chrono parse error when neither format matches.
pub fn parse_time_of_day(input: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(input, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
}

/// Parse a calendar date given as `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns the chrono parse error when the input is not an ISO date.
pub fn parse_date(input: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
}
