// libs/appointment-cell/src/models.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use shared_client::ClientError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// A vaccination appointment as returned by the appointments API.
///
/// Date fields are kept exactly as received and only parsed when a view is
/// derived, so one malformed record never rejects the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub birth_date: DateValue,
    #[serde(default)]
    pub appointment_date: DateValue,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub conclusion: String,
}

impl Appointment {
    /// Copy of this appointment carrying a new completion state.
    pub fn with_completion(&self, completed: bool, conclusion: &str) -> Self {
        Self {
            completed,
            conclusion: conclusion.to_string(),
            ..self.clone()
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Raw date/time value of an appointment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// Epoch milliseconds sent as a JSON float; the fraction is dropped.
    FractionalMillis(f64),
    Text(String),
    /// Anything else the API sent, `null` included. Never a valid date.
    Other(Value),
}

impl Default for DateValue {
    fn default() -> Self {
        DateValue::Other(Value::Null)
    }
}

impl From<&str> for DateValue {
    fn from(value: &str) -> Self {
        DateValue::Text(value.to_string())
    }
}

impl From<i64> for DateValue {
    fn from(value: i64) -> Self {
        DateValue::Millis(value)
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateValue::Millis(ms) => write!(f, "{}", ms),
            DateValue::FractionalMillis(ms) => write!(f, "{}", ms),
            DateValue::Text(text) => write!(f, "{}", text),
            DateValue::Other(value) => write!(f, "{}", value),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCompletionRequest {
    pub completed: bool,
    #[serde(default)]
    pub conclusion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCompletionResponse {
    pub success: bool,
    pub appointment: Appointment,
}

// ==============================================================================
// GROUPED VIEW MODELS
// ==============================================================================

/// A calendar day that has at least one appointment, with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDay {
    pub date: NaiveDate,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeGroup {
    pub time: NaiveTime,
    pub label: String,
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub label: String,
    pub times: Vec<TimeGroup>,
}

impl DayGroup {
    pub fn appointment_count(&self) -> usize {
        self.times.iter().map(|group| group.appointments.len()).sum()
    }

    pub fn time(&self, time: NaiveTime) -> Option<&TimeGroup> {
        self.times.iter().find(|group| group.time == time)
    }
}

/// Appointments grouped by day, then by hour:minute.
///
/// `days` is ascending by date and each day's `times` is ascending by time;
/// callers can rely on that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedAppointments {
    pub days: Vec<DayGroup>,
    /// Records left out because their appointment date could not be parsed.
    pub skipped: usize,
}

impl GroupedAppointments {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day_keys(&self) -> Vec<NaiveDate> {
        self.days.iter().map(|day| day.date).collect()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayGroup> {
        self.days.iter().find(|day| day.date == date)
    }

    pub fn appointment_count(&self) -> usize {
        self.days.iter().map(DayGroup::appointment_count).sum()
    }
}

/// Everything the appointment list page needs for one render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentListView {
    pub selected_date: Option<AppointmentDay>,
    pub dates: Vec<AppointmentDay>,
    pub days: Vec<DayGroup>,
    /// Birth date label of each listed appointment, by id. Records whose
    /// birth date cannot be parsed have no entry.
    pub birth_dates: BTreeMap<i64, String>,
    pub skipped: usize,
    pub total: usize,
    pub empty: bool,
    pub message: Option<String>,
}

// ==============================================================================
// TIME SLOT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotListResponse {
    pub day: NaiveDate,
    pub interval_minutes: u32,
    pub times: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotCheckResponse {
    pub day: NaiveDate,
    pub time: String,
    pub disabled: bool,
    pub allowed: bool,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment {0} not found")]
    NotFound(i64),

    #[error("Invalid appointment id: {0}")]
    InvalidId(i64),

    #[error("Invalid day: {0}")]
    InvalidDay(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Slot interval must be between 1 and 720 minutes, got {0}")]
    InvalidSlotInterval(u32),

    #[error("Unsupported date locale: {0}")]
    UnsupportedLocale(String),

    #[error("Invalid display offset: {0} minutes")]
    InvalidOffset(i32),

    #[error("Appointments API error: {0}")]
    Upstream(#[from] ClientError),
}
