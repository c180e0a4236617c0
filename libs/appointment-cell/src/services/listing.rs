// libs/appointment-cell/src/services/listing.rs
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use tracing::{debug, info, warn};

use shared_config::AppConfig;

use crate::models::{
    Appointment, AppointmentDay, AppointmentError, AppointmentListView, SlotCheckResponse,
    SlotListResponse, UpdateCompletionRequest,
};
use crate::services::dates::DateFormatter;
use crate::services::grouping::{distinct_appointment_dates, group_by_date_time};
use crate::services::remote::AppointmentApiService;
use crate::services::slots::SlotPolicy;

/// Derives the list page view from a freshly fetched appointment list.
pub fn build_list_view(
    appointments: &[Appointment],
    selected_day: Option<NaiveDate>,
    formatter: &DateFormatter,
) -> AppointmentListView {
    let grouped = group_by_date_time(appointments, selected_day, formatter);
    let dates = distinct_appointment_dates(appointments, formatter);
    let total = grouped.appointment_count();
    let empty = grouped.is_empty();
    let birth_dates = grouped
        .days
        .iter()
        .flat_map(|day| &day.times)
        .flat_map(|group| &group.appointments)
        .filter_map(|appointment| {
            let born = formatter.to_local(&appointment.birth_date)?.date();
            Some((appointment.id, formatter.day_label(born)))
        })
        .collect();

    AppointmentListView {
        selected_date: selected_day.map(|date| AppointmentDay {
            date,
            label: formatter.day_label(date),
        }),
        dates,
        skipped: grouped.skipped,
        days: grouped.days,
        birth_dates,
        total,
        empty,
        message: empty.then(|| formatter.locale().empty_message().to_string()),
    }
}

pub struct AppointmentListService {
    api: AppointmentApiService,
    formatter: DateFormatter,
    slots: SlotPolicy,
    default_interval: u32,
}

impl AppointmentListService {
    pub fn new(config: &AppConfig) -> Result<Self, AppointmentError> {
        let formatter = DateFormatter::from_config(config)?;
        debug!(
            "Formatting days as {} at UTC{}",
            formatter.locale().tag(),
            formatter.offset()
        );

        Ok(Self {
            api: AppointmentApiService::new(config),
            formatter,
            slots: SlotPolicy::new(),
            default_interval: config.slot_interval_minutes,
        })
    }

    pub fn formatter(&self) -> &DateFormatter {
        &self.formatter
    }

    /// An absent or blank filter means "all days".
    pub fn parse_day_filter(&self, filter: Option<&str>) -> Result<Option<NaiveDate>, AppointmentError> {
        match filter.map(str::trim).filter(|value| !value.is_empty()) {
            None => Ok(None),
            Some(value) => self
                .formatter
                .parse_day(value)
                .map(Some)
                .ok_or_else(|| AppointmentError::InvalidDay(value.to_string())),
        }
    }

    pub async fn list_view(&self, filter: Option<&str>) -> Result<AppointmentListView, AppointmentError> {
        let selected_day = self.parse_day_filter(filter)?;
        let appointments = self.api.fetch_appointments().await?;

        let view = build_list_view(&appointments, selected_day, &self.formatter);
        if view.skipped > 0 {
            warn!("{} appointments left out of the list view due to invalid dates", view.skipped);
        }

        debug!(
            "List view built: {} appointments across {} days",
            view.total,
            view.days.len()
        );
        Ok(view)
    }

    pub async fn appointment_dates(&self) -> Result<Vec<AppointmentDay>, AppointmentError> {
        let appointments = self.api.fetch_appointments().await?;
        Ok(distinct_appointment_dates(&appointments, &self.formatter))
    }

    /// Stores the completion state upstream and returns the resulting record.
    ///
    /// A full record in the API's answer is returned as-is. Otherwise the
    /// record is re-read, the new state merged into it, and any fields the
    /// API did send back are laid over the result.
    pub async fn update_completion(
        &self,
        appointment_id: i64,
        request: UpdateCompletionRequest,
    ) -> Result<Appointment, AppointmentError> {
        if appointment_id <= 0 {
            return Err(AppointmentError::InvalidId(appointment_id));
        }

        let answer = self.api.update_completion(appointment_id, &request).await?;
        if let Some(updated) = answer.as_ref().and_then(|body| full_record(body, appointment_id)) {
            return Ok(updated);
        }

        let appointments = self.api.fetch_appointments().await?;
        let listed = appointments
            .iter()
            .find(|appointment| appointment.id == appointment_id)
            .map(|appointment| appointment.with_completion(request.completed, &request.conclusion))
            .ok_or(AppointmentError::NotFound(appointment_id))?;

        let merged = overlay_record(listed, answer.as_ref(), appointment_id);
        info!("Appointment {} completion merged locally", appointment_id);
        Ok(merged)
    }

    pub fn selectable_slots(
        &self,
        day: &str,
        interval_minutes: Option<u32>,
        now: NaiveDateTime,
    ) -> Result<SlotListResponse, AppointmentError> {
        let day = self.parse_required_day(day)?;
        let interval_minutes = interval_minutes.unwrap_or(self.default_interval);

        let times = self
            .slots
            .selectable_times(day, now, interval_minutes)?
            .iter()
            .map(|time| time.format("%H:%M").to_string())
            .collect();

        Ok(SlotListResponse {
            day,
            interval_minutes,
            times,
        })
    }

    pub fn check_slot(
        &self,
        day: &str,
        time: &str,
        now: NaiveDateTime,
    ) -> Result<SlotCheckResponse, AppointmentError> {
        let day = self.parse_required_day(day)?;
        let candidate = parse_time(time)?;
        let disabled = self.slots.is_disabled_time(candidate, day, now);

        Ok(SlotCheckResponse {
            day,
            time: candidate.format("%H:%M").to_string(),
            disabled,
            allowed: !disabled,
        })
    }

    fn parse_required_day(&self, day: &str) -> Result<NaiveDate, AppointmentError> {
        self.formatter
            .parse_day(day)
            .ok_or_else(|| AppointmentError::InvalidDay(day.to_string()))
    }
}

const RECORD_FIELDS: [&str; 4] = ["id", "name", "birthDate", "appointmentDate"];

/// The API's answer as a complete record of `appointment_id`, if it is one.
fn full_record(body: &Value, appointment_id: i64) -> Option<Appointment> {
    let fields = body.as_object()?;
    if !RECORD_FIELDS.iter().all(|key| fields.contains_key(*key)) {
        return None;
    }

    serde_json::from_value::<Appointment>(body.clone())
        .ok()
        .filter(|appointment| appointment.id == appointment_id)
}

/// Lays the fields of a partial answer over the listed record. Answers that
/// do not name the appointment are acknowledgements and leave it unchanged.
fn overlay_record(listed: Appointment, answer: Option<&Value>, appointment_id: i64) -> Appointment {
    let Some(fields) = answer
        .and_then(Value::as_object)
        .filter(|fields| fields.get("id").and_then(Value::as_i64) == Some(appointment_id))
    else {
        debug!("Upstream acknowledged appointment {} without a record", appointment_id);
        return listed;
    };

    let Ok(Value::Object(mut merged)) = serde_json::to_value(&listed) else {
        return listed;
    };
    merged.extend(fields.iter().map(|(key, value)| (key.clone(), value.clone())));

    match serde_json::from_value(Value::Object(merged)) {
        Ok(appointment) => appointment,
        Err(e) => {
            warn!("Ignoring unreadable answer for appointment {}: {}", appointment_id, e);
            listed
        }
    }
}

fn parse_time(time: &str) -> Result<NaiveTime, AppointmentError> {
    let time = time.trim();
    NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .map_err(|_| AppointmentError::InvalidTime(time.to_string()))
}
