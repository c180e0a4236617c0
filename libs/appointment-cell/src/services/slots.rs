// libs/appointment-cell/src/services/slots.rs
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::debug;

use crate::models::AppointmentError;

/// First hour a new appointment may start.
pub const BUSINESS_OPEN_HOUR: u32 = 9;
/// Last hour a new appointment may start; every minute of it is allowed.
pub const BUSINESS_CLOSE_HOUR: u32 = 20;

const MAX_SLOT_INTERVAL_MINUTES: u32 = 720;

/// Time-picker rules for creating appointments.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotPolicy;

impl SlotPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Whether `candidate` on `appointment_day` must be greyed out in the picker.
    ///
    /// On the current hour of today, minutes up to and including the current
    /// minute stay selectable, even outside business hours.
    pub fn is_disabled_time(
        &self,
        candidate: NaiveTime,
        appointment_day: NaiveDate,
        now: NaiveDateTime,
    ) -> bool {
        let is_today = appointment_day == now.date();
        let current_hour = now.hour();
        let selected_hour = candidate.hour();

        if is_today && selected_hour == current_hour && candidate.minute() <= now.minute() {
            return false;
        }

        selected_hour < BUSINESS_OPEN_HOUR
            || selected_hour > BUSINESS_CLOSE_HOUR
            || (is_today && selected_hour < current_hour)
    }

    /// Positive form of [`SlotPolicy::is_disabled_time`] for pickers that
    /// take an allow-filter.
    pub fn filter_time(
        &self,
        candidate: NaiveTime,
        appointment_day: NaiveDate,
        now: NaiveDateTime,
    ) -> bool {
        !self.is_disabled_time(candidate, appointment_day, now)
    }

    /// Picker times for `day`, every `interval_minutes` from midnight, that
    /// pass [`SlotPolicy::filter_time`].
    pub fn selectable_times(
        &self,
        day: NaiveDate,
        now: NaiveDateTime,
        interval_minutes: u32,
    ) -> Result<Vec<NaiveTime>, AppointmentError> {
        if interval_minutes == 0 || interval_minutes > MAX_SLOT_INTERVAL_MINUTES {
            return Err(AppointmentError::InvalidSlotInterval(interval_minutes));
        }

        let step = Duration::minutes(i64::from(interval_minutes));
        let mut times = Vec::new();
        let mut offset = Duration::zero();

        while offset < Duration::days(1) {
            let candidate = NaiveTime::MIN + offset;
            if self.filter_time(candidate, day, now) {
                times.push(candidate);
            }
            offset += step;
        }

        debug!(
            "{} selectable times on {} at {} minute intervals",
            times.len(),
            day,
            interval_minutes
        );

        Ok(times)
    }
}
