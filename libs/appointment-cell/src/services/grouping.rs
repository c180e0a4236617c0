// libs/appointment-cell/src/services/grouping.rs
use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::{debug, warn};

use crate::models::{Appointment, AppointmentDay, DayGroup, GroupedAppointments, TimeGroup};
use crate::services::dates::DateFormatter;

/// Distinct calendar days with at least one valid appointment, ascending.
pub fn distinct_appointment_dates(
    appointments: &[Appointment],
    formatter: &DateFormatter,
) -> Vec<AppointmentDay> {
    let days: BTreeSet<NaiveDate> = appointments
        .iter()
        .filter_map(|appointment| formatter.to_local(&appointment.appointment_date))
        .map(|local| local.date())
        .collect();

    days.into_iter()
        .map(|date| AppointmentDay {
            date,
            label: formatter.day_label(date),
        })
        .collect()
}

/// Groups appointments by day and hour:minute, optionally keeping one day.
///
/// Records with an unparseable appointment date are skipped with a warning
/// and counted in `skipped`; they never fail the whole grouping. Appointments
/// sharing the same instant keep their input order.
pub fn group_by_date_time(
    appointments: &[Appointment],
    selected_day: Option<NaiveDate>,
    formatter: &DateFormatter,
) -> GroupedAppointments {
    let mut dated: Vec<(NaiveDateTime, &Appointment)> = Vec::with_capacity(appointments.len());
    let mut skipped = 0;

    for appointment in appointments {
        match formatter.to_local(&appointment.appointment_date) {
            Some(local) => dated.push((local, appointment)),
            None => {
                warn!(
                    appointment_id = appointment.id,
                    "Invalid date found: {}", appointment.appointment_date
                );
                skipped += 1;
            }
        }
    }

    // Stable: equal instants keep their relative order.
    dated.sort_by_key(|(local, _)| *local);

    let mut days: Vec<DayGroup> = Vec::new();

    for (local, appointment) in dated {
        let date = local.date();
        if selected_day.is_some_and(|selected| selected != date) {
            continue;
        }

        let time = slot_time(&local);

        // Input is sorted, so a new day or time can only follow the last one.
        if days.last().map(|day| day.date) != Some(date) {
            days.push(DayGroup {
                date,
                label: formatter.day_label(date),
                times: Vec::new(),
            });
        }
        let Some(day) = days.last_mut() else { continue };

        if day.times.last().map(|group| group.time) != Some(time) {
            day.times.push(TimeGroup {
                time,
                label: formatter.time_label(&time),
                appointments: Vec::new(),
            });
        }
        if let Some(group) = day.times.last_mut() {
            group.appointments.push(appointment.clone());
        }
    }

    debug!(
        "Grouped {} valid appointments into {} days ({} skipped)",
        appointments.len() - skipped,
        days.len(),
        skipped
    );

    GroupedAppointments { days, skipped }
}

fn slot_time(local: &NaiveDateTime) -> NaiveTime {
    // Hour and minute come from a valid NaiveDateTime, so this never falls back.
    NaiveTime::from_hms_opt(local.hour(), local.minute(), 0).unwrap_or(NaiveTime::MIN)
}
