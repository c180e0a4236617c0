use chrono::{FixedOffset, NaiveDate, NaiveTime, Timelike};
use serde_json::json;

use appointment_cell::models::{Appointment, DateValue};
use appointment_cell::services::{
    build_list_view, distinct_appointment_dates, group_by_date_time, is_valid_date, DateFormatter,
    DateLocale,
};

fn appointment(id: i64, date: &str) -> Appointment {
    Appointment {
        id,
        name: format!("Patient {}", id),
        birth_date: "1990-01-01T00:00:00.000Z".into(),
        appointment_date: date.into(),
        completed: false,
        conclusion: String::new(),
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn en_us() -> DateFormatter {
    DateFormatter::utc(DateLocale::EnUs)
}

fn ids(appointments: &[Appointment]) -> Vec<i64> {
    appointments.iter().map(|a| a.id).collect()
}

fn sample_schedule() -> Vec<Appointment> {
    vec![
        appointment(1, "2024-05-01T09:00:00"),
        appointment(2, "2024-05-01T09:00:00"),
        appointment(3, "2024-05-02T14:30:00"),
    ]
}

#[test]
fn test_empty_input_yields_empty_outputs() {
    let formatter = en_us();
    assert!(distinct_appointment_dates(&[], &formatter).is_empty());

    let grouped = group_by_date_time(&[], None, &formatter);
    assert!(grouped.is_empty());
    assert_eq!(grouped.skipped, 0);
}

#[test]
fn test_two_day_schedule_end_to_end() {
    let formatter = en_us();
    let appointments = sample_schedule();

    let labels: Vec<String> = distinct_appointment_dates(&appointments, &formatter)
        .into_iter()
        .map(|d| d.label)
        .collect();
    assert_eq!(labels, vec!["5/1/2024", "5/2/2024"]);

    let grouped = group_by_date_time(&appointments, None, &formatter);
    assert_eq!(grouped.day_keys(), vec![day(2024, 5, 1), day(2024, 5, 2)]);

    let first = &grouped.days[0];
    assert_eq!(first.times.len(), 1);
    assert_eq!(first.times[0].label, "09:00 AM");
    assert_eq!(ids(&first.times[0].appointments), vec![1, 2]);

    let second = &grouped.days[1];
    assert_eq!(second.times.len(), 1);
    assert_eq!(second.times[0].time, hm(14, 30));
    assert_eq!(ids(&second.times[0].appointments), vec![3]);
}

#[test]
fn test_invalid_date_is_excluded_without_failing() {
    let formatter = en_us();
    let mut appointments = sample_schedule();
    appointments.push(appointment(4, "not-a-date"));

    assert!(!is_valid_date(&appointments[3].appointment_date));

    let dates = distinct_appointment_dates(&appointments, &formatter);
    assert_eq!(dates.len(), 2);

    let grouped = group_by_date_time(&appointments, None, &formatter);
    assert_eq!(grouped.skipped, 1);
    assert_eq!(grouped.appointment_count(), 3);
    assert!(grouped
        .days
        .iter()
        .flat_map(|d| d.times.iter())
        .all(|t| t.appointments.iter().all(|a| a.id != 4)));
}

#[test]
fn test_all_invalid_gives_empty_grouping() {
    let appointments = vec![appointment(1, "tomorrow"), appointment(2, "")];
    let grouped = group_by_date_time(&appointments, None, &en_us());
    assert!(grouped.is_empty());
    assert_eq!(grouped.skipped, 2);
}

#[test]
fn test_dates_are_unique_and_strictly_ascending() {
    let appointments = vec![
        appointment(1, "2025-01-01T10:00:00"),
        appointment(2, "2024-12-31T18:00:00"),
        appointment(3, "2024-02-10T09:00:00"),
        appointment(4, "2024-12-31T09:30:00"),
        appointment(5, "2024-02-10T20:00:00"),
    ];

    // dd/mm/yyyy labels would sort wrongly as strings; ordering is by date.
    let formatter = DateFormatter::utc(DateLocale::PtBr);
    let dates = distinct_appointment_dates(&appointments, &formatter);

    let labels: Vec<&str> = dates.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["10/02/2024", "31/12/2024", "01/01/2025"]);
    assert!(dates.windows(2).all(|pair| pair[0].date < pair[1].date));
}

#[test]
fn test_selected_day_keeps_only_that_day() {
    let formatter = en_us();
    let appointments = sample_schedule();

    let grouped = group_by_date_time(&appointments, Some(day(2024, 5, 2)), &formatter);
    assert_eq!(grouped.day_keys(), vec![day(2024, 5, 2)]);
    assert_eq!(grouped.appointment_count(), 1);

    let none = group_by_date_time(&appointments, Some(day(2024, 5, 3)), &formatter);
    assert!(none.is_empty());
}

#[test]
fn test_appointments_land_under_their_own_day_and_time() {
    let formatter = DateFormatter::new(DateLocale::EnUs, FixedOffset::east_opt(5 * 3600).unwrap());
    let appointments = vec![
        appointment(1, "2024-05-01T22:10:00Z"),
        appointment(2, "2024-05-01T09:45:30"),
        appointment(3, "2024-05-02T00:05:00+05:00"),
        appointment(4, "2024-05-01"),
        appointment(5, "2024-05-01T09:45:59"),
    ];

    let grouped = group_by_date_time(&appointments, None, &formatter);
    assert_eq!(grouped.appointment_count(), appointments.len());

    for day_group in &grouped.days {
        for time_group in &day_group.times {
            for appt in &time_group.appointments {
                let local = formatter.to_local(&appt.appointment_date).unwrap();
                assert_eq!(local.date(), day_group.date);
                assert_eq!((local.hour(), local.minute()), (time_group.time.hour(), time_group.time.minute()));
            }
        }
    }

    // 22:10Z is 03:10 the next day at +05:00.
    let may_second = grouped.day(day(2024, 5, 2)).unwrap();
    assert_eq!(ids(&may_second.times[0].appointments), vec![3]);
    assert_eq!(ids(&may_second.times[1].appointments), vec![1]);

    // Seconds collapse into the same minute.
    let may_first = grouped.day(day(2024, 5, 1)).unwrap();
    assert_eq!(ids(&may_first.time(hm(9, 45)).unwrap().appointments), vec![2, 5]);
}

#[test]
fn test_days_and_times_are_ascending() {
    let appointments = vec![
        appointment(1, "2024-05-03T16:00:00"),
        appointment(2, "2024-05-01T11:00:00"),
        appointment(3, "2024-05-01T08:30:00"),
        appointment(4, "2024-05-03T10:00:00"),
    ];

    let grouped = group_by_date_time(&appointments, None, &en_us());
    assert_eq!(grouped.day_keys(), vec![day(2024, 5, 1), day(2024, 5, 3)]);
    for day_group in &grouped.days {
        assert!(day_group.times.windows(2).all(|pair| pair[0].time < pair[1].time));
    }
}

#[test]
fn test_equal_instants_keep_input_order() {
    let appointments = vec![
        appointment(7, "2024-05-01T09:00:00"),
        appointment(3, "2024-05-01T09:00:00"),
        appointment(5, "2024-05-01T09:00:00"),
    ];

    let grouped = group_by_date_time(&appointments, None, &en_us());
    assert_eq!(ids(&grouped.days[0].times[0].appointments), vec![7, 3, 5]);
}

#[test]
fn test_grouping_is_idempotent_and_leaves_input_untouched() {
    let formatter = en_us();
    let appointments = vec![
        appointment(3, "2024-05-02T14:30:00"),
        appointment(1, "2024-05-01T09:00:00"),
        appointment(2, "bogus"),
    ];
    let before = appointments.clone();

    let first = group_by_date_time(&appointments, None, &formatter);
    let second = group_by_date_time(&appointments, None, &formatter);

    assert_eq!(first, second);
    assert_eq!(appointments, before);
}

#[test]
fn test_records_from_api_json() {
    let records = json!([
        { "id": 1, "name": "Ana", "birthDate": "1990-03-14", "appointmentDate": 1714554000000i64, "completed": true, "conclusion": null },
        { "id": 2, "name": "Bruno", "appointmentDate": "2024-05-01T09:00:00" },
        { "id": 3, "name": "Carla", "appointmentDate": { "when": "soon" } },
        { "id": 4, "name": "Davi", "appointmentDate": null }
    ]);

    let appointments: Vec<Appointment> = serde_json::from_value(records).unwrap();
    assert_eq!(appointments[0].appointment_date, DateValue::Millis(1_714_554_000_000));
    assert_eq!(appointments[0].conclusion, "");
    assert!(!appointments[1].completed);

    let grouped = group_by_date_time(&appointments, None, &en_us());
    assert_eq!(grouped.skipped, 2);
    assert_eq!(grouped.appointment_count(), 2);

    // 1714554000000 ms is 2024-05-01T09:00:00Z.
    assert_eq!(ids(&grouped.days[0].times[0].appointments), vec![1, 2]);
}

#[test]
fn test_list_view_reports_empty_state() {
    let formatter = DateFormatter::utc(DateLocale::PtBr);

    let view = build_list_view(&sample_schedule(), Some(day(2024, 6, 1)), &formatter);
    assert!(view.empty);
    assert_eq!(view.total, 0);
    assert_eq!(view.message.as_deref(), Some("Nenhum agendamento encontrado."));
    assert_eq!(view.dates.len(), 2);
    assert_eq!(view.selected_date.unwrap().label, "01/06/2024");

    let full = build_list_view(&sample_schedule(), None, &formatter);
    assert!(!full.empty);
    assert_eq!(full.total, 3);
    assert!(full.message.is_none());
    assert!(full.selected_date.is_none());
}
