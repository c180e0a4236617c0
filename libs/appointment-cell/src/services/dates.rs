// libs/appointment-cell/src/services/dates.rs
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Timelike, Utc};
use tracing::debug;

use shared_config::AppConfig;

use crate::models::{AppointmentError, DateValue};

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Locale used for day and time labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateLocale {
    /// `01/05/2024`, `09:00`
    #[default]
    PtBr,
    /// `5/1/2024`, `09:00 AM`
    EnUs,
}

impl DateLocale {
    pub fn tag(&self) -> &'static str {
        match self {
            DateLocale::PtBr => "pt-BR",
            DateLocale::EnUs => "en-US",
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match self {
            DateLocale::PtBr => "Nenhum agendamento encontrado.",
            DateLocale::EnUs => "No appointments found.",
        }
    }
}

impl FromStr for DateLocale {
    type Err = AppointmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Ok(DateLocale::PtBr),
            "en-us" | "en" => Ok(DateLocale::EnUs),
            _ => Err(AppointmentError::UnsupportedLocale(s.to_string())),
        }
    }
}

/// Parses appointment dates into the display offset and renders labels.
///
/// Days and times are compared as `NaiveDate`/`NaiveTime` values; strings
/// only appear in labels.
#[derive(Debug, Clone, Copy)]
pub struct DateFormatter {
    locale: DateLocale,
    offset: FixedOffset,
}

impl DateFormatter {
    pub fn new(locale: DateLocale, offset: FixedOffset) -> Self {
        Self { locale, offset }
    }

    pub fn utc(locale: DateLocale) -> Self {
        Self::new(locale, Utc.fix())
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppointmentError> {
        let locale = config.date_locale.parse()?;
        let offset = FixedOffset::east_opt(config.display_utc_offset_minutes * 60)
            .ok_or(AppointmentError::InvalidOffset(config.display_utc_offset_minutes))?;
        Ok(Self::new(locale, offset))
    }

    pub fn locale(&self) -> DateLocale {
        self.locale
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn instant(&self, value: &DateValue) -> Option<DateTime<FixedOffset>> {
        parse_date_value(value, self.offset)
    }

    /// Wall-clock date and time of `value` in the display offset.
    pub fn to_local(&self, value: &DateValue) -> Option<NaiveDateTime> {
        self.instant(value).map(|instant| instant.naive_local())
    }

    pub fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }

    pub fn day_label(&self, day: NaiveDate) -> String {
        match self.locale {
            DateLocale::PtBr => day.format("%d/%m/%Y").to_string(),
            DateLocale::EnUs => day.format("%-m/%-d/%Y").to_string(),
        }
    }

    pub fn time_label<T: Timelike>(&self, time: &T) -> String {
        match self.locale {
            DateLocale::PtBr => format!("{:02}:{:02}", time.hour(), time.minute()),
            DateLocale::EnUs => {
                let (is_pm, hour) = time.hour12();
                let suffix = if is_pm { "PM" } else { "AM" };
                format!("{:02}:{:02} {}", hour, time.minute(), suffix)
            }
        }
    }

    /// Accepts an ISO day (`2024-05-01`) or this formatter's day label.
    pub fn parse_day(&self, input: &str) -> Option<NaiveDate> {
        let input = input.trim();
        if let Ok(day) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            return Some(day);
        }

        let mut parts = input.split('/').map(|part| part.trim().parse::<u32>());
        let (first, second, year) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(first)), Some(Ok(second)), Some(Ok(year)), None) => (first, second, year),
            _ => {
                debug!("Unrecognised day filter: {}", input);
                return None;
            }
        };

        let year = i32::try_from(year).ok()?;
        match self.locale {
            DateLocale::PtBr => NaiveDate::from_ymd_opt(year, second, first),
            DateLocale::EnUs => NaiveDate::from_ymd_opt(year, first, second),
        }
    }
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self::utc(DateLocale::default())
    }
}

/// Parses a raw appointment date into an instant shown in `offset`.
///
/// RFC 3339 values keep their own offset, naive date-times are read as
/// wall-clock time in `offset`, bare dates are UTC midnight and numbers are
/// epoch milliseconds.
pub fn parse_date_value(value: &DateValue, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    match value {
        DateValue::Millis(ms) => {
            DateTime::from_timestamp_millis(*ms).map(|instant| instant.with_timezone(&offset))
        }
        DateValue::FractionalMillis(ms) if ms.is_finite() => {
            DateTime::from_timestamp_millis(ms.trunc() as i64).map(|instant| instant.with_timezone(&offset))
        }
        DateValue::FractionalMillis(_) => None,
        DateValue::Text(text) => parse_date_text(text.trim(), offset),
        DateValue::Other(_) => None,
    }
}

fn parse_date_text(text: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    if text.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&offset));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return offset.from_local_datetime(&naive).single();
        }
    }

    let midnight = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight).with_timezone(&offset))
}

/// True when `value` parses into a real instant.
pub fn is_valid_date(value: &DateValue) -> bool {
    parse_date_value(value, Utc.fix()).is_some()
}
