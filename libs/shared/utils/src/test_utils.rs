use std::sync::Arc;
use serde_json::{json, Value};

use shared_config::AppConfig;

pub struct TestConfig {
    pub appointments_api_url: String,
    pub date_locale: String,
    pub display_utc_offset_minutes: i32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            appointments_api_url: "http://localhost:3000/api".to_string(),
            date_locale: "en-US".to_string(),
            display_utc_offset_minutes: 0,
        }
    }
}

impl TestConfig {
    /// Points the config at a mock upstream, usually `MockServer::uri()`.
    pub fn with_api_url(api_url: &str) -> Self {
        Self {
            appointments_api_url: api_url.to_string(),
            ..Self::default()
        }
    }

    pub fn locale(mut self, locale: &str) -> Self {
        self.date_locale = locale.to_string();
        self
    }

    pub fn offset_minutes(mut self, minutes: i32) -> Self {
        self.display_utc_offset_minutes = minutes;
        self
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            appointments_api_url: self.appointments_api_url.clone(),
            date_locale: self.date_locale.clone(),
            display_utc_offset_minutes: self.display_utc_offset_minutes,
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct MockApiResponses;

impl MockApiResponses {
    pub fn appointment(id: i64, name: &str, appointment_date: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "birthDate": "1990-03-14T00:00:00.000Z",
            "appointmentDate": appointment_date,
            "completed": false,
            "conclusion": ""
        })
    }

    pub fn completed_appointment(id: i64, name: &str, appointment_date: &str, conclusion: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "birthDate": "1985-11-02T00:00:00.000Z",
            "appointmentDate": appointment_date,
            "completed": true,
            "conclusion": conclusion
        })
    }

    /// Two appointments sharing 2024-05-01 09:00 and one on 2024-05-02 14:30.
    pub fn two_day_schedule() -> Value {
        json!([
            Self::appointment(1, "Ana Souza", "2024-05-01T09:00:00"),
            Self::appointment(2, "Bruno Lima", "2024-05-01T09:00:00"),
            Self::appointment(3, "Carla Dias", "2024-05-02T14:30:00"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder_overrides() {
        let config = TestConfig::with_api_url("http://127.0.0.1:9999")
            .locale("pt-BR")
            .offset_minutes(-180)
            .to_app_config();

        assert_eq!(config.appointments_api_url, "http://127.0.0.1:9999");
        assert_eq!(config.date_locale, "pt-BR");
        assert_eq!(config.display_utc_offset_minutes, -180);
    }

    #[test]
    fn test_two_day_schedule_shape() {
        let schedule = MockApiResponses::two_day_schedule();
        let records = schedule.as_array().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2]["appointmentDate"], "2024-05-02T14:30:00");
    }
}
