// libs/appointment-cell/src/services/remote.rs
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_client::{ClientError, RestClient};
use shared_config::AppConfig;

use crate::models::{Appointment, AppointmentError, UpdateCompletionRequest};

/// Calls to the upstream appointments API.
pub struct AppointmentApiService {
    client: RestClient,
}

impl AppointmentApiService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: RestClient::new(config),
        }
    }

    pub async fn fetch_appointments(&self) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Fetching appointments from {}", self.client.get_base_url());

        let appointments: Vec<Appointment> = self
            .client
            .request(Method::GET, "/appointments", None)
            .await?;

        debug!("Fetched {} appointments", appointments.len());
        Ok(appointments)
    }

    /// Sends the completion state upstream. Returns whatever JSON body the API
    /// answered with; it may be the full record, part of it, or only an
    /// acknowledgement.
    pub async fn update_completion(
        &self,
        appointment_id: i64,
        request: &UpdateCompletionRequest,
    ) -> Result<Option<Value>, AppointmentError> {
        let path = format!("/appointments/{}", appointment_id);
        let body = json!({
            "completed": request.completed,
            "conclusion": request.conclusion,
        });

        let updated = self
            .client
            .request_optional::<Value>(Method::PATCH, &path, Some(body))
            .await
            .map_err(|e| match e {
                ClientError::NotFound(_) => AppointmentError::NotFound(appointment_id),
                other => AppointmentError::Upstream(other),
            })?;

        info!(
            "Appointment {} marked completed={}",
            appointment_id, request.completed
        );
        Ok(updated)
    }
}
