// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch},
};

use shared_config::AppConfig;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        // Appointment list page
        .route("/", get(handlers::list_appointments))
        .route("/dates", get(handlers::get_appointment_dates))
        .route("/{appointment_id}/completion", patch(handlers::update_completion))

        // Time picker for the creation flow
        .route("/slots", get(handlers::get_selectable_slots))
        .route("/slots/check", get(handlers::check_slot))

        .with_state(state)
}
