// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    AppointmentDay, AppointmentError, AppointmentListView, SlotCheckResponse, SlotListResponse,
    UpdateCompletionRequest, UpdateCompletionResponse,
};
use crate::services::listing::AppointmentListService;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub day: String,
    pub interval: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SlotCheckQuery {
    pub day: String,
    pub time: String,
}

fn to_app_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound(id) => AppError::NotFound(format!("Appointment {} not found", id)),
        AppointmentError::InvalidId(_)
        | AppointmentError::InvalidDay(_)
        | AppointmentError::InvalidTime(_)
        | AppointmentError::InvalidSlotInterval(_) => AppError::BadRequest(e.to_string()),
        AppointmentError::UnsupportedLocale(_) | AppointmentError::InvalidOffset(_) => {
            AppError::Internal(e.to_string())
        }
        AppointmentError::Upstream(inner) => AppError::from(inner),
    }
}

fn list_service(state: &AppConfig) -> Result<AppointmentListService, AppError> {
    AppointmentListService::new(state).map_err(to_app_error)
}

// ==============================================================================
// LIST VIEW HANDLERS
// ==============================================================================

/// Grouped appointment list, optionally narrowed to one day.
#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<AppointmentListView>, AppError> {
    let service = list_service(&state)?;
    let view = service
        .list_view(query.date.as_deref())
        .await
        .map_err(to_app_error)?;
    Ok(Json(view))
}

/// Days that can be picked in the date filter.
#[axum::debug_handler]
pub async fn get_appointment_dates(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Vec<AppointmentDay>>, AppError> {
    let service = list_service(&state)?;
    let dates = service.appointment_dates().await.map_err(to_app_error)?;
    Ok(Json(dates))
}

#[axum::debug_handler]
pub async fn update_completion(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<i64>,
    Json(request): Json<UpdateCompletionRequest>,
) -> Result<Json<UpdateCompletionResponse>, AppError> {
    let service = list_service(&state)?;
    let appointment = service
        .update_completion(appointment_id, request)
        .await
        .map_err(to_app_error)?;

    Ok(Json(UpdateCompletionResponse {
        success: true,
        appointment,
    }))
}

// ==============================================================================
// TIME SLOT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_selectable_slots(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotListResponse>, AppError> {
    let service = list_service(&state)?;
    let now = service.formatter().now();
    let slots = service
        .selectable_slots(&query.day, query.interval, now)
        .map_err(to_app_error)?;
    Ok(Json(slots))
}

#[axum::debug_handler]
pub async fn check_slot(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<SlotCheckQuery>,
) -> Result<Json<SlotCheckResponse>, AppError> {
    let service = list_service(&state)?;
    let now = service.formatter().now();
    let result = service
        .check_slot(&query.day, &query.time, now)
        .map_err(to_app_error)?;
    Ok(Json(result))
}
