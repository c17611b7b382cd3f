use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{RejectReason, ValidationOutcome};
use crate::services::validation::{self, BookingRequest, BookingResult};
use crate::state::AppState;

// ── POST /check ──

#[derive(Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub doctor: String,
    #[serde(default)]
    pub date_text: String,
    #[serde(default)]
    pub time_text: String,
}

#[derive(Serialize)]
pub struct CheckResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Pre-commit validation: accept/reject, no write.
pub async fn check(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, AppError> {
    let outcome = validation::check_booking(
        &state,
        payload.doctor.trim(),
        payload.date_text.trim(),
        payload.time_text.trim(),
    )
    .map_err(|e| AppError::Storage(e.to_string()))?;

    let response = match outcome {
        ValidationOutcome::Accepted { date, time } => CheckResponse {
            ok: true,
            date: Some(date.format("%Y-%m-%d").to_string()),
            time: Some(time.format("%H:%M").to_string()),
            reason: None,
            message: None,
        },
        ValidationOutcome::Rejected { reason, message } => {
            tracing::info!(reason = reason.as_str(), "pre-commit check rejected");
            CheckResponse {
                ok: false,
                date: None,
                time: None,
                reason: Some(reason),
                message: Some(message),
            }
        }
    };
    Ok(Json(response))
}

// ── POST /book ──

#[derive(Deserialize)]
pub struct BookRequest {
    #[serde(default)]
    pub doctor: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub date_text: String,
    #[serde(default)]
    pub time_text: String,
}

#[derive(Serialize)]
pub struct BookResponse {
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
}

/// Validate the full six fields and commit the booking exactly once.
pub async fn book(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BookRequest>,
) -> Response {
    let request = BookingRequest {
        doctor: payload.doctor.trim().to_string(),
        name: payload.name.trim().to_string(),
        phone: payload.phone,
        service: payload.service.trim().to_string(),
        date_text: payload.date_text.trim().to_string(),
        time_text: payload.time_text.trim().to_string(),
    };

    match validation::book_appointment(&state, &request) {
        Ok(BookingResult::Booked(appointment)) => {
            let message = format!(
                "Booked with {} on {} at {}.",
                appointment.provider,
                appointment.date.format("%Y-%m-%d"),
                appointment.time.format("%H:%M"),
            );
            Json(BookResponse {
                ok: true,
                message,
                reason: None,
            })
            .into_response()
        }
        Ok(BookingResult::Rejected { reason, message }) => {
            tracing::info!(reason = reason.as_str(), "booking rejected");
            let status = match reason {
                RejectReason::Overlap => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            };
            (
                status,
                Json(BookResponse {
                    ok: false,
                    message,
                    reason: Some(reason),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "booking commit failed");
            AppError::Storage(e.to_string()).into_response()
        }
    }
}

// ── GET /api/bookings ──

#[derive(Deserialize)]
pub struct BookingsQuery {
    pub doctor: Option<String>,
    pub date: Option<String>,
}

#[derive(Serialize)]
pub struct BookingRow {
    pub doctor: String,
    pub date: String,
    pub time: String,
    pub patient_name: String,
    pub service: String,
    pub phone: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct BookingsResponse {
    pub rows: Vec<BookingRow>,
}

/// Read-only appointment listing, filterable by provider and date.
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<BookingsResponse>, AppError> {
    let doctor = query.doctor.as_deref().filter(|s| !s.trim().is_empty());

    let date = match query.date.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(raw) => Some(
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| AppError::BadRequest(format!("invalid date filter: {raw}")))?,
        ),
        None => None,
    };

    let appointments = state
        .store
        .list_appointments(doctor, date)
        .map_err(|e| AppError::Storage(e.to_string()))?;

    let rows = appointments
        .into_iter()
        .map(|a| BookingRow {
            doctor: a.provider,
            date: a.date.format("%Y-%m-%d").to_string(),
            time: a.time.format("%H:%M").to_string(),
            patient_name: a.patient_name,
            service: a.service,
            phone: a.phone,
            status: a.status.as_str().to_string(),
        })
        .collect();

    Ok(Json(BookingsResponse { rows }))
}
