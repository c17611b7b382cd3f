use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use crate::models::{Appointment, RejectReason, ValidationOutcome};
use crate::resolver::{self, Resolution};
use crate::services::dialogue::clean_phone;
use crate::services::temporal;
use crate::state::AppState;
use crate::store::{self, CommitResult, NewAppointment};

/// Full six-field request for the commit path.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub doctor: String,
    pub name: String,
    pub phone: String,
    pub service: String,
    pub date_text: String,
    pub time_text: String,
}

#[derive(Debug)]
pub enum BookingResult {
    Booked(Appointment),
    Rejected { reason: RejectReason, message: String },
}

struct Validated {
    doctor: String,
    date: NaiveDate,
    time: NaiveTime,
}

type Rejection = (RejectReason, String);

/// Ordered validation chain: doctor resolution, provider existence, temporal
/// normalization, business hours, availability. First failure wins.
fn validate(
    state: &Arc<AppState>,
    doctor_raw: &str,
    date_text: &str,
    time_text: &str,
) -> anyhow::Result<Result<Validated, Rejection>> {
    let roster = state.directory.list()?;

    let doctor = match resolver::resolve(doctor_raw, &roster) {
        Resolution::Resolved(canonical) => canonical,
        Resolution::Ambiguous([a, b]) => {
            return Ok(Err((
                RejectReason::AmbiguousDoctor,
                format!("Did you mean {a} or {b}?"),
            )));
        }
        // fall through with the raw name; the existence check reports it
        Resolution::Unresolved => doctor_raw.trim().to_string(),
    };

    if !state.directory.exists(&doctor)? {
        return Ok(Err((
            RejectReason::UnknownDoctor,
            format!("Doctor not found. Available: {}", roster.join(", ")),
        )));
    }

    let Some((date, time)) = temporal::normalize(
        state.parser.as_ref(),
        date_text,
        time_text,
        state.config.timezone,
    ) else {
        return Ok(Err((
            RejectReason::BadDatetime,
            "Sorry, I couldn't understand that date and time.".to_string(),
        )));
    };

    if !store::within_hours(time) {
        return Ok(Err((
            RejectReason::OutsideHours,
            "Our doctors are available 14:00 to 23:59. Please choose a time in that range."
                .to_string(),
        )));
    }

    if !state.store.is_available(&doctor, date, time)? {
        return Ok(Err((
            RejectReason::Overlap,
            "That time is already booked. Please choose another time or another date."
                .to_string(),
        )));
    }

    Ok(Ok(Validated { doctor, date, time }))
}

/// Pre-commit check: runs the whole chain but writes nothing.
pub fn check_booking(
    state: &Arc<AppState>,
    doctor_raw: &str,
    date_text: &str,
    time_text: &str,
) -> anyhow::Result<ValidationOutcome> {
    let outcome = match validate(state, doctor_raw, date_text, time_text)? {
        Ok(validated) => ValidationOutcome::Accepted {
            date: validated.date,
            time: validated.time,
        },
        Err((reason, message)) => ValidationOutcome::Rejected { reason, message },
    };
    Ok(outcome)
}

/// Validate and commit. The store re-checks availability inside its own
/// critical section, so a slot that two requests both saw as free is still
/// only ever written once; the loser is rejected with the overlap reason.
pub fn book_appointment(
    state: &Arc<AppState>,
    request: &BookingRequest,
) -> anyhow::Result<BookingResult> {
    let validated =
        match validate(state, &request.doctor, &request.date_text, &request.time_text)? {
            Ok(validated) => validated,
            Err((reason, message)) => return Ok(BookingResult::Rejected { reason, message }),
        };

    let new = NewAppointment {
        date: validated.date,
        time: validated.time,
        patient_name: request.name.trim().to_string(),
        service: request.service.trim().to_string(),
        phone: clean_phone(&request.phone),
    };

    match state.store.commit(&validated.doctor, new)? {
        CommitResult::Booked(appointment) => Ok(BookingResult::Booked(appointment)),
        CommitResult::Conflict => Ok(BookingResult::Rejected {
            reason: RejectReason::Overlap,
            message: "That time is already booked. Please choose another time or another date."
                .to_string(),
        }),
    }
}
