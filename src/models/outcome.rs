use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Machine-readable rejection codes. All of them are recoverable by retry
/// from the caller's side; none is fatal to the process.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    AmbiguousDoctor,
    UnknownDoctor,
    BadDatetime,
    OutsideHours,
    Overlap,
    InvalidPhone,
    ExtractionFailure,
    StorageUnavailable,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::AmbiguousDoctor => "ambiguous-doctor",
            RejectReason::UnknownDoctor => "unknown-doctor",
            RejectReason::BadDatetime => "bad-datetime",
            RejectReason::OutsideHours => "outside-hours",
            RejectReason::Overlap => "overlap",
            RejectReason::InvalidPhone => "invalid-phone",
            RejectReason::ExtractionFailure => "extraction-failure",
            RejectReason::StorageUnavailable => "storage-unavailable",
        }
    }
}

/// Result of running a booking request through the validation chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Accepted { date: NaiveDate, time: NaiveTime },
    Rejected { reason: RejectReason, message: String },
}
