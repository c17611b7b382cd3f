pub mod appointment;
pub mod dialogue;
pub mod outcome;

pub use appointment::{Appointment, AppointmentStatus};
pub use dialogue::DialogueState;
pub use outcome::{RejectReason, ValidationOutcome};
