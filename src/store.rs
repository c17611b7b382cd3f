use std::sync::{Arc, Mutex};

use anyhow::Context;
use chrono::{NaiveDate, NaiveTime, Utc};
use rusqlite::Connection;

use crate::db::{self, queries};
use crate::models::{Appointment, AppointmentStatus};

/// Clinic hours lower bound; upper bound is end of day.
const OPENING_TIME: (u32, u32) = (14, 0);

/// Two appointments conflict when their start times are less than this many
/// minutes apart on the same date for the same provider.
const OVERLAP_WINDOW_MINUTES: i64 = 60;

pub fn within_hours(time: NaiveTime) -> bool {
    let opening = NaiveTime::from_hms_opt(OPENING_TIME.0, OPENING_TIME.1, 0)
        .unwrap_or(NaiveTime::MIN);
    time >= opening
}

pub fn overlaps(a: NaiveTime, b: NaiveTime) -> bool {
    let delta = (a - b).num_minutes().abs();
    delta < OVERLAP_WINDOW_MINUTES
}

/// The details of a booking to be committed. The store assigns identity and
/// status on success.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub patient_name: String,
    pub service: String,
    pub phone: String,
}

#[derive(Debug)]
pub enum CommitResult {
    Booked(Appointment),
    Conflict,
}

/// The appointment ledger, one partition per provider. The connection lives
/// behind a mutex and every availability-check-then-append runs inside one
/// critical section, so two concurrent commits for overlapping slots cannot
/// both observe "available".
#[derive(Clone)]
pub struct ScheduleStore {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleStore {
    pub fn open(path: &str) -> anyhow::Result<Self> {
        let conn = db::init_db(path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Seed the roster partitions. Idempotent; existing partitions and their
    /// rows are left untouched.
    pub fn bootstrap(&self, roster: &[String]) -> anyhow::Result<()> {
        for name in roster {
            self.create_partition_if_missing(name)?;
        }
        Ok(())
    }

    /// Explicit lazy partition creation. Never called from the write path:
    /// `commit` treats unknown providers as unavailable instead of creating
    /// a partition for them.
    pub fn create_partition_if_missing(&self, provider: &str) -> anyhow::Result<()> {
        let conn = self.lock();
        let created = queries::insert_provider_if_missing(&conn, provider)?;
        if created {
            tracing::info!(provider, "created ledger partition");
        }
        Ok(())
    }

    pub fn list_providers(&self) -> anyhow::Result<Vec<String>> {
        let conn = self.lock();
        queries::list_providers(&conn)
    }

    pub fn provider_exists(&self, name: &str) -> anyhow::Result<bool> {
        let conn = self.lock();
        queries::provider_exists(&conn, name)
    }

    /// True iff no existing appointment for the provider on that date starts
    /// within the overlap window of the requested time. Unknown providers
    /// are never available.
    pub fn is_available(
        &self,
        provider: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> anyhow::Result<bool> {
        let conn = self.lock();
        slot_available(&conn, provider, date, time)
    }

    /// Atomically re-check availability and append the row. The whole
    /// operation holds the connection lock, so the check and the write are
    /// indivisible with respect to other commits.
    pub fn commit(&self, provider: &str, new: NewAppointment) -> anyhow::Result<CommitResult> {
        let conn = self.lock();

        if !slot_available(&conn, provider, new.date, new.time)? {
            return Ok(CommitResult::Conflict);
        }

        let appointment = Appointment {
            id: uuid::Uuid::new_v4().to_string(),
            provider: provider.to_string(),
            date: new.date,
            time: new.time,
            patient_name: new.patient_name,
            service: new.service,
            phone: new.phone,
            status: AppointmentStatus::Confirmed,
            created_at: Utc::now().naive_utc(),
        };

        queries::insert_appointment(&conn, &appointment)
            .context("failed to append booking row")?;

        tracing::info!(
            provider,
            date = %appointment.date,
            time = %appointment.time.format("%H:%M"),
            "booking committed"
        );
        Ok(CommitResult::Booked(appointment))
    }

    pub fn list_appointments(
        &self,
        provider: Option<&str>,
        date: Option<NaiveDate>,
    ) -> anyhow::Result<Vec<Appointment>> {
        let conn = self.lock();
        queries::list_appointments(&conn, provider, date)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

fn slot_available(
    conn: &Connection,
    provider: &str,
    date: NaiveDate,
    time: NaiveTime,
) -> anyhow::Result<bool> {
    if !queries::provider_exists(conn, provider)? {
        return Ok(false);
    }
    let booked = queries::booked_times_on(conn, provider, date)?;
    Ok(!booked.iter().any(|existing| overlaps(*existing, time)))
}
