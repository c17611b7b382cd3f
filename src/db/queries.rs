use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection, Row};

use crate::models::{Appointment, AppointmentStatus};

// ── Providers ──

pub fn insert_provider_if_missing(conn: &Connection, name: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "INSERT INTO providers (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
        params![name],
    )?;
    Ok(count > 0)
}

pub fn list_providers(conn: &Connection) -> anyhow::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM providers ORDER BY id ASC")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut providers = vec![];
    for row in rows {
        providers.push(row?);
    }
    Ok(providers)
}

pub fn provider_exists(conn: &Connection, name: &str) -> anyhow::Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM providers WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(exists)
}

// ── Appointments ──

pub fn insert_appointment(conn: &Connection, appointment: &Appointment) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO appointments (id, provider, date, time, patient_name, service, phone, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            appointment.id,
            appointment.provider,
            appointment.date.format("%Y-%m-%d").to_string(),
            appointment.time.format("%H:%M").to_string(),
            appointment.patient_name,
            appointment.service,
            appointment.phone,
            appointment.status.as_str(),
            appointment.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

/// Start times already booked for one provider on one date.
pub fn booked_times_on(
    conn: &Connection,
    provider: &str,
    date: NaiveDate,
) -> anyhow::Result<Vec<NaiveTime>> {
    let mut stmt = conn.prepare(
        "SELECT time FROM appointments WHERE provider = ?1 AND date = ?2 ORDER BY time ASC",
    )?;
    let date_str = date.format("%Y-%m-%d").to_string();
    let rows = stmt.query_map(params![provider, date_str], |row| {
        row.get::<_, String>(0)
    })?;

    let mut times = vec![];
    for row in rows {
        let raw = row?;
        if let Ok(t) = NaiveTime::parse_from_str(&raw, "%H:%M") {
            times.push(t);
        }
    }
    Ok(times)
}

pub fn list_appointments(
    conn: &Connection,
    provider: Option<&str>,
    date: Option<NaiveDate>,
) -> anyhow::Result<Vec<Appointment>> {
    let mut sql = String::from(
        "SELECT id, provider, date, time, patient_name, service, phone, status, created_at
         FROM appointments",
    );
    let mut clauses = vec![];
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![];

    if let Some(provider) = provider {
        clauses.push(format!("provider = ?{}", values.len() + 1));
        values.push(Box::new(provider.to_string()));
    }
    if let Some(date) = date {
        clauses.push(format!("date = ?{}", values.len() + 1));
        values.push(Box::new(date.format("%Y-%m-%d").to_string()));
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY date ASC, time ASC");

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        values.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| {
        Ok(parse_appointment_row(row))
    })?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

fn parse_appointment_row(row: &Row<'_>) -> anyhow::Result<Appointment> {
    let date_str: String = row.get(2)?;
    let time_str: String = row.get(3)?;
    let created_at_str: String = row.get(8)?;

    Ok(Appointment {
        id: row.get(0)?,
        provider: row.get(1)?,
        date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")?,
        time: NaiveTime::parse_from_str(&time_str, "%H:%M")?,
        patient_name: row.get(4)?,
        service: row.get(5)?,
        phone: row.get(6)?,
        status: AppointmentStatus::Confirmed,
        created_at: NaiveDateTime::parse_from_str(&created_at_str, "%Y-%m-%d %H:%M:%S")?,
    })
}
