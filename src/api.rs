use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::db::{BookingId, BookingRow, ClassId, ClassRow};
use crate::timezone;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct NewBooking {
    pub class_id: ClassId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ClassesQuery {
    pub tz: Option<String>,
    pub instructor: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ClassQuery {
    pub tz: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BookingsQuery {
    pub email: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ClassDetails {
    pub id: ClassId,
    pub name: String,
    /// RFC 3339, rendered in the requested timezone
    pub start_time: String,
    pub duration_minutes: i64,
    pub capacity: i64,
    pub remaining_seats: i64,
    pub instructor: String,
}

impl ClassDetails {
    pub fn from_row(row: ClassRow, tz: Tz) -> Self {
        Self {
            id: row.id,
            name: row.name,
            start_time: timezone::to_local_rfc3339(row.start_time, tz),
            duration_minutes: row.duration_minutes,
            capacity: row.capacity,
            remaining_seats: (row.capacity - row.booked).max(0),
            instructor: row.instructor,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BookingRecord {
    pub id: BookingId,
    pub class_id: ClassId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl BookingRecord {
    pub fn from_row(row: BookingRow) -> Self {
        Self {
            id: row.id,
            class_id: row.class_id,
            name: row.client_name,
            email: row.client_email,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
}
