use chrono::Utc;
use chrono_tz::Tz;
use tracing::info;

use crate::api::{BookingRecord, ClassDetails, NewBooking};
use crate::db::{ClassId, Db};
use crate::error::{AppError, Result};
use crate::timezone;

// SQLite TEXT has no built-in length enforcement
const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 254;

/// The booking service. Holds no state of its own; everything lives in
/// the database, accessed per-request.
pub struct BookingApp {
    db: Db,
    default_tz: Tz,
}

impl BookingApp {
    pub fn new(db: Db, default_tz: Tz) -> Self {
        Self { db, default_tz }
    }

    /// Resolve an optional `tz` query parameter, falling back to the
    /// configured default when absent.
    pub fn resolve_timezone(&self, tz: Option<&str>) -> Result<Tz> {
        match tz {
            Some(name) => timezone::parse(name),
            None => Ok(self.default_tz),
        }
    }

    pub async fn upcoming_classes(
        &self,
        tz: Tz,
        instructor: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ClassDetails>> {
        let rows = self
            .db
            .upcoming_classes(Utc::now(), instructor, limit, offset)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| ClassDetails::from_row(row, tz))
            .collect())
    }

    pub async fn class_details(&self, id: ClassId, tz: Tz) -> Result<ClassDetails> {
        let row = self.db.class_by_id(id).await?;
        Ok(ClassDetails::from_row(row, tz))
    }

    pub async fn instructors(&self) -> Result<Vec<String>> {
        self.db.instructors().await
    }

    pub async fn handle_new_booking(&self, payload: NewBooking) -> Result<BookingRecord> {
        let name = validate_client_name(&payload.name)?;
        let email = validate_client_email(&payload.email)?;

        // resolve the class first so an unknown id is a 404, not a 409
        self.db.class_by_id(payload.class_id).await?;

        let row = self.db.create_booking(payload.class_id, &name, email).await?;
        info!("booking {} created for class {}", row.id, row.class_id);
        Ok(BookingRecord::from_row(row))
    }

    pub async fn bookings_for_email(&self, email: &str) -> Result<Vec<BookingRecord>> {
        let email = validate_client_email(email)?;
        let rows = self.db.bookings_by_email(email).await?;
        Ok(rows.into_iter().map(BookingRecord::from_row).collect())
    }

    pub async fn health(&self) -> bool {
        self.db.health_check().await
    }
}

fn validate_client_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "name is too long ({} chars, max {MAX_NAME_LEN})",
            name.len()
        )));
    }
    Ok(name.to_string())
}

fn validate_client_email(email: &str) -> Result<&str> {
    if !is_valid_email(email) {
        return Err(AppError::Validation(format!(
            "invalid email address: {email}"
        )));
    }
    Ok(email)
}

/// Structural check only; full RFC 5322 parsing is out of scope here.
fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > MAX_EMAIL_LEN || email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
