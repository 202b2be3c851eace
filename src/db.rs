use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::info;

use crate::error::{AppError, Result};

pub type ClassId = i64;
pub type BookingId = i64;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("migrations");

/// One scheduled class together with its current booking count.
#[derive(FromRow, Clone, Debug)]
pub struct ClassRow {
    pub id: ClassId,
    pub name: String,
    pub instructor: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub capacity: i64,
    pub booked: i64,
}

#[derive(FromRow, Clone, Debug)]
pub struct BookingRow {
    pub id: BookingId,
    pub class_id: ClassId,
    pub client_name: String,
    pub client_email: String,
    pub created_at: DateTime<Utc>,
}

const CLASS_COLUMNS: &str = "c.id, c.name, c.instructor, c.start_time, c.duration_minutes, \
     c.capacity, (SELECT COUNT(*) FROM bookings b WHERE b.class_id = c.id) AS booked";

#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        if let Some(db_path) = database_url.strip_prefix("sqlite://") {
            if !db_path.is_empty() && !Path::new(db_path).exists() {
                info!("creating database file: {db_path}");
                std::fs::File::create(db_path)?;
            }
        }
        Self::connect_with(database_url, 5).await
    }

    /// In-memory database for tests. A single pooled connection keeps
    /// the `:memory:` database alive between queries.
    pub async fn connect_in_memory() -> anyhow::Result<Self> {
        Self::connect_with("sqlite::memory:", 1).await
    }

    async fn connect_with(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        info!("opening database: {database_url}");
        let opts = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal) // use WAL for better concurrency
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;
        MIGRATOR.run(&pool).await?;
        Ok(Self { pool })
    }

    /// Classes starting at or after `now`, ascending by start time,
    /// optionally restricted to one instructor.
    pub async fn upcoming_classes(
        &self,
        now: DateTime<Utc>,
        instructor: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ClassRow>> {
        let mut sql = format!("SELECT {CLASS_COLUMNS} FROM classes c WHERE c.start_time >= ?");
        if instructor.is_some() {
            sql.push_str(" AND c.instructor = ?");
        }
        sql.push_str(" ORDER BY c.start_time ASC LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, ClassRow>(&sql).bind(now);
        if let Some(instructor) = instructor {
            query = query.bind(instructor);
        }
        let rows = query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn class_by_id(&self, id: ClassId) -> Result<ClassRow> {
        sqlx::query_as::<_, ClassRow>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes c WHERE c.id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound(id))
    }

    pub async fn count_bookings(&self, class_id: ClassId) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE class_id = ?")
            .bind(class_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a booking iff the class still has a free seat. The guard
    /// rides inside the INSERT itself, so the capacity check and the
    /// new row land in one atomic write statement and two concurrent
    /// bookings cannot both take the last seat.
    pub async fn create_booking(
        &self,
        class_id: ClassId,
        name: &str,
        email: &str,
    ) -> Result<BookingRow> {
        let created_at = Utc::now();
        let inserted = sqlx::query(
            "INSERT INTO bookings (class_id, client_name, client_email, created_at) \
             SELECT ?1, ?2, ?3, ?4 \
             WHERE (SELECT COUNT(*) FROM bookings WHERE class_id = ?1) \
                 < (SELECT capacity FROM classes WHERE id = ?1)",
        )
        .bind(class_id)
        .bind(name)
        .bind(email)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(AppError::CapacityExceeded(class_id));
        }

        Ok(BookingRow {
            id: inserted.last_insert_rowid(),
            class_id,
            client_name: name.to_string(),
            client_email: email.to_string(),
            created_at,
        })
    }

    /// Bookings for an email address. The column is COLLATE NOCASE, so
    /// the match is case-insensitive.
    pub async fn bookings_by_email(&self, email: &str) -> Result<Vec<BookingRow>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT id, class_id, client_name, client_email, created_at \
             FROM bookings WHERE client_email = ? ORDER BY created_at DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn instructors(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT instructor FROM classes ORDER BY instructor ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    pub async fn insert_class(
        &self,
        name: &str,
        instructor: &str,
        start_time: DateTime<Utc>,
        duration_minutes: i64,
        capacity: i64,
    ) -> Result<ClassId> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO classes (name, instructor, start_time, duration_minutes, capacity, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(instructor)
        .bind(start_time)
        .bind(duration_minutes)
        .bind(capacity)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Insert a handful of sample classes iff the table is empty, so a
    /// fresh database has something to list.
    pub async fn seed_demo_classes(&self) -> Result<()> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM classes")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(());
        }

        let now = Utc::now();
        let classes = [
            ("Yoga Basics", "Priya Sharma", now + Duration::days(1), 60, 20),
            ("HIIT Blast", "Rahul Mehta", now + Duration::days(2), 45, 15),
            ("Zumba Fun", "Anjali Rao", now + Duration::days(3), 60, 25),
        ];
        for (name, instructor, start_time, duration_minutes, capacity) in classes {
            self.insert_class(name, instructor, start_time, duration_minutes, capacity)
                .await?;
        }
        info!("seeded {} demo classes", classes.len());
        Ok(())
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT COUNT(*) FROM classes")
            .execute(&self.pool)
            .await
            .is_ok()
    }
}
