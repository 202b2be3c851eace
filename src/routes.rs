use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tracing::debug;

use crate::api::{
    BookingRecord, BookingsQuery, ClassDetails, ClassQuery, ClassesQuery, HealthStatus, NewBooking,
};
use crate::booker::BookingApp;
use crate::db::ClassId;
use crate::error::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 100;

#[debug_handler]
async fn handle_classes(
    State(app): State<Arc<BookingApp>>,
    AppQuery(query): AppQuery<ClassesQuery>,
) -> Result<Json<Vec<ClassDetails>>, AppError> {
    let tz = app.resolve_timezone(query.tz.as_deref())?;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);
    let classes = app
        .upcoming_classes(tz, query.instructor.as_deref(), limit, offset)
        .await?;
    debug!("listing {} upcoming classes", classes.len());
    Ok(Json(classes))
}

async fn handle_class_by_id(
    State(app): State<Arc<BookingApp>>,
    AppPath(id): AppPath<ClassId>,
    AppQuery(query): AppQuery<ClassQuery>,
) -> Result<Json<ClassDetails>, AppError> {
    let tz = app.resolve_timezone(query.tz.as_deref())?;
    Ok(Json(app.class_details(id, tz).await?))
}

async fn handle_instructors(
    State(app): State<Arc<BookingApp>>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(app.instructors().await?))
}

#[debug_handler]
async fn handle_new_booking(
    State(app): State<Arc<BookingApp>>,
    AppJson(payload): AppJson<NewBooking>,
) -> Result<(StatusCode, Json<BookingRecord>), AppError> {
    let booking = app.handle_new_booking(payload).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn handle_bookings(
    State(app): State<Arc<BookingApp>>,
    AppQuery(query): AppQuery<BookingsQuery>,
) -> Result<Json<Vec<BookingRecord>>, AppError> {
    Ok(Json(app.bookings_for_email(&query.email).await?))
}

async fn handle_health(State(app): State<Arc<BookingApp>>) -> Json<HealthStatus> {
    let db_ok = app.health().await;
    Json(HealthStatus {
        status: if db_ok { "ok" } else { "degraded" },
        database: if db_ok { "healthy" } else { "unhealthy" },
    })
}

pub fn app_router(app: Arc<BookingApp>) -> Router {
    Router::new()
        .route("/classes", get(handle_classes))
        .route("/classes/instructors", get(handle_instructors))
        .route("/classes/:id", get(handle_class_by_id))
        .route("/bookings", post(handle_new_booking).get(handle_bookings))
        .route("/health", get(handle_health))
        .with_state(app)
}
