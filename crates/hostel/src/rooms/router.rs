use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::availability::{AvailabilityFilter, PriceRange};
use super::domain::{BedLetter, RoomNumber, StudentId, Wing};
use super::recommendation::RoomPreferences;
use super::repository::{AllocationNotifier, RoomRepository};
use super::service::{ErrorKind, RoomService, RoomServiceError};

/// Router builder exposing the room inventory and allocation endpoints.
pub fn room_router<R, N>(service: Arc<RoomService<R, N>>) -> Router
where
    R: RoomRepository + 'static,
    N: AllocationNotifier + 'static,
{
    Router::new()
        .route("/api/v1/rooms/initialize", post(initialize_handler::<R, N>))
        .route("/api/v1/rooms/available", get(available_handler::<R, N>))
        .route(
            "/api/v1/rooms/recommendations",
            post(recommend_handler::<R, N>),
        )
        .route("/api/v1/rooms/statistics", get(statistics_handler::<R, N>))
        .route("/api/v1/rooms/:room_number", get(room_handler::<R, N>))
        .route(
            "/api/v1/rooms/:room_number/beds/:bed_letter/assign",
            post(assign_handler::<R, N>),
        )
        .route(
            "/api/v1/rooms/:room_number/beds/:bed_letter/release",
            post(release_handler::<R, N>),
        )
        .route(
            "/api/v1/rooms/:room_number/maintenance",
            post(schedule_maintenance_handler::<R, N>)
                .delete(complete_maintenance_handler::<R, N>),
        )
        .route(
            "/api/v1/rooms/:room_number/block",
            post(block_handler::<R, N>).delete(unblock_handler::<R, N>),
        )
        .route(
            "/api/v1/students/:student_id/allocation",
            get(allocation_handler::<R, N>),
        )
        .with_state(service)
}

type SharedService<R, N> = State<Arc<RoomService<R, N>>>;

#[derive(Debug, Deserialize)]
pub(crate) struct StudentRequest {
    pub(crate) student_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MaintenanceRequest {
    pub(crate) scheduled_for: DateTime<Utc>,
    #[serde(default)]
    pub(crate) reason: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BlockRequest {
    #[serde(default)]
    pub(crate) reason: String,
}

/// Flat query-string form of [`AvailabilityFilter`].
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AvailabilityParams {
    pub(crate) wing: Option<String>,
    pub(crate) floor: Option<u16>,
    pub(crate) has_ac: Option<bool>,
    pub(crate) min_rent: Option<u32>,
    pub(crate) max_rent: Option<u32>,
}

impl AvailabilityParams {
    fn into_filter(self) -> Result<AvailabilityFilter, RoomServiceError> {
        let wing = self
            .wing
            .as_deref()
            .map(str::parse::<Wing>)
            .transpose()?;
        let price_range = (self.min_rent.is_some() || self.max_rent.is_some()).then_some(
            PriceRange {
                min: self.min_rent,
                max: self.max_rent,
            },
        );

        Ok(AvailabilityFilter {
            wing,
            floor: self.floor,
            has_ac: self.has_ac,
            price_range,
        })
    }
}

pub(crate) fn error_response(error: RoomServiceError) -> Response {
    let status = match error.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

/// Unwraps a JSON body, turning extractor rejections into `InvalidArgument`.
fn json_body<T>(payload: Result<axum::Json<T>, JsonRejection>) -> Result<T, RoomServiceError> {
    payload
        .map(|axum::Json(value)| value)
        .map_err(|rejection| RoomServiceError::InvalidArgument(rejection.body_text()))
}

fn bed_target(
    student_id: &str,
    room_number: &str,
    bed_letter: &str,
) -> Result<(StudentId, RoomNumber, BedLetter), RoomServiceError> {
    Ok((
        StudentId::parse(student_id)?,
        room_number.parse::<RoomNumber>()?,
        bed_letter.parse::<BedLetter>()?,
    ))
}

pub(crate) async fn initialize_handler<R, N>(State(service): SharedService<R, N>) -> Response
where
    R: RoomRepository + 'static,
    N: AllocationNotifier + 'static,
{
    match service.initialize() {
        Ok(outcome) if outcome.already_initialized => {
            (StatusCode::OK, axum::Json(outcome)).into_response()
        }
        Ok(outcome) => (StatusCode::CREATED, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn available_handler<R, N>(
    State(service): SharedService<R, N>,
    Query(params): Query<AvailabilityParams>,
) -> Response
where
    R: RoomRepository + 'static,
    N: AllocationNotifier + 'static,
{
    match params
        .into_filter()
        .and_then(|filter| service.available(&filter))
    {
        Ok(rooms) => (StatusCode::OK, axum::Json(rooms)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn recommend_handler<R, N>(
    State(service): SharedService<R, N>,
    payload: Result<axum::Json<RoomPreferences>, JsonRejection>,
) -> Response
where
    R: RoomRepository + 'static,
    N: AllocationNotifier + 'static,
{
    match json_body(payload).and_then(|preferences| service.recommend(&preferences)) {
        Ok(rooms) => (StatusCode::OK, axum::Json(rooms)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn statistics_handler<R, N>(State(service): SharedService<R, N>) -> Response
where
    R: RoomRepository + 'static,
    N: AllocationNotifier + 'static,
{
    match service.statistics() {
        Ok(statistics) => (StatusCode::OK, axum::Json(statistics)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn room_handler<R, N>(
    State(service): SharedService<R, N>,
    Path(room_number): Path<String>,
) -> Response
where
    R: RoomRepository + 'static,
    N: AllocationNotifier + 'static,
{
    let result = room_number
        .parse::<RoomNumber>()
        .map_err(RoomServiceError::from)
        .and_then(|number| service.room(number));
    match result {
        Ok(room) => (StatusCode::OK, axum::Json(room)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn assign_handler<R, N>(
    State(service): SharedService<R, N>,
    Path((room_number, bed_letter)): Path<(String, String)>,
    payload: Result<axum::Json<StudentRequest>, JsonRejection>,
) -> Response
where
    R: RoomRepository + 'static,
    N: AllocationNotifier + 'static,
{
    let result = json_body(payload)
        .and_then(|request| bed_target(&request.student_id, &room_number, &bed_letter))
        .and_then(|(student, room, bed)| service.assign(&student, room, bed));
    match result {
        Ok(confirmation) => (StatusCode::OK, axum::Json(confirmation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn release_handler<R, N>(
    State(service): SharedService<R, N>,
    Path((room_number, bed_letter)): Path<(String, String)>,
    payload: Result<axum::Json<StudentRequest>, JsonRejection>,
) -> Response
where
    R: RoomRepository + 'static,
    N: AllocationNotifier + 'static,
{
    let result = json_body(payload)
        .and_then(|request| bed_target(&request.student_id, &room_number, &bed_letter))
        .and_then(|(student, room, bed)| service.release(&student, room, bed));
    match result {
        Ok(confirmation) => (StatusCode::OK, axum::Json(confirmation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn schedule_maintenance_handler<R, N>(
    State(service): SharedService<R, N>,
    Path(room_number): Path<String>,
    payload: Result<axum::Json<MaintenanceRequest>, JsonRejection>,
) -> Response
where
    R: RoomRepository + 'static,
    N: AllocationNotifier + 'static,
{
    let result = json_body(payload).and_then(|request| {
        let number = room_number.parse::<RoomNumber>()?;
        service.schedule_maintenance(number, request.scheduled_for, &request.reason)
    });
    match result {
        Ok(room) => (StatusCode::OK, axum::Json(room)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn complete_maintenance_handler<R, N>(
    State(service): SharedService<R, N>,
    Path(room_number): Path<String>,
) -> Response
where
    R: RoomRepository + 'static,
    N: AllocationNotifier + 'static,
{
    let result = room_number
        .parse::<RoomNumber>()
        .map_err(RoomServiceError::from)
        .and_then(|number| service.complete_maintenance(number));
    match result {
        Ok(room) => (StatusCode::OK, axum::Json(room)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn block_handler<R, N>(
    State(service): SharedService<R, N>,
    Path(room_number): Path<String>,
    payload: Result<axum::Json<BlockRequest>, JsonRejection>,
) -> Response
where
    R: RoomRepository + 'static,
    N: AllocationNotifier + 'static,
{
    let result = json_body(payload).and_then(|request| {
        let number = room_number.parse::<RoomNumber>()?;
        service.block(number, &request.reason)
    });
    match result {
        Ok(room) => (StatusCode::OK, axum::Json(room)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn unblock_handler<R, N>(
    State(service): SharedService<R, N>,
    Path(room_number): Path<String>,
) -> Response
where
    R: RoomRepository + 'static,
    N: AllocationNotifier + 'static,
{
    let result = room_number
        .parse::<RoomNumber>()
        .map_err(RoomServiceError::from)
        .and_then(|number| service.unblock(number));
    match result {
        Ok(room) => (StatusCode::OK, axum::Json(room)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn allocation_handler<R, N>(
    State(service): SharedService<R, N>,
    Path(student_id): Path<String>,
) -> Response
where
    R: RoomRepository + 'static,
    N: AllocationNotifier + 'static,
{
    let result = StudentId::parse(&student_id)
        .map_err(RoomServiceError::from)
        .and_then(|student| service.allocation_for(&student));
    match result {
        Ok(allocation) => (StatusCode::OK, axum::Json(allocation)).into_response(),
        Err(error) => error_response(error),
    }
}
