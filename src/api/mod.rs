//! axum router and handlers for the reservation service.
//!
//! `build_router` returns the bare router; `main` attaches the CORS and trace
//! layers so tests can drive the router directly.

mod error;
mod types;

pub use error::ApiError;
pub use types::*;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderValue, Method},
    routing::{get, post},
};
use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use serde_json::{Value, json};
use tower_http::cors::{AllowHeaders, CorsLayer};

use crate::engine::Engine;
use crate::model::*;

pub fn build_router(engine: Arc<Engine>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/buildings", get(buildings))
        .route("/rooms", get(rooms))
        .route("/rooms/free-now", get(free_now))
        .route("/rooms/reserve", post(reserve))
        .route("/rooms/:room_id/raw-timetable", get(raw_timetable))
        .route("/rooms/:room_id/timeline", get(timeline))
        .with_state(engine)
}

/// CORS restricted to the configured browser origins.
pub fn cors(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn root() -> Json<Value> {
    Json(json!({ "hello": "world" }))
}

async fn healthz() -> Json<HealthOut> {
    Json(HealthOut {
        ok: true,
        ts: Local::now().to_rfc3339(),
    })
}

async fn buildings(State(engine): State<Arc<Engine>>) -> Result<Json<Vec<Building>>, ApiError> {
    Ok(Json(engine.list_buildings().await?))
}

async fn rooms(
    State(engine): State<Arc<Engine>>,
    filter: Result<Query<RoomFilter>, QueryRejection>,
) -> Result<Json<Vec<Room>>, ApiError> {
    let Query(filter) = filter.map_err(bad_query)?;
    Ok(Json(engine.list_rooms(&filter).await?))
}

async fn raw_timetable(
    State(engine): State<Arc<Engine>>,
    room_id: Result<Path<RoomId>, PathRejection>,
) -> Result<Json<Vec<RawTimetableRow>>, ApiError> {
    let Path(room_id) = room_id.map_err(bad_path)?;
    let entries = engine.raw_timetable(room_id).await?;
    Ok(Json(entries.into_iter().map(RawTimetableRow::from).collect()))
}

async fn free_now(
    State(engine): State<Arc<Engine>>,
    q: Result<Query<FreeNowQuery>, QueryRejection>,
) -> Result<Json<FreeNowOut>, ApiError> {
    let Query(q) = q.map_err(bad_query)?;
    let now = Local::now().naive_local();
    let date = match q.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => now.date(),
    };
    let time = match q.time.as_deref() {
        Some(raw) => parse_time(raw)?,
        None => (now.hour() * 60 + now.minute()) as Minute,
    };
    let filter = RoomFilter {
        building_id: q.building_id,
        floor: None,
        min_capacity: q.min_capacity,
    };

    let free = engine.free_rooms_at(date, time, &filter).await?;
    let timestamp = if q.date.is_none() && q.time.is_none() {
        now
    } else {
        instant(date, time)
    };
    Ok(Json(FreeNowOut {
        timestamp: timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
        count: free.rooms.len(),
        free_rooms: free.rooms,
    }))
}

async fn timeline(
    State(engine): State<Arc<Engine>>,
    room_id: Result<Path<RoomId>, PathRejection>,
    q: Result<Query<DateQuery>, QueryRejection>,
) -> Result<Json<TimelineOut>, ApiError> {
    let Path(room_id) = room_id.map_err(bad_path)?;
    let Query(q) = q.map_err(bad_query)?;
    let date = match q.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => Local::now().date_naive(),
    };
    Ok(Json(engine.compute_timeline(room_id, date).await?.into()))
}

async fn reserve(
    State(engine): State<Arc<Engine>>,
    body: Result<Json<ReserveIn>, JsonRejection>,
) -> Result<Json<ReservedOut>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let req = ReservationRequest {
        room_id: body.room,
        date: parse_date(&body.date)?,
        start: parse_time(&body.start)?,
        end: parse_time(&body.end)?,
        user: body.user,
    };
    Ok(Json(engine.submit_reservation(req).await?.into()))
}

fn bad_path(e: PathRejection) -> ApiError {
    ApiError::BadRequest(e.body_text())
}

fn bad_query(e: QueryRejection) -> ApiError {
    ApiError::BadRequest(e.body_text())
}

fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid date format: {raw}")))
}

fn parse_time(raw: &str) -> Result<Minute, ApiError> {
    parse_hhmm(raw).ok_or_else(|| ApiError::BadRequest(format!("Invalid time format: {raw}")))
}

fn instant(date: NaiveDate, time: Minute) -> NaiveDateTime {
    date.and_hms_opt((time / 60) as u32, (time % 60) as u32, 0)
        .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_and_time_parsing() {
        assert_eq!(
            parse_date("2024-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert!(matches!(parse_date("03/01/2024"), Err(ApiError::BadRequest(_))));
        assert_eq!(parse_time("13:30").unwrap(), 13 * 60 + 30);
        assert!(matches!(parse_time("1pm"), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn instant_formats_minutes() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            instant(date, 9 * 60 + 5).format("%Y-%m-%dT%H:%M:%S").to_string(),
            "2024-03-01T09:05:00"
        );
    }
}
