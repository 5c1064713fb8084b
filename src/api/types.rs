//! JSON bodies of the HTTP surface. Times travel as `"HH:MM"` strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::model::*;

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub ts: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FreeNowQuery {
    pub building_id: Option<BuildingId>,
    pub min_capacity: Option<u32>,
    pub date: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FreeNowOut {
    pub timestamp: String,
    pub count: usize,
    pub free_rooms: Vec<Room>,
}

#[derive(Debug, Serialize)]
pub struct RawTimetableRow {
    pub period: u8,
    pub weekday: u8,
    pub raw_text: String,
}

impl From<TimetableEntry> for RawTimetableRow {
    fn from(e: TimetableEntry) -> Self {
        Self {
            period: e.period,
            weekday: e.weekday,
            raw_text: e.raw_text,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BlockOut {
    pub start: String,
    pub end: String,
    pub status: BlockStatus,
}

#[derive(Debug, Serialize)]
pub struct ClassOut {
    pub start: String,
    pub end: String,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct ReservationOut {
    pub start: String,
    pub end: String,
    pub user: String,
}

#[derive(Debug, Serialize)]
pub struct TimelineOut {
    pub room_id: RoomId,
    pub date: NaiveDate,
    pub blocks: Vec<BlockOut>,
    pub classes: Vec<ClassOut>,
    pub reservations: Vec<ReservationOut>,
}

impl From<Timeline> for TimelineOut {
    fn from(t: Timeline) -> Self {
        Self {
            room_id: t.room_id,
            date: t.date,
            blocks: t
                .blocks
                .iter()
                .map(|b| BlockOut {
                    start: format_hhmm(b.span.start),
                    end: format_hhmm(b.span.end),
                    status: b.status,
                })
                .collect(),
            classes: t
                .classes
                .into_iter()
                .map(|c| ClassOut {
                    start: format_hhmm(c.span.start),
                    end: format_hhmm(c.span.end),
                    label: c.label,
                })
                .collect(),
            reservations: t
                .reservations
                .into_iter()
                .map(|r| ReservationOut {
                    start: format_hhmm(r.span.start),
                    end: format_hhmm(r.span.end),
                    user: r.user,
                })
                .collect(),
        }
    }
}

/// `POST /rooms/reserve` body. A missing `user` reaches the engine as empty.
#[derive(Debug, Deserialize)]
pub struct ReserveIn {
    #[serde(alias = "room_id")]
    pub room: RoomId,
    pub date: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub user: String,
}

#[derive(Debug, Serialize)]
pub struct ReservedOut {
    pub message: &'static str,
    pub id: Ulid,
    pub room_id: RoomId,
    pub date: NaiveDate,
    pub start: String,
    pub end: String,
    pub user: String,
    pub timeline: TimelineOut,
}

impl From<Admission> for ReservedOut {
    fn from(a: Admission) -> Self {
        let r = a.reservation;
        Self {
            message: "reserved",
            id: r.id,
            room_id: r.room_id,
            date: r.date,
            start: format_hhmm(r.span.start),
            end: format_hhmm(r.span.end),
            user: r.user,
            timeline: a.timeline.into(),
        }
    }
}
