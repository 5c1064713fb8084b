use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Minutes since midnight.
pub type Minute = u16;

pub type RoomId = i64;
pub type BuildingId = i64;

pub const MINUTES_PER_DAY: Minute = 24 * 60;

/// Rooms are bookable and shown on the timeline between 09:00 and 18:00.
pub const OPERATING_WINDOW: Span = Span {
    start: 9 * 60,
    end: 18 * 60,
};

/// Parse `"HH:MM"` (or `"HH:MM:SS"`, seconds ignored) into minutes since midnight.
pub fn parse_hhmm(s: &str) -> Option<Minute> {
    let s = s.trim();
    let hhmm = s.get(..5).unwrap_or(s);
    let (hh, mm) = hhmm.split_once(':')?;
    if hh.is_empty() || mm.len() != 2 {
        return None;
    }
    let hh: Minute = hh.parse().ok()?;
    let mm: Minute = mm.parse().ok()?;
    if hh > 23 || mm > 59 {
        return None;
    }
    Some(hh * 60 + mm)
}

pub fn format_hhmm(m: Minute) -> String {
    format!("{:02}:{:02}", m / 60, m % 60)
}

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: Minute,
    pub end: Minute,
}

impl Span {
    pub fn new(start: Minute, end: Minute) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn try_new(start: Minute, end: Minute) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: Minute) -> bool {
        self.start <= t && t < self.end
    }

    /// The part of `self` inside `window`, if any.
    pub fn clip(&self, window: &Span) -> Option<Span> {
        Span::try_new(self.start.max(window.start), self.end.min(window.end))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_hhmm(self.start), format_hhmm(self.end))
    }
}

/// Identifies one room on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayKey {
    pub room_id: RoomId,
    pub date: NaiveDate,
}

impl DayKey {
    pub fn new(room_id: RoomId, date: NaiveDate) -> Self {
        Self { room_id, date }
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room {} on {}", self.room_id, self.date)
    }
}

// ── Directory ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub building_id: BuildingId,
    pub name: String,
    pub floor: Option<i32>,
    pub capacity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RoomFilter {
    pub building_id: Option<BuildingId>,
    pub floor: Option<i32>,
    pub min_capacity: Option<u32>,
}

impl RoomFilter {
    pub fn matches(&self, room: &Room) -> bool {
        self.building_id.is_none_or(|b| room.building_id == b)
            && self.floor.is_none_or(|f| room.floor == Some(f))
            && self.min_capacity.is_none_or(|c| room.capacity >= c)
    }
}

/// One cell of a room's weekly timetable grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub room_id: RoomId,
    /// 1 = Monday … 7 = Sunday.
    pub weekday: u8,
    pub period: u8,
    pub raw_text: String,
}

// ── Occupancy ────────────────────────────────────────────────────

/// A scheduled class. Immutable, derived from the timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassBlock {
    pub span: Span,
    pub label: String,
}

/// A user reservation. Admitted once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationBlock {
    pub id: Ulid,
    pub room_id: RoomId,
    pub date: NaiveDate,
    pub span: Span,
    pub user: String,
}

impl ReservationBlock {
    pub fn key(&self) -> DayKey {
        DayKey::new(self.room_id, self.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockStatus {
    Free,
    Occupied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineBlock {
    pub span: Span,
    pub status: BlockStatus,
}

impl TimelineBlock {
    pub fn free(span: Span) -> Self {
        Self { span, status: BlockStatus::Free }
    }

    pub fn occupied(span: Span) -> Self {
        Self { span, status: BlockStatus::Occupied }
    }
}

/// A reservation request as submitted, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    pub room_id: RoomId,
    pub date: NaiveDate,
    pub start: Minute,
    pub end: Minute,
    pub user: String,
}

/// The WAL record format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    ReservationAdmitted {
        id: Ulid,
        room_id: RoomId,
        date: NaiveDate,
        span: Span,
        user: String,
    },
}

impl Event {
    pub fn admitted(block: &ReservationBlock) -> Self {
        Event::ReservationAdmitted {
            id: block.id,
            room_id: block.room_id,
            date: block.date,
            span: block.span,
            user: block.user.clone(),
        }
    }
}

// ── Query result types ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    pub room_id: RoomId,
    pub date: NaiveDate,
    pub blocks: Vec<TimelineBlock>,
    pub classes: Vec<ClassBlock>,
    pub reservations: Vec<ReservationBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub reservation: ReservationBlock,
    pub timeline: Timeline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeRooms {
    pub date: NaiveDate,
    pub time: Minute,
    pub rooms: Vec<Room>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_format_hhmm() {
        assert_eq!(parse_hhmm("09:00"), Some(540));
        assert_eq!(parse_hhmm("18:00"), Some(1080));
        assert_eq!(parse_hhmm("13:45:30"), Some(13 * 60 + 45));
        assert_eq!(parse_hhmm(" 7:05 "), Some(7 * 60 + 5));
        assert_eq!(format_hhmm(540), "09:00");
        assert_eq!(format_hhmm(13 * 60 + 5), "13:05");
    }

    #[test]
    fn parse_hhmm_rejects_garbage() {
        assert_eq!(parse_hhmm(""), None);
        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm("12:60"), None);
        assert_eq!(parse_hhmm("noon"), None);
        assert_eq!(parse_hhmm("12:5"), None);
        assert_eq!(parse_hhmm(":30"), None);
    }

    #[test]
    fn span_overlap_is_half_open() {
        let a = Span::new(600, 660);
        let b = Span::new(630, 720);
        let c = Span::new(660, 720);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
        assert!(a.contains_instant(600));
        assert!(!a.contains_instant(660));
    }

    #[test]
    fn span_try_new_rejects_empty_and_inverted() {
        assert!(Span::try_new(600, 600).is_none());
        assert!(Span::try_new(660, 600).is_none());
        assert_eq!(Span::try_new(600, 601), Some(Span::new(600, 601)));
    }

    #[test]
    fn span_clip_to_window() {
        let early = Span::new(8 * 60, 10 * 60);
        assert_eq!(early.clip(&OPERATING_WINDOW), Some(Span::new(540, 600)));
        let outside = Span::new(19 * 60, 20 * 60);
        assert_eq!(outside.clip(&OPERATING_WINDOW), None);
        let touching = Span::new(8 * 60, 9 * 60);
        assert_eq!(touching.clip(&OPERATING_WINDOW), None);
    }

    #[test]
    fn span_display() {
        assert_eq!(Span::new(600, 690).to_string(), "10:00-11:30");
    }

    #[test]
    fn room_filter_matches() {
        let room = Room {
            id: 1,
            building_id: 2,
            name: "101".into(),
            floor: Some(1),
            capacity: 40,
        };
        assert!(RoomFilter::default().matches(&room));
        assert!(RoomFilter { building_id: Some(2), ..Default::default() }.matches(&room));
        assert!(!RoomFilter { building_id: Some(3), ..Default::default() }.matches(&room));
        assert!(!RoomFilter { floor: Some(2), ..Default::default() }.matches(&room));
        assert!(RoomFilter { min_capacity: Some(40), ..Default::default() }.matches(&room));
        assert!(!RoomFilter { min_capacity: Some(41), ..Default::default() }.matches(&room));
    }

    #[test]
    fn event_serialization_roundtrip() {
        let block = ReservationBlock {
            id: Ulid::new(),
            room_id: 5,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            span: Span::new(780, 840),
            user: "kim".into(),
        };
        let event = Event::admitted(&block);
        let bytes = bincode::serialize(&event).unwrap();
        let decoded: Event = bincode::deserialize(&bytes).unwrap();
        assert_eq!(event, decoded);
    }
}
