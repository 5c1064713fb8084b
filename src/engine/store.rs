use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::*;

use super::EngineError;

/// Check run by a [`ReservationStore`] against a day's current reservations,
/// inside the store's critical section for that day.
pub type AdmissionCheck<'a> = &'a (dyn Fn(&[ReservationBlock]) -> Result<(), EngineError> + Send + Sync);

/// Buildings and rooms.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn list_buildings(&self) -> Result<Vec<Building>, EngineError>;

    async fn list_rooms(&self, filter: &RoomFilter) -> Result<Vec<Room>, EngineError>;

    async fn room(&self, id: RoomId) -> Result<Option<Room>, EngineError>;
}

/// Where class occupancy comes from.
#[async_trait]
pub trait ClassSchedule: Send + Sync {
    /// Classes held in the room on `date`, sorted by start.
    async fn class_blocks(&self, room_id: RoomId, date: NaiveDate) -> Result<Vec<ClassBlock>, EngineError>;

    /// The room's weekly grid, sorted by weekday then period.
    async fn raw_timetable(&self, room_id: RoomId) -> Result<Vec<TimetableEntry>, EngineError>;
}

/// Sole writer of reservations.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// The day's reservations, sorted by start.
    async fn reservations(&self, key: DayKey) -> Result<Vec<ReservationBlock>, EngineError>;

    /// Conditional insert: run `check` against the day's reservations and, if it
    /// passes, durably add `candidate`. Concurrent inserts for the same day are
    /// serialized. Returns the day's reservations right after the insert.
    async fn insert_if_free(
        &self,
        candidate: ReservationBlock,
        check: AdmissionCheck<'_>,
    ) -> Result<Vec<ReservationBlock>, EngineError>;
}
