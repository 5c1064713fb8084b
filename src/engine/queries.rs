use chrono::NaiveDate;
use futures::future::try_join_all;
use tracing::debug;

use crate::model::*;

use super::timeline::{busy_spans, status_at};
use super::{Engine, EngineError};

impl Engine {
    pub async fn list_buildings(&self) -> Result<Vec<Building>, EngineError> {
        self.directory.list_buildings().await
    }

    pub async fn list_rooms(&self, filter: &RoomFilter) -> Result<Vec<Room>, EngineError> {
        self.directory.list_rooms(filter).await
    }

    pub async fn raw_timetable(&self, room_id: RoomId) -> Result<Vec<TimetableEntry>, EngineError> {
        self.require_room(room_id).await?;
        self.schedule.raw_timetable(room_id).await
    }

    /// The room's day partitioned into free/occupied blocks, plus the raw
    /// classes and reservations it was computed from.
    pub async fn compute_timeline(&self, room_id: RoomId, date: NaiveDate) -> Result<Timeline, EngineError> {
        let started = std::time::Instant::now();
        self.require_room(room_id).await?;

        let key = DayKey::new(room_id, date);
        let classes = self.schedule.class_blocks(room_id, date).await?;
        let reservations = self.reservations.reservations(key).await?;
        let timeline = self.assemble(key, classes, reservations);

        metrics::counter!(crate::observability::TIMELINE_QUERIES_TOTAL).increment(1);
        metrics::histogram!(crate::observability::TIMELINE_QUERY_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        debug!(blocks = timeline.blocks.len(), "timeline for {key}");
        Ok(timeline)
    }

    /// Rooms matching `filter` with no class or reservation covering `time` on `date`.
    pub async fn free_rooms_at(
        &self,
        date: NaiveDate,
        time: Minute,
        filter: &RoomFilter,
    ) -> Result<FreeRooms, EngineError> {
        let candidates = self.directory.list_rooms(filter).await?;

        let statuses = try_join_all(candidates.iter().map(|room| async move {
            let key = DayKey::new(room.id, date);
            let classes = self.schedule.class_blocks(room.id, date).await?;
            let reservations = self.reservations.reservations(key).await?;
            Ok::<_, EngineError>(status_at(&busy_spans(&classes, &reservations), time))
        }))
        .await?;

        let rooms = candidates
            .into_iter()
            .zip(statuses)
            .filter(|(_, status)| *status == BlockStatus::Free)
            .map(|(room, _)| room)
            .collect();

        Ok(FreeRooms { date, time, rooms })
    }
}
