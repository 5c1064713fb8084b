mod conflict;
mod error;
mod mutations;
mod queries;
mod store;
mod timeline;

pub use error::EngineError;
pub use store::{AdmissionCheck, ClassSchedule, Directory, ReservationStore};
pub use timeline::{build_timeline, busy_spans, merge_overlapping, status_at};

use std::sync::Arc;

use crate::model::*;

/// Room-day reconciler. Reads rooms and classes from its collaborators and
/// admits reservations through the reservation store, which is the sole writer.
pub struct Engine {
    directory: Arc<dyn Directory>,
    schedule: Arc<dyn ClassSchedule>,
    reservations: Arc<dyn ReservationStore>,
    window: Span,
}

impl Engine {
    pub fn new(
        directory: Arc<dyn Directory>,
        schedule: Arc<dyn ClassSchedule>,
        reservations: Arc<dyn ReservationStore>,
    ) -> Self {
        Self {
            directory,
            schedule,
            reservations,
            window: OPERATING_WINDOW,
        }
    }

    pub(super) async fn require_room(&self, room_id: RoomId) -> Result<Room, EngineError> {
        self.directory
            .room(room_id)
            .await?
            .ok_or(EngineError::NotFound(room_id))
    }

    /// Assemble a timeline from one consistent snapshot of the day.
    pub(super) fn assemble(
        &self,
        key: DayKey,
        classes: Vec<ClassBlock>,
        reservations: Vec<ReservationBlock>,
    ) -> Timeline {
        let busy = busy_spans(&classes, &reservations);
        Timeline {
            room_id: key.room_id,
            date: key.date,
            blocks: build_timeline(&self.window, &busy),
            classes,
            reservations,
        }
    }
}
