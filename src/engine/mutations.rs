use tracing::{info, warn};
use ulid::Ulid;

use crate::model::*;

use super::conflict::{check_no_conflict, validate_request};
use super::{Engine, EngineError};

impl Engine {
    /// Admit a reservation if it overlaps neither an existing reservation nor a
    /// class of the same room and day. On success the returned timeline is
    /// computed from the same snapshot the reservation was committed into.
    pub async fn submit_reservation(&self, req: ReservationRequest) -> Result<Admission, EngineError> {
        let result = self.admit(req).await;
        match &result {
            Ok(admission) => {
                metrics::counter!(crate::observability::RESERVATIONS_ADMITTED_TOTAL).increment(1);
                info!(
                    id = %admission.reservation.id,
                    "reserved {} for {} on room {} ({})",
                    admission.reservation.span,
                    admission.reservation.user,
                    admission.reservation.room_id,
                    admission.reservation.date,
                );
            }
            Err(e) => {
                metrics::counter!(
                    crate::observability::RESERVATIONS_REJECTED_TOTAL,
                    "reason" => crate::observability::rejection_label(e)
                )
                .increment(1);
                if let EngineError::Storage(_) = e {
                    warn!("reservation not stored: {e}");
                }
            }
        }
        result
    }

    async fn admit(&self, req: ReservationRequest) -> Result<Admission, EngineError> {
        let span = validate_request(&req)?;
        self.require_room(req.room_id).await?;

        let key = DayKey::new(req.room_id, req.date);
        let classes = self.schedule.class_blocks(req.room_id, req.date).await?;

        let candidate = ReservationBlock {
            id: Ulid::new(),
            room_id: req.room_id,
            date: req.date,
            span,
            user: req.user.trim().to_string(),
        };
        let check = |existing: &[ReservationBlock]| check_no_conflict(&span, existing, &classes);
        let reservations = self
            .reservations
            .insert_if_free(candidate.clone(), &check)
            .await?;

        Ok(Admission {
            reservation: candidate,
            timeline: self.assemble(key, classes, reservations),
        })
    }
}
