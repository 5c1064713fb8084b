use crate::limits::*;
use crate::model::*;

use super::EngineError;

/// Shape checks that need no stored state.
pub(crate) fn validate_request(req: &ReservationRequest) -> Result<Span, EngineError> {
    let user = req.user.trim();
    if user.is_empty() {
        return Err(EngineError::InvalidInput("user must not be empty".into()));
    }
    if user.len() > MAX_USER_LEN {
        return Err(EngineError::LimitExceeded("user name too long"));
    }
    Span::try_new(req.start, req.end).ok_or(EngineError::InvalidRange {
        start: req.start,
        end: req.end,
    })
}

/// Reject `span` if it intersects a reservation or a class of the same day.
/// Reservations are checked first; within each source the earliest conflict wins.
pub(crate) fn check_no_conflict(
    span: &Span,
    reservations: &[ReservationBlock],
    classes: &[ClassBlock],
) -> Result<(), EngineError> {
    let first_reservation = reservations
        .iter()
        .filter(|r| r.span.overlaps(span))
        .min_by_key(|r| r.span);
    if let Some(r) = first_reservation {
        return Err(EngineError::ConflictWithReservation {
            span: r.span,
            user: r.user.clone(),
        });
    }
    let first_class = classes
        .iter()
        .filter(|c| c.span.overlaps(span))
        .min_by_key(|c| c.span);
    if let Some(c) = first_class {
        return Err(EngineError::ConflictWithClass {
            span: c.span,
            label: c.label.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ulid::Ulid;

    const H: Minute = 60;

    fn request(start: Minute, end: Minute, user: &str) -> ReservationRequest {
        ReservationRequest {
            room_id: 5,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            start,
            end,
            user: user.into(),
        }
    }

    fn reservation(start: Minute, end: Minute, user: &str) -> ReservationBlock {
        ReservationBlock {
            id: Ulid::new(),
            room_id: 5,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            span: Span::new(start, end),
            user: user.into(),
        }
    }

    fn class(start: Minute, end: Minute, label: &str) -> ClassBlock {
        ClassBlock {
            span: Span::new(start, end),
            label: label.into(),
        }
    }

    #[test]
    fn validate_accepts_arbitrary_minutes() {
        let span = validate_request(&request(13 * H + 7, 13 * H + 41, "park")).unwrap();
        assert_eq!(span, Span::new(787, 821));
    }

    #[test]
    fn validate_rejects_inverted_and_empty_range() {
        assert_eq!(
            validate_request(&request(14 * H, 13 * H, "park")),
            Err(EngineError::InvalidRange { start: 840, end: 780 })
        );
        assert!(matches!(
            validate_request(&request(13 * H, 13 * H, "park")),
            Err(EngineError::InvalidRange { .. })
        ));
    }

    #[test]
    fn validate_rejects_blank_user() {
        assert!(matches!(
            validate_request(&request(13 * H, 14 * H, "   ")),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn validate_rejects_long_user() {
        let long = "x".repeat(MAX_USER_LEN + 1);
        assert!(matches!(
            validate_request(&request(13 * H, 14 * H, &long)),
            Err(EngineError::LimitExceeded(_))
        ));
    }

    #[test]
    fn reservation_conflict_reports_block() {
        let existing = vec![reservation(13 * H, 14 * H, "choi")];
        let result = check_no_conflict(&Span::new(13 * H + 30, 14 * H + 30), &existing, &[]);
        assert_eq!(
            result,
            Err(EngineError::ConflictWithReservation {
                span: Span::new(13 * H, 14 * H),
                user: "choi".into(),
            })
        );
    }

    #[test]
    fn class_conflict_reports_label() {
        let classes = vec![class(10 * H, 11 * H + 30, "CS101")];
        let result = check_no_conflict(&Span::new(11 * H, 12 * H), &[], &classes);
        assert_eq!(
            result,
            Err(EngineError::ConflictWithClass {
                span: Span::new(10 * H, 11 * H + 30),
                label: "CS101".into(),
            })
        );
    }

    #[test]
    fn reservation_conflict_wins_over_class() {
        let classes = vec![class(10 * H, 11 * H, "CS101")];
        let existing = vec![reservation(11 * H, 12 * H, "han")];
        let result = check_no_conflict(&Span::new(10 * H + 30, 11 * H + 30), &existing, &classes);
        assert!(matches!(result, Err(EngineError::ConflictWithReservation { .. })));
    }

    #[test]
    fn earliest_conflict_is_reported() {
        let existing = vec![reservation(15 * H, 16 * H, "late"), reservation(13 * H, 14 * H, "early")];
        let result = check_no_conflict(&Span::new(13 * H, 16 * H), &existing, &[]);
        assert!(matches!(
            result,
            Err(EngineError::ConflictWithReservation { ref user, .. }) if user == "early"
        ));
    }

    #[test]
    fn adjacent_blocks_do_not_conflict() {
        let classes = vec![class(10 * H, 11 * H, "CS101")];
        let existing = vec![reservation(12 * H, 13 * H, "oh")];
        assert!(check_no_conflict(&Span::new(11 * H, 12 * H), &existing, &classes).is_ok());
    }
}
